//! Recording fakes for the node and notifier contracts.

use async_trait::async_trait;
use parking_lot::Mutex;
use serenity::model::id::{ChannelId, GuildId, MessageId, UserId};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
    },
};

use super::error::{NodeError, NotifyError};
use super::filters::FilterPreset;
use super::node::{AudioNode, LoadResult, MessageRef, Notice, Notifier, PlaybackHandle};
use super::track::Track;

pub fn track(title: &str) -> Track {
    Track::new(format!("enc:{title}"), title, UserId::new(42)).with_duration_ms(180_000)
}

#[derive(Debug, Clone, PartialEq)]
pub enum HandleCall {
    Play(String),
    Pause(bool),
    Stop,
    Volume(u8),
    Filter(FilterPreset),
}

#[derive(Default)]
pub struct FakeHandle {
    calls: Mutex<Vec<HandleCall>>,
    fail_play: AtomicBool,
}

impl FakeHandle {
    pub fn calls(&self) -> Vec<HandleCall> {
        self.calls.lock().clone()
    }

    pub fn played(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                HandleCall::Play(title) => Some(title.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn fail_play(&self, fail: bool) {
        self.fail_play.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl PlaybackHandle for FakeHandle {
    async fn play(&self, track: &Track) -> Result<(), NodeError> {
        if self.fail_play.load(Ordering::SeqCst) {
            return Err(NodeError::Request(format!("cannot play {}", track.title)));
        }
        self.calls.lock().push(HandleCall::Play(track.title.clone()));
        Ok(())
    }

    async fn pause(&self, paused: bool) -> Result<(), NodeError> {
        self.calls.lock().push(HandleCall::Pause(paused));
        Ok(())
    }

    async fn stop(&self) -> Result<(), NodeError> {
        self.calls.lock().push(HandleCall::Stop);
        Ok(())
    }

    async fn set_volume(&self, volume: u8) -> Result<(), NodeError> {
        self.calls.lock().push(HandleCall::Volume(volume));
        Ok(())
    }

    async fn set_filter(&self, preset: FilterPreset) -> Result<(), NodeError> {
        self.calls.lock().push(HandleCall::Filter(preset));
        Ok(())
    }
}

/// Nodo falso: resultados de búsqueda programados por identificador y un
/// único handle compartido por todos los guilds
#[derive(Default)]
pub struct FakeNode {
    pub handle: Arc<FakeHandle>,
    results: Mutex<HashMap<String, LoadResult>>,
    loads: Mutex<Vec<String>>,
    connects: Mutex<Vec<(GuildId, ChannelId)>>,
    disconnects: Mutex<Vec<GuildId>>,
    fail_connect: AtomicBool,
}

impl FakeNode {
    pub fn with_result(self, identifier: &str, result: LoadResult) -> Self {
        self.results.lock().insert(identifier.to_string(), result);
        self
    }

    pub fn fail_connect(&self, fail: bool) {
        self.fail_connect.store(fail, Ordering::SeqCst);
    }

    pub fn loads(&self) -> Vec<String> {
        self.loads.lock().clone()
    }

    pub fn connects(&self) -> Vec<(GuildId, ChannelId)> {
        self.connects.lock().clone()
    }

    pub fn disconnected(&self) -> Vec<GuildId> {
        self.disconnects.lock().clone()
    }
}

#[async_trait]
impl AudioNode for FakeNode {
    async fn load(
        &self,
        _guild_id: GuildId,
        identifier: &str,
        _requester: UserId,
    ) -> Result<LoadResult, NodeError> {
        self.loads.lock().push(identifier.to_string());
        Ok(self
            .results
            .lock()
            .get(identifier)
            .cloned()
            .unwrap_or_else(LoadResult::empty))
    }

    async fn connect(
        &self,
        guild_id: GuildId,
        voice_channel: ChannelId,
    ) -> Result<Arc<dyn PlaybackHandle>, NodeError> {
        if self.fail_connect.load(Ordering::SeqCst) {
            return Err(NodeError::Connect("voice server unavailable".into()));
        }
        self.connects.lock().push((guild_id, voice_channel));
        Ok(self.handle.clone())
    }

    async fn disconnect(&self, guild_id: GuildId) -> Result<(), NodeError> {
        self.disconnects.lock().push(guild_id);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    Sent(ChannelId, Notice),
    Edited(MessageRef, Notice),
}

#[derive(Default)]
pub struct FakeNotifier {
    deliveries: Mutex<Vec<Delivery>>,
    next_id: AtomicU64,
    fail: AtomicBool,
}

impl FakeNotifier {
    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().clone()
    }

    pub fn sent(&self) -> Vec<Notice> {
        self.deliveries
            .lock()
            .iter()
            .filter_map(|d| match d {
                Delivery::Sent(_, notice) => Some(notice.clone()),
                Delivery::Edited(..) => None,
            })
            .collect()
    }

    pub fn edits(&self) -> Vec<(MessageRef, Notice)> {
        self.deliveries
            .lock()
            .iter()
            .filter_map(|d| match d {
                Delivery::Edited(message, notice) => Some((*message, notice.clone())),
                Delivery::Sent(..) => None,
            })
            .collect()
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn send(&self, channel_id: ChannelId, notice: Notice) -> Result<MessageRef, NotifyError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(NotifyError("missing permissions".into()));
        }
        self.deliveries.lock().push(Delivery::Sent(channel_id, notice));
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(MessageRef {
            channel_id,
            message_id: MessageId::new(id),
        })
    }

    async fn edit(&self, message: MessageRef, notice: Notice) -> Result<(), NotifyError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(NotifyError("missing permissions".into()));
        }
        self.deliveries.lock().push(Delivery::Edited(message, notice));
        Ok(())
    }
}
