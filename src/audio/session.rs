//! Per-guild playback state.
//!
//! [`PlaybackSession`] holds everything the bot knows about one guild's
//! player: the current track, the pending queue, transport flags, the text
//! channel used for notices and the connected [`PlaybackHandle`]. All
//! mutations here are synchronous; the async orchestration that talks to the
//! node lives in [`super::player::AudioPlayer`] and the event relay.
//!
//! Invariants kept by this type:
//! - `paused` is only true while a current track exists.
//! - a session without a current track and with an empty queue is idle,
//!   and idle sessions that are not persistent are torn down by the caller.
//! - the manual-stop flag is set only right before a deliberate stop, and
//!   the next end-of-track event consumes it.

use rand::Rng;
use serenity::model::id::{ChannelId, GuildId};
use std::sync::Arc;
use tracing::{debug, info};

use super::error::{MusicError, MusicResult};
use super::node::{MessageRef, PlaybackHandle};
use super::queue::{MusicQueue, QueuePage};
use super::track::{LoopMode, Track};

pub const MAX_VOLUME: i64 = 100;

/// Último mensaje de "reproduciendo ahora" publicado por el bot
#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub message: MessageRef,
    pub track: Track,
}

pub struct PlaybackSession {
    guild_id: GuildId,
    queue: MusicQueue,
    current: Option<Track>,
    loop_mode: LoopMode,
    paused: bool,
    persistent: bool,
    volume: u8,
    voice_channel: ChannelId,
    text_channel: ChannelId,
    manual_stop_requested: bool,
    status_message: Option<StatusMessage>,
    handle: Option<Arc<dyn PlaybackHandle>>,
}

impl PlaybackSession {
    pub fn new(
        guild_id: GuildId,
        voice_channel: ChannelId,
        text_channel: ChannelId,
        volume: u8,
    ) -> Self {
        Self {
            guild_id,
            queue: MusicQueue::new(),
            current: None,
            loop_mode: LoopMode::Off,
            paused: false,
            persistent: false,
            volume: volume.min(MAX_VOLUME as u8),
            voice_channel,
            text_channel,
            manual_stop_requested: false,
            status_message: None,
            handle: None,
        }
    }

    pub fn guild_id(&self) -> GuildId {
        self.guild_id
    }

    pub fn current(&self) -> Option<&Track> {
        self.current.as_ref()
    }

    pub fn queue(&self) -> &MusicQueue {
        &self.queue
    }

    pub fn loop_mode(&self) -> LoopMode {
        self.loop_mode
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn voice_channel(&self) -> ChannelId {
        self.voice_channel
    }

    pub fn text_channel(&self) -> ChannelId {
        self.text_channel
    }

    pub fn manual_stop_requested(&self) -> bool {
        self.manual_stop_requested
    }

    /// Sin pista actual y con la cola vacía
    #[cfg(test)]
    pub fn is_idle(&self) -> bool {
        self.current.is_none() && self.queue.is_empty()
    }

    pub fn handle(&self) -> MusicResult<Arc<dyn PlaybackHandle>> {
        self.handle.clone().ok_or(MusicError::NotConnected)
    }

    pub fn is_connected(&self) -> bool {
        self.handle.is_some()
    }

    pub fn attach(&mut self, voice_channel: ChannelId, handle: Arc<dyn PlaybackHandle>) {
        self.voice_channel = voice_channel;
        self.handle = Some(handle);
    }

    /// La última invocación define dónde se publican los avisos
    pub fn set_text_channel(&mut self, text_channel: ChannelId) {
        self.text_channel = text_channel;
    }

    /// Error si no hay nada sonando
    pub fn ensure_playing(&self) -> MusicResult<&Track> {
        self.current.as_ref().ok_or(MusicError::NothingPlaying)
    }

    /// Agrega tracks a la cola. Si no hay pista actual, promueve la cabeza
    /// de la cola y la devuelve para que el llamador la reproduzca.
    pub fn enqueue(&mut self, tracks: Vec<Track>) -> Option<Track> {
        self.queue.extend(tracks);
        if self.current.is_none() {
            self.promote_next()
        } else {
            None
        }
    }

    /// Saca la cabeza de la cola como pista actual, sin aplicar repetición
    pub fn promote_next(&mut self) -> Option<Track> {
        self.paused = false;
        self.current = self.queue.pop_front();
        self.current.clone()
    }

    /// Avance tras el fin natural de una pista, respetando el modo de
    /// repetición. Devuelve la pista a reproducir, o `None` si la sesión
    /// queda inactiva.
    pub fn advance_after_end(&mut self) -> Option<Track> {
        match (self.loop_mode, self.current.take()) {
            (LoopMode::Track, Some(finished)) => {
                info!("🔂 Repitiendo track: {}", finished.title);
                self.paused = false;
                self.current = Some(finished);
                self.current.clone()
            }
            (LoopMode::Queue, Some(finished)) => {
                debug!("🔁 Track agregado al final por loop de cola: {}", finished.title);
                self.queue.push(finished);
                self.promote_next()
            }
            _ => self.promote_next(),
        }
    }

    /// Avance por un salto manual. La repetición de pista no aplica; la
    /// repetición de cola sí devuelve la pista saltada al final.
    pub fn skip_to_next(&mut self) -> Option<Track> {
        if let (LoopMode::Queue, Some(skipped)) = (self.loop_mode, self.current.take()) {
            self.queue.push(skipped);
        }
        self.promote_next()
    }

    /// Confirma que el nodo empezó a reproducir `track`
    pub fn mark_started(&mut self, track: Track) {
        self.paused = false;
        self.current = Some(track);
    }

    /// Deja la sesión sin pista actual
    pub fn finish(&mut self) {
        self.current = None;
        self.paused = false;
    }

    pub fn set_paused(&mut self, paused: bool) -> MusicResult<()> {
        self.ensure_playing()?;
        self.paused = paused;
        Ok(())
    }

    /// Valida el volumen (0 a 100) y lo guarda
    pub fn set_volume(&mut self, level: i64) -> MusicResult<u8> {
        self.ensure_playing()?;
        if !(0..=MAX_VOLUME).contains(&level) {
            return Err(MusicError::OutOfRange { value: level });
        }
        self.volume = level as u8;
        Ok(self.volume)
    }

    pub fn set_loop_mode(&mut self, mode: LoopMode) {
        self.loop_mode = mode;
        match mode {
            LoopMode::Off => info!("➡️ Repetición desactivada"),
            LoopMode::Track => info!("🔂 Repetir canción activado"),
            LoopMode::Queue => info!("🔁 Repetir cola activado"),
        }
    }

    /// Activa o desactiva el modo 24/7
    pub fn toggle_persistent(&mut self) -> bool {
        self.persistent = !self.persistent;
        self.persistent
    }

    pub fn request_manual_stop(&mut self) {
        self.manual_stop_requested = true;
    }

    /// Consume la marca de parada manual
    pub fn take_manual_stop(&mut self) -> bool {
        std::mem::take(&mut self.manual_stop_requested)
    }

    /// Elimina la pista en la posición `position` (base 1)
    pub fn remove(&mut self, position: i64) -> MusicResult<Track> {
        let index = self.index_for(position)?;
        self.queue
            .remove(index)
            .ok_or_else(|| self.invalid_position(position))
    }

    /// Mueve una pista entre dos posiciones (base 1)
    pub fn move_track(&mut self, from: i64, to: i64) -> MusicResult<Track> {
        let from_index = self.index_for(from)?;
        let to_index = self.index_for(to)?;
        self.queue
            .move_track(from_index, to_index)
            .cloned()
            .ok_or_else(|| self.invalid_position(from))
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) -> MusicResult<usize> {
        if self.queue.len() < 2 {
            return Err(MusicError::InsufficientTracks);
        }
        self.queue.shuffle(rng);
        Ok(self.queue.len())
    }

    pub fn clear_queue(&mut self) -> usize {
        self.queue.clear()
    }

    pub fn queue_page(&self, page: usize, page_size: usize) -> QueuePage {
        self.queue.page(page, page_size)
    }

    pub fn set_status_message(&mut self, status: StatusMessage) -> Option<StatusMessage> {
        self.status_message.replace(status)
    }

    pub fn take_status_message(&mut self) -> Option<StatusMessage> {
        self.status_message.take()
    }

    pub fn status_message(&self) -> Option<&StatusMessage> {
        self.status_message.as_ref()
    }

    fn index_for(&self, position: i64) -> MusicResult<usize> {
        if position < 1 || position as u64 > self.queue.len() as u64 {
            return Err(self.invalid_position(position));
        }
        Ok((position - 1) as usize)
    }

    fn invalid_position(&self, position: i64) -> MusicError {
        MusicError::InvalidPosition {
            position,
            len: self.queue.len(),
        }
    }
}
