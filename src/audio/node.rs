//! Contracts with the external collaborators.
//!
//! The bot core only talks to the audio node through [`AudioNode`] and
//! [`PlaybackHandle`], and to the chat platform through [`Notifier`]. The
//! production implementations live in `lavalink_client` and
//! `bot::notifier`; tests substitute recording fakes.

use async_trait::async_trait;
use serenity::model::id::{ChannelId, GuildId, MessageId, UserId};
use std::sync::Arc;

use super::error::{NodeError, NotifyError};
use super::filters::FilterPreset;
use super::track::Track;

/// Tipo de respuesta de una búsqueda en el nodo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadKind {
    Track,
    Playlist,
    Search,
    Empty,
    Error,
}

/// Resultado crudo de un único intento de búsqueda
#[derive(Debug, Clone, PartialEq)]
pub struct LoadResult {
    pub kind: LoadKind,
    pub tracks: Vec<Track>,
    pub playlist_name: Option<String>,
    pub error: Option<String>,
}

impl LoadResult {
    pub fn tracks(kind: LoadKind, tracks: Vec<Track>) -> Self {
        Self {
            kind,
            tracks,
            playlist_name: None,
            error: None,
        }
    }

    pub fn playlist(name: impl Into<String>, tracks: Vec<Track>) -> Self {
        Self {
            kind: LoadKind::Playlist,
            tracks,
            playlist_name: Some(name.into()),
            error: None,
        }
    }

    pub fn empty() -> Self {
        Self::tracks(LoadKind::Empty, Vec::new())
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            kind: LoadKind::Error,
            tracks: Vec::new(),
            playlist_name: None,
            error: Some(message.into()),
        }
    }

    /// Un error o una lista vacía cuentan como "sin resultado"
    pub fn is_usable(&self) -> bool {
        !matches!(self.kind, LoadKind::Empty | LoadKind::Error) && !self.tracks.is_empty()
    }
}

/// Motivo con el que el nodo reporta el fin de una pista
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    Finished,
    LoadFailed,
    Stopped,
    Replaced,
    Cleanup,
}

impl EndReason {
    /// `Replaced` y `Cleanup` no implican avanzar la cola
    pub fn advances_queue(&self) -> bool {
        matches!(self, EndReason::Finished | EndReason::LoadFailed | EndReason::Stopped)
    }
}

/// Eventos asíncronos del nodo, consumidos por el relay en orden de llegada
#[derive(Debug, Clone, PartialEq)]
pub enum NodeEvent {
    TrackStarted { guild_id: GuildId, track: Track },
    TrackEnded { guild_id: GuildId, reason: EndReason },
    TrackException { guild_id: GuildId, track: Track, message: String },
    TrackStuck { guild_id: GuildId, track: Track },
    NodeError { guild_id: GuildId, message: String },
    PlayerDestroyed { guild_id: GuildId },
}

/// Nodo de audio: búsqueda y ciclo de vida de los players por guild
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AudioNode: Send + Sync {
    async fn load(
        &self,
        guild_id: GuildId,
        identifier: &str,
        requester: UserId,
    ) -> Result<LoadResult, NodeError>;

    async fn connect(
        &self,
        guild_id: GuildId,
        voice_channel: ChannelId,
    ) -> Result<Arc<dyn PlaybackHandle>, NodeError>;

    async fn disconnect(&self, guild_id: GuildId) -> Result<(), NodeError>;
}

/// Control de transporte de un player ya conectado
#[async_trait]
pub trait PlaybackHandle: Send + Sync {
    async fn play(&self, track: &Track) -> Result<(), NodeError>;
    async fn pause(&self, paused: bool) -> Result<(), NodeError>;
    async fn stop(&self) -> Result<(), NodeError>;
    async fn set_volume(&self, volume: u8) -> Result<(), NodeError>;
    async fn set_filter(&self, preset: FilterPreset) -> Result<(), NodeError>;
}

/// Referencia a un mensaje enviado, para editarlo después
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageRef {
    pub channel_id: ChannelId,
    pub message_id: MessageId,
}

/// Mensajes de estado que el bot publica por su cuenta
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    NowPlaying { track: Track, paused: bool, disabled: bool },
    QueueEnded,
    PlayerError { message: String },
    TrackException { title: String, message: String },
    TrackStuck { title: String },
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, channel_id: ChannelId, notice: Notice) -> Result<MessageRef, NotifyError>;
    async fn edit(&self, message: MessageRef, notice: Notice) -> Result<(), NotifyError>;
}
