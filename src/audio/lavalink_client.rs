//! Lavalink v4 adapter for the [`AudioNode`] contract.
//!
//! Voice connections are negotiated through songbird's gateway-only mode and
//! handed to Lavalink, which does the actual streaming. Node callbacks are
//! translated into [`NodeEvent`]s and pushed onto the relay channel.

use async_trait::async_trait;
use lavalink_rs::{
    hook,
    model::{
        events,
        player::{ConnectionInfo, Filters},
        track::{TrackData, TrackLoadData, TrackLoadType},
    },
    prelude::*,
};
use serde_json::json;
use serenity::model::id::{ChannelId, GuildId, UserId};
use songbird::Songbird;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info, warn};

use super::{
    error::NodeError,
    filters::FilterPreset,
    node::{AudioNode, EndReason, LoadKind, LoadResult, NodeEvent, PlaybackHandle},
    track::Track,
};
use crate::config::Config;

/// Canal hacia el relay, guardado como datos de usuario del cliente Lavalink
pub struct NodeEventSender(pub UnboundedSender<NodeEvent>);

pub struct LavalinkManager {
    client: LavalinkClient,
    songbird: Arc<Songbird>,
    events: UnboundedSender<NodeEvent>,
}

impl LavalinkManager {
    pub async fn new(
        config: &Config,
        user_id: UserId,
        songbird: Arc<Songbird>,
        events: UnboundedSender<NodeEvent>,
    ) -> Self {
        info!(
            "🎼 Conectando a Lavalink en {}:{} (ssl: {})",
            config.lavalink_host, config.lavalink_port, config.lavalink_secure
        );

        let hooks = events::Events {
            ready: Some(ready),
            track_start: Some(track_start),
            track_end: Some(track_end),
            track_exception: Some(track_exception),
            track_stuck: Some(track_stuck),
            websocket_closed: Some(websocket_closed),
            ..Default::default()
        };

        let node = NodeBuilder {
            hostname: format!("{}:{}", config.lavalink_host, config.lavalink_port),
            is_ssl: config.lavalink_secure,
            events: events::Events::default(),
            password: config.lavalink_password.clone(),
            user_id: lavalink_rs::model::UserId(user_id.get()),
            session_id: None,
        };

        let client = LavalinkClient::new_with_data(
            hooks,
            vec![node],
            NodeDistributionStrategy::round_robin(),
            Arc::new(NodeEventSender(events.clone())),
        )
        .await;

        Self {
            client,
            songbird,
            events,
        }
    }
}

#[async_trait]
impl AudioNode for LavalinkManager {
    async fn load(
        &self,
        guild_id: GuildId,
        identifier: &str,
        requester: UserId,
    ) -> Result<LoadResult, NodeError> {
        debug!("🔍 Cargando en Lavalink: {}", identifier);
        let loaded = self
            .client
            .load_tracks(lavalink_guild(guild_id), identifier)
            .await
            .map_err(|e| NodeError::Load(e.to_string()))?;

        let convert = |tracks: &[TrackData]| -> Vec<Track> {
            tracks
                .iter()
                .map(|data| Track {
                    requester,
                    ..track_from_data(data)
                })
                .collect()
        };

        let result = match (loaded.load_type, loaded.data) {
            (TrackLoadType::Track, Some(TrackLoadData::Track(data))) => {
                LoadResult::tracks(LoadKind::Track, convert(std::slice::from_ref(&data)))
            }
            (TrackLoadType::Search, Some(TrackLoadData::Search(data))) => {
                LoadResult::tracks(LoadKind::Search, convert(&data))
            }
            (TrackLoadType::Playlist, Some(TrackLoadData::Playlist(data))) => {
                LoadResult::playlist(data.info.name.clone(), convert(&data.tracks))
            }
            (TrackLoadType::Error, Some(TrackLoadData::Error(error))) => {
                LoadResult::failed(format!("{:?}", error))
            }
            (TrackLoadType::Error, _) => LoadResult::failed("unknown load error"),
            _ => LoadResult::empty(),
        };
        Ok(result)
    }

    async fn connect(
        &self,
        guild_id: GuildId,
        voice_channel: ChannelId,
    ) -> Result<Arc<dyn PlaybackHandle>, NodeError> {
        let (connection, _call) = self
            .songbird
            .join_gateway(guild_id, voice_channel)
            .await
            .map_err(|e| NodeError::Connect(e.to_string()))?;

        let player = self
            .client
            .create_player_context(lavalink_guild(guild_id), convert_connection_info(connection))
            .await
            .map_err(|e| NodeError::Connect(e.to_string()))?;

        info!("🔊 Player de Lavalink creado para guild {}", guild_id);
        Ok(Arc::new(LavalinkPlayback {
            guild_id,
            player,
        }))
    }

    async fn disconnect(&self, guild_id: GuildId) -> Result<(), NodeError> {
        if let Err(e) = self.client.delete_player(lavalink_guild(guild_id)).await {
            warn!("⚠️ Error al eliminar el player de guild {}: {}", guild_id, e);
        }

        if self.songbird.get(guild_id).is_some() {
            self.songbird
                .remove(guild_id)
                .await
                .map_err(|e| NodeError::Request(e.to_string()))?;
        }

        let _ = self.events.send(NodeEvent::PlayerDestroyed { guild_id });
        Ok(())
    }
}

/// Player de un guild en el nodo
struct LavalinkPlayback {
    guild_id: GuildId,
    player: PlayerContext,
}

#[async_trait]
impl PlaybackHandle for LavalinkPlayback {
    async fn play(&self, track: &Track) -> Result<(), NodeError> {
        let data = track_to_data(track)?;
        self.player
            .play_now(&data)
            .await
            .map(|_| ())
            .map_err(|e| request_error(self.guild_id, "play", e))
    }

    async fn pause(&self, paused: bool) -> Result<(), NodeError> {
        self.player
            .set_pause(paused)
            .await
            .map(|_| ())
            .map_err(|e| request_error(self.guild_id, "pause", e))
    }

    async fn stop(&self) -> Result<(), NodeError> {
        self.player
            .stop_now()
            .await
            .map(|_| ())
            .map_err(|e| request_error(self.guild_id, "stop", e))
    }

    async fn set_volume(&self, volume: u8) -> Result<(), NodeError> {
        self.player
            .set_volume(u16::from(volume))
            .await
            .map(|_| ())
            .map_err(|e| request_error(self.guild_id, "volume", e))
    }

    async fn set_filter(&self, preset: FilterPreset) -> Result<(), NodeError> {
        let filters: Filters = serde_json::from_value(preset.payload())
            .map_err(|e| NodeError::Request(format!("invalid filter payload: {e}")))?;
        self.player
            .set_filters(filters)
            .await
            .map(|_| ())
            .map_err(|e| request_error(self.guild_id, "filters", e))
    }
}

fn request_error(guild_id: GuildId, operation: &str, e: impl std::fmt::Display) -> NodeError {
    error!("❌ Lavalink rechazó {} en guild {}: {}", operation, guild_id, e);
    NodeError::Request(format!("{operation}: {e}"))
}

fn lavalink_guild(guild_id: GuildId) -> lavalink_rs::model::GuildId {
    lavalink_rs::model::GuildId(guild_id.get())
}

fn serenity_guild(guild_id: lavalink_rs::model::GuildId) -> GuildId {
    GuildId::new(guild_id.0)
}

fn convert_connection_info(info: songbird::ConnectionInfo) -> ConnectionInfo {
    ConnectionInfo {
        endpoint: info.endpoint,
        token: info.token,
        session_id: info.session_id,
    }
}

/// El solicitante viaja en `userData` para recuperarlo en los eventos
fn track_from_data(data: &TrackData) -> Track {
    let requester = data
        .user_data
        .as_ref()
        .and_then(|value| value.get("requester_id"))
        .and_then(|value| value.as_u64())
        .filter(|id| *id != 0)
        .map(UserId::new)
        .unwrap_or(UserId::new(1));

    let mut track = Track::new(data.encoded.clone(), data.info.title.clone(), requester)
        .with_author(data.info.author.clone())
        .with_duration_ms(data.info.length)
        .with_artwork(data.info.artwork_url.clone());
    track.uri = data.info.uri.clone();
    track
}

/// Reconstruye el objeto de pista del protocolo v4 a partir de la pista
/// normalizada; el nodo reproduce a partir de `encoded`
fn track_to_data(track: &Track) -> Result<TrackData, NodeError> {
    serde_json::from_value(json!({
        "encoded": track.encoded,
        "info": {
            "identifier": "",
            "isSeekable": track.duration.is_some(),
            "author": track.author,
            "length": track.duration_ms(),
            "isStream": track.duration.is_none(),
            "position": 0,
            "title": track.title,
            "uri": track.uri,
            "artworkUrl": track.artwork_url,
            "isrc": null,
            "sourceName": "",
        },
        "pluginInfo": {},
        "userData": { "requester_id": track.requester.get() },
    }))
    .map_err(|e| NodeError::Request(format!("invalid track payload: {e}")))
}

fn forward(client: &LavalinkClient, event: NodeEvent) {
    match client.data::<NodeEventSender>() {
        Ok(sender) => {
            if sender.0.send(event).is_err() {
                warn!("⚠️ Relay de eventos cerrado, evento descartado");
            }
        }
        Err(e) => error!("❌ Cliente Lavalink sin canal de eventos: {}", e),
    }
}

#[hook]
async fn ready(_client: LavalinkClient, session_id: String, event: &events::Ready) {
    info!(
        "🎼 Nodo Lavalink listo (sesión {}, reanudada: {})",
        session_id, event.resumed
    );
}

#[hook]
async fn track_start(client: LavalinkClient, _session_id: String, event: &events::TrackStart) {
    forward(
        &client,
        NodeEvent::TrackStarted {
            guild_id: serenity_guild(event.guild_id),
            track: track_from_data(&event.track),
        },
    );
}

#[hook]
async fn track_end(client: LavalinkClient, _session_id: String, event: &events::TrackEnd) {
    let reason = match event.reason {
        events::TrackEndReason::Finished => EndReason::Finished,
        events::TrackEndReason::LoadFailed => EndReason::LoadFailed,
        events::TrackEndReason::Stopped => EndReason::Stopped,
        events::TrackEndReason::Replaced => EndReason::Replaced,
        events::TrackEndReason::Cleanup => EndReason::Cleanup,
    };
    forward(
        &client,
        NodeEvent::TrackEnded {
            guild_id: serenity_guild(event.guild_id),
            reason,
        },
    );
}

#[hook]
async fn track_exception(client: LavalinkClient, _session_id: String, event: &events::TrackException) {
    forward(
        &client,
        NodeEvent::TrackException {
            guild_id: serenity_guild(event.guild_id),
            track: track_from_data(&event.track),
            message: format!("{:?}", event.exception),
        },
    );
}

#[hook]
async fn track_stuck(client: LavalinkClient, _session_id: String, event: &events::TrackStuck) {
    forward(
        &client,
        NodeEvent::TrackStuck {
            guild_id: serenity_guild(event.guild_id),
            track: track_from_data(&event.track),
        },
    );
}

#[hook]
async fn websocket_closed(client: LavalinkClient, _session_id: String, event: &events::WebSocketClosed) {
    if !event.by_remote {
        debug!("Conexión de voz cerrada localmente en guild {:?}", event.guild_id);
        return;
    }
    forward(
        &client,
        NodeEvent::NodeError {
            guild_id: serenity_guild(event.guild_id),
            message: format!("voice connection closed ({}): {}", event.code, event.reason),
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn track_payload_round_trips_through_protocol_shape() {
        let track = Track::new("QAAA", "Song", UserId::new(77))
            .with_author("Artist")
            .with_uri("https://example.com/song")
            .with_duration_ms(123_000);

        let data = track_to_data(&track).unwrap();
        assert_eq!(data.encoded, "QAAA");
        assert_eq!(data.info.length, 123_000);

        let back = track_from_data(&data);
        assert_eq!(back, track);
    }

    #[test]
    fn missing_requester_falls_back() {
        let track = Track::new("QAAA", "Song", UserId::new(77));
        let mut data = track_to_data(&track).unwrap();
        data.user_data = None;
        assert_eq!(track_from_data(&data).requester, UserId::new(1));
    }

    #[test]
    fn every_filter_preset_is_accepted_by_the_node_model() {
        for preset in FilterPreset::ALL {
            let filters: Result<Filters, _> = serde_json::from_value(preset.payload());
            assert!(filters.is_ok(), "{preset:?} no es un filtro válido");
        }
    }
}
