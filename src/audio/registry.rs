use dashmap::DashMap;
use serenity::model::id::{ChannelId, GuildId};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::node::AudioNode;
use super::session::PlaybackSession;

pub type SharedSession = Arc<Mutex<PlaybackSession>>;

/// Mapa de sesiones activas, como mucho una por guild
pub struct SessionRegistry {
    sessions: DashMap<GuildId, SharedSession>,
    node: Arc<dyn AudioNode>,
    default_volume: u8,
}

impl SessionRegistry {
    pub fn new(node: Arc<dyn AudioNode>, default_volume: u8) -> Self {
        Self {
            sessions: DashMap::new(),
            node,
            default_volume,
        }
    }

    /// Devuelve la sesión del guild o crea una nueva. La comprobación y la
    /// inserción ocurren bajo el mismo bloqueo de la entrada, así que dos
    /// llamadas concurrentes obtienen la misma sesión.
    pub fn get_or_create(
        &self,
        guild_id: GuildId,
        voice_channel: ChannelId,
        text_channel: ChannelId,
    ) -> SharedSession {
        self.sessions
            .entry(guild_id)
            .or_insert_with(|| {
                info!("🎛️ Nueva sesión para guild {}", guild_id);
                Arc::new(Mutex::new(PlaybackSession::new(
                    guild_id,
                    voice_channel,
                    text_channel,
                    self.default_volume,
                )))
            })
            .clone()
    }

    pub fn get(&self, guild_id: GuildId) -> Option<SharedSession> {
        self.sessions.get(&guild_id).map(|entry| entry.clone())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Quita la sesión del mapa y desconecta el player del nodo. No toma el
    /// lock de la sesión: puede llamarse mientras el llamador lo mantiene.
    /// Los errores del nodo se registran y no se propagan.
    pub async fn destroy(&self, guild_id: GuildId) -> bool {
        let removed = self.sessions.remove(&guild_id).is_some();
        if !removed {
            debug!("Sesión de guild {} ya destruida", guild_id);
            return false;
        }

        if let Err(e) = self.node.disconnect(guild_id).await {
            warn!("⚠️ Error al desconectar el player de guild {}: {}", guild_id, e);
        }
        info!("👋 Sesión destruida para guild {}", guild_id);
        true
    }

    /// Cuenta sesiones con una pista sonando. Las sesiones ocupadas en este
    /// momento se cuentan como activas.
    pub fn playing_count(&self) -> usize {
        self.sessions
            .iter()
            .filter(|entry| {
                entry
                    .value()
                    .try_lock()
                    .map(|session| session.current().is_some())
                    .unwrap_or(true)
            })
            .count()
    }
}
