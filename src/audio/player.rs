use rand::thread_rng;
use serenity::model::id::{ChannelId, GuildId};
use std::{sync::Arc, time::Duration};
use tracing::{debug, error, info, warn};

use super::{
    error::{MusicError, MusicResult},
    filters::FilterPreset,
    node::{AudioNode, MessageRef, Notice, Notifier},
    queue::QueuePage,
    registry::{SessionRegistry, SharedSession},
    session::PlaybackSession,
    track::{LoopMode, Track},
};

/// Resultado de agregar pistas a una sesión
#[derive(Debug, Clone, PartialEq)]
pub struct Enqueued {
    /// Pista que empezó a sonar a raíz de esta llamada
    pub started: Option<Track>,
    /// Posición (base 1) del primer track agregado dentro de la cola
    pub position: usize,
    pub count: usize,
}

/// Vista de solo lectura del estado de una sesión
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub current: Option<Track>,
    pub paused: bool,
    pub loop_mode: LoopMode,
    pub persistent: bool,
    pub volume: u8,
    pub queue_len: usize,
    pub queue_duration: Duration,
}

impl SessionSnapshot {
    fn of(session: &PlaybackSession) -> Self {
        Self {
            current: session.current().cloned(),
            paused: session.is_paused(),
            loop_mode: session.loop_mode(),
            persistent: session.is_persistent(),
            volume: session.volume(),
            queue_len: session.queue().len(),
            queue_duration: session.queue().total_duration(),
        }
    }
}

/// Orquesta las operaciones de reproducción sobre las sesiones del
/// registro: cambia el estado, habla con el nodo y publica los avisos.
pub struct AudioPlayer {
    registry: Arc<SessionRegistry>,
    node: Arc<dyn AudioNode>,
    notifier: Arc<dyn Notifier>,
}

impl AudioPlayer {
    pub fn new(
        registry: Arc<SessionRegistry>,
        node: Arc<dyn AudioNode>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            registry,
            node,
            notifier,
        }
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Obtiene la sesión del guild conectada al canal de voz indicado,
    /// creándola y conectándola si hace falta. Si la conexión inicial falla
    /// la sesión recién creada se destruye.
    pub async fn join(
        &self,
        guild_id: GuildId,
        voice_channel: ChannelId,
        text_channel: ChannelId,
    ) -> MusicResult<SharedSession> {
        let shared = self
            .registry
            .get_or_create(guild_id, voice_channel, text_channel);
        let mut session = shared.lock().await;
        session.set_text_channel(text_channel);

        if session.is_connected() && session.voice_channel() == voice_channel {
            drop(session);
            return Ok(shared);
        }

        match self.node.connect(guild_id, voice_channel).await {
            Ok(handle) => {
                if session.volume() != 100 {
                    if let Err(e) = handle.set_volume(session.volume()).await {
                        warn!("⚠️ No se pudo aplicar el volumen inicial: {}", e);
                    }
                }
                info!("🔊 Conectado al canal {} en guild {}", voice_channel, guild_id);
                session.attach(voice_channel, handle);
            }
            Err(e) => {
                error!("❌ Error al conectar al canal de voz: {}", e);
                if !session.is_connected() {
                    drop(session);
                    self.registry.destroy(guild_id).await;
                }
                return Err(e.into());
            }
        }

        drop(session);
        Ok(shared)
    }

    /// Agrega pistas a la cola y arranca la reproducción si la sesión
    /// estaba inactiva
    pub async fn enqueue(&self, shared: &SharedSession, tracks: Vec<Track>) -> MusicResult<Enqueued> {
        let mut session = shared.lock().await;
        // Un stop concurrente pudo retirar esta sesión del registro
        match self.registry.get(session.guild_id()) {
            Some(current) if Arc::ptr_eq(&current, shared) => {}
            _ => {
                debug!("Sesión de guild {} retirada antes de encolar", session.guild_id());
                return Err(MusicError::NoSession);
            }
        }
        let count = tracks.len();
        let position = session.queue().len() + 1;

        let Some(first) = session.enqueue(tracks) else {
            return Ok(Enqueued {
                started: None,
                position,
                count,
            });
        };

        match self.start_or_skip(&mut session, first).await {
            Ok(track) => Ok(Enqueued {
                started: Some(track),
                position: 0,
                count,
            }),
            Err(e) => {
                self.queue_ended(&mut session).await;
                Err(e)
            }
        }
    }

    pub async fn set_paused(&self, guild_id: GuildId, paused: bool) -> MusicResult<()> {
        let shared = self.registry.get(guild_id).ok_or(MusicError::NothingPlaying)?;
        let mut session = shared.lock().await;
        self.apply_pause(&mut session, paused).await
    }

    /// Alterna pausa/reanudación, devuelve el nuevo estado
    pub async fn toggle_pause(&self, guild_id: GuildId) -> MusicResult<bool> {
        let shared = self.registry.get(guild_id).ok_or(MusicError::NothingPlaying)?;
        let mut session = shared.lock().await;
        let paused = !session.is_paused();
        self.apply_pause(&mut session, paused).await?;
        Ok(paused)
    }

    async fn apply_pause(&self, session: &mut PlaybackSession, paused: bool) -> MusicResult<()> {
        session.ensure_playing()?;
        session.handle()?.pause(paused).await?;
        session.set_paused(paused)?;

        if paused {
            info!("⏸️ Reproducción pausada en guild {}", session.guild_id());
        } else {
            info!("▶️ Reproducción reanudada en guild {}", session.guild_id());
        }
        self.refresh_status(session).await;
        Ok(())
    }

    /// Salta la pista actual. Devuelve la pista que empezó a sonar, o
    /// `None` si la cola se terminó.
    pub async fn skip(&self, guild_id: GuildId) -> MusicResult<Option<Track>> {
        let shared = self.registry.get(guild_id).ok_or(MusicError::NothingPlaying)?;
        let mut session = shared.lock().await;
        let skipped = session.ensure_playing()?.title.clone();
        let handle = session.handle()?;

        // El fin de pista que provoca este stop no debe volver a avanzar
        session.request_manual_stop();
        if let Err(e) = handle.stop().await {
            session.take_manual_stop();
            return Err(e.into());
        }
        info!("⏭️ Saltando: {}", skipped);

        match session.skip_to_next() {
            Some(next) => match self.start_or_skip(&mut session, next).await {
                Ok(track) => Ok(Some(track)),
                Err(_) => {
                    self.queue_ended(&mut session).await;
                    Ok(None)
                }
            },
            None => {
                self.wind_down(&mut session, true).await;
                Ok(None)
            }
        }
    }

    /// Detiene todo: vacía la cola, avisa y destruye la sesión
    pub async fn stop(&self, guild_id: GuildId) -> MusicResult<()> {
        let shared = self.registry.get(guild_id).ok_or(MusicError::NoSession)?;
        let mut session = shared.lock().await;

        session.request_manual_stop();
        session.clear_queue();
        session.finish();
        self.close_out(&mut session).await;
        self.registry.destroy(guild_id).await;

        info!("⏹️ Reproducción detenida en guild {}", guild_id);
        Ok(())
    }

    pub async fn set_volume(&self, guild_id: GuildId, level: i64) -> MusicResult<u8> {
        let shared = self.registry.get(guild_id).ok_or(MusicError::NothingPlaying)?;
        let mut session = shared.lock().await;
        let volume = session.set_volume(level)?;
        session.handle()?.set_volume(volume).await?;

        info!("🔊 Volumen ajustado a {}% en guild {}", volume, guild_id);
        Ok(volume)
    }

    pub async fn set_loop(&self, guild_id: GuildId, mode: LoopMode) -> MusicResult<LoopMode> {
        let shared = self.registry.get(guild_id).ok_or(MusicError::NoSession)?;
        let mut session = shared.lock().await;
        session.set_loop_mode(mode);
        Ok(mode)
    }

    /// Alterna entre sin repetición y repetir pista
    pub async fn toggle_loop(&self, guild_id: GuildId) -> MusicResult<LoopMode> {
        let shared = self.registry.get(guild_id).ok_or(MusicError::NothingPlaying)?;
        let mut session = shared.lock().await;
        session.ensure_playing()?;
        let mode = session.loop_mode().toggled();
        session.set_loop_mode(mode);
        Ok(mode)
    }

    /// Activa o desactiva el modo 24/7
    pub async fn toggle_persistent(&self, guild_id: GuildId) -> MusicResult<bool> {
        let shared = self.registry.get(guild_id).ok_or(MusicError::NoSession)?;
        let mut session = shared.lock().await;
        let persistent = session.toggle_persistent();
        info!(
            "🕐 Modo 24/7 {} en guild {}",
            if persistent { "activado" } else { "desactivado" },
            guild_id
        );
        Ok(persistent)
    }

    pub async fn remove(&self, guild_id: GuildId, position: i64) -> MusicResult<Track> {
        let shared = self.registry.get(guild_id).ok_or(MusicError::NoSession)?;
        let mut session = shared.lock().await;
        session.remove(position)
    }

    pub async fn move_track(&self, guild_id: GuildId, from: i64, to: i64) -> MusicResult<Track> {
        let shared = self.registry.get(guild_id).ok_or(MusicError::NoSession)?;
        let mut session = shared.lock().await;
        session.move_track(from, to)
    }

    pub async fn shuffle(&self, guild_id: GuildId) -> MusicResult<usize> {
        let shared = self.registry.get(guild_id).ok_or(MusicError::NoSession)?;
        let mut session = shared.lock().await;
        session.shuffle(&mut thread_rng())
    }

    pub async fn clear(&self, guild_id: GuildId) -> MusicResult<usize> {
        let shared = self.registry.get(guild_id).ok_or(MusicError::NoSession)?;
        let mut session = shared.lock().await;
        Ok(session.clear_queue())
    }

    pub async fn apply_filter(&self, guild_id: GuildId, preset: FilterPreset) -> MusicResult<()> {
        let shared = self.registry.get(guild_id).ok_or(MusicError::NothingPlaying)?;
        let session = shared.lock().await;
        session.ensure_playing()?;
        session.handle()?.set_filter(preset).await?;

        info!("🎛️ Filtro {} aplicado en guild {}", preset.value(), guild_id);
        Ok(())
    }

    pub async fn now_playing(&self, guild_id: GuildId) -> MusicResult<SessionSnapshot> {
        let shared = self.registry.get(guild_id).ok_or(MusicError::NothingPlaying)?;
        let session = shared.lock().await;
        session.ensure_playing()?;
        Ok(SessionSnapshot::of(&session))
    }

    pub async fn queue_page(
        &self,
        guild_id: GuildId,
        page: usize,
        page_size: usize,
    ) -> MusicResult<(SessionSnapshot, QueuePage)> {
        let shared = self.registry.get(guild_id).ok_or(MusicError::NothingPlaying)?;
        let session = shared.lock().await;
        Ok((SessionSnapshot::of(&session), session.queue_page(page, page_size)))
    }

    /// El bot salió del canal de voz sin pasar por `stop`
    pub async fn voice_disconnected(&self, guild_id: GuildId) {
        if self.registry.destroy(guild_id).await {
            info!("🔌 Desconectado externamente del canal de voz en guild {}", guild_id);
        }
    }

    /// Avance tras el fin de una pista, aplicando el modo de repetición
    pub(crate) async fn advance(&self, session: &mut PlaybackSession) {
        let Some(next) = session.advance_after_end() else {
            self.queue_ended(session).await;
            return;
        };

        if self.start_or_skip(session, next).await.is_err() {
            self.queue_ended(session).await;
        }
    }

    /// Nada más que reproducir por un fin natural de la cola
    pub(crate) async fn queue_ended(&self, session: &mut PlaybackSession) {
        self.wind_down(session, false).await;
    }

    /// Reproduce `track`. Si el nodo la rechaza, avisa en el canal y prueba
    /// con la siguiente de la cola hasta que alguna arranque.
    async fn start_or_skip(&self, session: &mut PlaybackSession, track: Track) -> MusicResult<Track> {
        let mut next = Some(track);
        let mut last_error = MusicError::NothingPlaying;

        while let Some(track) = next {
            let started = match session.handle() {
                Ok(handle) => handle.play(&track).await.map_err(MusicError::from),
                Err(e) => Err(e),
            };

            match started {
                Ok(()) => {
                    info!("🎵 Reproduciendo: {}", track.title);
                    return Ok(track);
                }
                Err(MusicError::NotConnected) => return Err(MusicError::NotConnected),
                Err(e) => {
                    error!("❌ Error al reproducir {}: {}", track.title, e);
                    self.notify(
                        session.text_channel(),
                        Notice::PlayerError {
                            message: format!("Could not play **{}**: {}", track.title, e),
                        },
                    )
                    .await;
                    last_error = e;
                    next = session.promote_next();
                }
            }
        }

        Err(last_error)
    }

    /// Deja la sesión sin pista. En modo 24/7 queda inactiva esperando
    /// más pistas; si no, avisa del fin de la cola y se destruye.
    async fn wind_down(&self, session: &mut PlaybackSession, announce: bool) {
        session.finish();

        if session.is_persistent() {
            if announce {
                self.close_out(session).await;
            }
            debug!("💤 Sesión 24/7 inactiva en guild {}", session.guild_id());
            return;
        }

        self.close_out(session).await;
        self.registry.destroy(session.guild_id()).await;
    }

    /// Deshabilita los controles del último mensaje de estado y publica el
    /// aviso de fin de cola
    async fn close_out(&self, session: &mut PlaybackSession) {
        if let Some(status) = session.take_status_message() {
            self.edit(
                status.message,
                Notice::NowPlaying {
                    track: status.track,
                    paused: false,
                    disabled: true,
                },
            )
            .await;
        }
        info!("📭 Cola terminada en guild {}", session.guild_id());
        self.notify(session.text_channel(), Notice::QueueEnded).await;
    }

    /// Refleja el estado de pausa en el mensaje de estado vigente
    async fn refresh_status(&self, session: &PlaybackSession) {
        if let Some(status) = session.status_message() {
            self.edit(
                status.message,
                Notice::NowPlaying {
                    track: status.track.clone(),
                    paused: session.is_paused(),
                    disabled: false,
                },
            )
            .await;
        }
    }

    pub(crate) async fn notify(&self, channel_id: ChannelId, notice: Notice) -> Option<MessageRef> {
        match self.notifier.send(channel_id, notice).await {
            Ok(message) => Some(message),
            Err(e) => {
                warn!("⚠️ No se pudo enviar aviso al canal {}: {}", channel_id, e);
                None
            }
        }
    }

    pub(crate) async fn edit(&self, message: MessageRef, notice: Notice) {
        if let Err(e) = self.notifier.edit(message, notice).await {
            warn!("⚠️ No se pudo editar el mensaje {}: {}", message.message_id, e);
        }
    }
}
