use serenity::model::id::GuildId;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, warn};

use crate::audio::{
    node::{EndReason, NodeEvent, Notice},
    player::AudioPlayer,
    registry::SessionRegistry,
    session::StatusMessage,
    track::Track,
};

/// Consume los eventos del nodo de audio y los aplica a las sesiones.
/// Un único consumidor procesa los eventos en el orden en que llegan.
pub struct EventRelay {
    player: Arc<AudioPlayer>,
}

impl EventRelay {
    pub fn new(player: Arc<AudioPlayer>) -> Self {
        Self { player }
    }

    fn registry(&self) -> &Arc<SessionRegistry> {
        self.player.registry()
    }

    /// Bucle principal; termina cuando se cierra el canal de eventos
    pub async fn run(self: Arc<Self>, mut events: UnboundedReceiver<NodeEvent>) {
        info!("📡 Relay de eventos del nodo iniciado");
        while let Some(event) = events.recv().await {
            self.handle(event).await;
        }
        info!("📡 Relay de eventos del nodo detenido");
    }

    pub async fn handle(&self, event: NodeEvent) {
        debug!("📨 Evento del nodo: {:?}", event);
        match event {
            NodeEvent::TrackStarted { guild_id, track } => self.track_started(guild_id, track).await,
            NodeEvent::TrackEnded { guild_id, reason } => self.track_ended(guild_id, reason).await,
            NodeEvent::TrackException {
                guild_id,
                track,
                message,
            } => {
                warn!("❌ Excepción en track {} (guild {}): {}", track.title, guild_id, message);
                self.notify_session(
                    guild_id,
                    Notice::TrackException {
                        title: track.title,
                        message,
                    },
                )
                .await;
            }
            NodeEvent::TrackStuck { guild_id, track } => {
                warn!("⏳ Track atascado {} (guild {})", track.title, guild_id);
                self.notify_session(guild_id, Notice::TrackStuck { title: track.title })
                    .await;
                if let Err(e) = self.player.skip(guild_id).await {
                    debug!("No se pudo saltar el track atascado: {}", e);
                }
            }
            NodeEvent::NodeError { guild_id, message } => self.node_error(guild_id, message).await,
            NodeEvent::PlayerDestroyed { guild_id } => {
                info!("🧹 Player eliminado en el nodo para guild {}", guild_id);
            }
        }
    }

    async fn track_started(&self, guild_id: GuildId, track: Track) {
        let Some(shared) = self.registry().get(guild_id) else {
            debug!("Inicio de track para guild {} sin sesión, ignorado", guild_id);
            return;
        };

        let (text_channel, previous) = {
            let mut session = shared.lock().await;
            session.mark_started(track.clone());
            (session.text_channel(), session.take_status_message())
        };

        if let Some(previous) = previous {
            self.player
                .edit(
                    previous.message,
                    Notice::NowPlaying {
                        track: previous.track,
                        paused: false,
                        disabled: true,
                    },
                )
                .await;
        }

        let notice = Notice::NowPlaying {
            track: track.clone(),
            paused: false,
            disabled: false,
        };
        if let Some(message) = self.player.notify(text_channel, notice).await {
            shared
                .lock()
                .await
                .set_status_message(StatusMessage { message, track });
        }
    }

    async fn track_ended(&self, guild_id: GuildId, reason: EndReason) {
        if !reason.advances_queue() {
            debug!("Fin de track ({:?}) en guild {} sin avance", reason, guild_id);
            return;
        }

        let Some(shared) = self.registry().get(guild_id) else {
            debug!("Fin de track para guild {} sin sesión, ignorado", guild_id);
            return;
        };
        let mut session = shared.lock().await;

        if session.take_manual_stop() {
            debug!("⏹️ Fin de track por parada manual en guild {}", guild_id);
            return;
        }
        if reason == EndReason::LoadFailed {
            warn!("⚠️ El track no pudo cargarse en guild {}, avanzando", guild_id);
        }

        self.player.advance(&mut session).await;
    }

    /// Error del player en el nodo: se avisa y se salta a la siguiente
    /// pista, o se cierra la sesión si no queda ninguna
    async fn node_error(&self, guild_id: GuildId, message: String) {
        let Some(shared) = self.registry().get(guild_id) else {
            debug!("Error del nodo para guild {} sin sesión: {}", guild_id, message);
            return;
        };
        warn!("❌ Error del player en guild {}: {}", guild_id, message);

        let text_channel = shared.lock().await.text_channel();
        self.player
            .notify(text_channel, Notice::PlayerError { message })
            .await;

        let mut session = shared.lock().await;
        if !session.queue().is_empty() && session.current().is_some() {
            drop(session);
            if let Err(e) = self.player.skip(guild_id).await {
                warn!("⚠️ No se pudo saltar tras el error: {}", e);
            }
            return;
        }
        self.player.queue_ended(&mut session).await;
    }

    async fn notify_session(&self, guild_id: GuildId, notice: Notice) {
        let Some(shared) = self.registry().get(guild_id) else {
            return;
        };
        let text_channel = shared.lock().await.text_channel();
        self.player.notify(text_channel, notice).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{
        error::MusicError,
        node::MessageRef,
        registry::SharedSession,
        testing::{track, FakeNode, FakeNotifier, HandleCall},
        track::LoopMode,
    };
    use pretty_assertions::assert_eq;
    use serenity::model::id::{ChannelId, MessageId};
    use tokio::sync::mpsc;

    const GUILD: GuildId = GuildId::new(7);
    const VOICE: ChannelId = ChannelId::new(8);
    const TEXT: ChannelId = ChannelId::new(9);

    struct Harness {
        node: Arc<FakeNode>,
        notifier: Arc<FakeNotifier>,
        player: Arc<AudioPlayer>,
        relay: EventRelay,
    }

    fn harness() -> Harness {
        let node = Arc::new(FakeNode::default());
        let notifier = Arc::new(FakeNotifier::default());
        let registry = Arc::new(SessionRegistry::new(node.clone(), 100));
        let player = Arc::new(AudioPlayer::new(registry, node.clone(), notifier.clone()));
        Harness {
            node,
            notifier,
            relay: EventRelay::new(player.clone()),
            player,
        }
    }

    async fn start(h: &Harness, titles: &[&str]) -> SharedSession {
        let session = h.player.join(GUILD, VOICE, TEXT).await.unwrap();
        let tracks = titles.iter().map(|t| track(t)).collect();
        h.player.enqueue(&session, tracks).await.unwrap();
        session
    }

    fn ended(reason: EndReason) -> NodeEvent {
        NodeEvent::TrackEnded {
            guild_id: GUILD,
            reason,
        }
    }

    fn started(title: &str) -> NodeEvent {
        NodeEvent::TrackStarted {
            guild_id: GUILD,
            track: track(title),
        }
    }

    #[tokio::test]
    async fn natural_end_advances_in_order() {
        let h = harness();
        let session = start(&h, &["a", "b", "c"]).await;

        h.relay.handle(ended(EndReason::Finished)).await;
        assert_eq!(session.lock().await.current(), Some(&track("b")));
        h.relay.handle(ended(EndReason::Finished)).await;
        assert_eq!(session.lock().await.current(), Some(&track("c")));
        assert_eq!(h.node.handle.played(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn end_after_skip_does_not_advance_again() {
        let h = harness();
        let session = start(&h, &["a", "b", "c"]).await;

        h.player.skip(GUILD).await.unwrap();
        h.relay.handle(ended(EndReason::Stopped)).await;

        let session = session.lock().await;
        assert_eq!(session.current(), Some(&track("b")));
        assert_eq!(session.queue().len(), 1);
        assert!(!session.manual_stop_requested());
        assert_eq!(h.node.handle.played(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn stuck_track_is_skipped_once() {
        let h = harness();
        let session = start(&h, &["a", "b"]).await;

        h.relay
            .handle(NodeEvent::TrackStuck {
                guild_id: GUILD,
                track: track("a"),
            })
            .await;
        h.relay.handle(ended(EndReason::Stopped)).await;

        assert_eq!(session.lock().await.current(), Some(&track("b")));
        assert_eq!(h.node.handle.played(), vec!["a", "b"]);
        assert!(h.notifier.sent().contains(&Notice::TrackStuck { title: "a".into() }));
    }

    #[tokio::test]
    async fn replaced_and_cleanup_are_ignored() {
        let h = harness();
        let session = start(&h, &["a", "b"]).await;

        h.relay.handle(ended(EndReason::Replaced)).await;
        h.relay.handle(ended(EndReason::Cleanup)).await;
        assert_eq!(session.lock().await.current(), Some(&track("a")));
    }

    #[tokio::test]
    async fn track_loop_replays_on_natural_end() {
        let h = harness();
        let session = start(&h, &["a"]).await;
        h.player.set_loop(GUILD, LoopMode::Track).await.unwrap();

        h.relay.handle(ended(EndReason::Finished)).await;
        h.relay.handle(ended(EndReason::Finished)).await;

        assert_eq!(session.lock().await.current(), Some(&track("a")));
        assert_eq!(h.node.handle.played(), vec!["a", "a", "a"]);
    }

    #[tokio::test]
    async fn queue_loop_cycles() {
        let h = harness();
        start(&h, &["a", "b"]).await;
        h.player.set_loop(GUILD, LoopMode::Queue).await.unwrap();

        for _ in 0..3 {
            h.relay.handle(ended(EndReason::Finished)).await;
        }
        assert_eq!(h.node.handle.played(), vec!["a", "b", "a", "b"]);
    }

    #[tokio::test]
    async fn exhausted_queue_destroys_non_persistent_session() {
        let h = harness();
        start(&h, &["a"]).await;
        h.relay.handle(started("a")).await;

        h.relay.handle(ended(EndReason::Finished)).await;

        assert!(h.player.registry().get(GUILD).is_none());
        assert_eq!(h.node.disconnected(), vec![GUILD]);
        let sent = h.notifier.sent();
        assert_eq!(sent.last(), Some(&Notice::QueueEnded));

        let edits = h.notifier.edits();
        assert_eq!(edits.len(), 1);
        assert!(matches!(edits[0].1, Notice::NowPlaying { disabled: true, .. }));
    }

    #[tokio::test]
    async fn exhausted_queue_keeps_persistent_session_idle() {
        let h = harness();
        let session = start(&h, &["a"]).await;
        h.player.toggle_persistent(GUILD).await.unwrap();

        h.relay.handle(ended(EndReason::Finished)).await;

        assert!(h.player.registry().get(GUILD).is_some());
        assert!(session.lock().await.is_idle());
        assert!(h.node.disconnected().is_empty());
        assert!(!h.notifier.sent().contains(&Notice::QueueEnded));

        // vuelve a sonar al agregar otra pista
        let outcome = h.player.enqueue(&session, vec![track("b")]).await.unwrap();
        assert_eq!(outcome.started, Some(track("b")));
    }

    #[tokio::test]
    async fn track_start_records_and_rotates_status_message() {
        let h = harness();
        let session = start(&h, &["a", "b"]).await;

        h.relay.handle(started("a")).await;
        let first = session.lock().await.status_message().cloned().unwrap();
        assert_eq!(first.track, track("a"));
        assert_eq!(first.message.channel_id, TEXT);

        h.relay.handle(ended(EndReason::Finished)).await;
        h.relay.handle(started("b")).await;

        let second = session.lock().await.status_message().cloned().unwrap();
        assert_eq!(second.track, track("b"));
        assert_eq!(
            h.notifier.edits(),
            vec![(
                first.message,
                Notice::NowPlaying {
                    track: track("a"),
                    paused: false,
                    disabled: true,
                }
            )]
        );
    }

    #[tokio::test]
    async fn notification_failure_keeps_state() {
        let h = harness();
        let session = start(&h, &["a", "b"]).await;
        h.notifier.fail(true);

        h.relay.handle(started("a")).await;
        h.relay.handle(ended(EndReason::Finished)).await;

        let session = session.lock().await;
        assert_eq!(session.current(), Some(&track("b")));
        assert!(session.status_message().is_none());
    }

    #[tokio::test]
    async fn events_for_unknown_guilds_are_ignored() {
        let h = harness();
        h.relay.handle(started("a")).await;
        h.relay.handle(ended(EndReason::Finished)).await;
        h.relay
            .handle(NodeEvent::NodeError {
                guild_id: GUILD,
                message: "boom".into(),
            })
            .await;

        assert!(h.player.registry().is_empty());
        assert!(h.notifier.deliveries().is_empty());
    }

    #[tokio::test]
    async fn exceptions_only_notify() {
        let h = harness();
        let session = start(&h, &["a"]).await;

        h.relay
            .handle(NodeEvent::TrackException {
                guild_id: GUILD,
                track: track("a"),
                message: "decoder failure".into(),
            })
            .await;

        assert_eq!(
            h.notifier.sent(),
            vec![Notice::TrackException {
                title: "a".into(),
                message: "decoder failure".into(),
            }]
        );
        assert_eq!(session.lock().await.current(), Some(&track("a")));
    }

    #[tokio::test]
    async fn player_error_skips_when_queue_has_more() {
        let h = harness();
        let session = start(&h, &["a", "b"]).await;

        h.relay
            .handle(NodeEvent::NodeError {
                guild_id: GUILD,
                message: "voice connection closed".into(),
            })
            .await;

        assert_eq!(session.lock().await.current(), Some(&track("b")));
        assert!(h.node.handle.calls().contains(&HandleCall::Stop));
    }

    #[tokio::test]
    async fn player_error_destroys_when_nothing_is_left() {
        let h = harness();
        start(&h, &["a"]).await;

        h.relay
            .handle(NodeEvent::NodeError {
                guild_id: GUILD,
                message: "voice connection closed".into(),
            })
            .await;

        assert!(h.player.registry().get(GUILD).is_none());
        assert_eq!(h.node.disconnected(), vec![GUILD]);
        let sent = h.notifier.sent();
        assert!(matches!(sent[sent.len() - 2], Notice::PlayerError { .. }));
        assert_eq!(sent.last(), Some(&Notice::QueueEnded));
    }

    #[tokio::test]
    async fn player_error_leaves_persistent_session_idle() {
        let h = harness();
        let session = start(&h, &["a"]).await;
        h.player.toggle_persistent(GUILD).await.unwrap();

        h.relay
            .handle(NodeEvent::NodeError {
                guild_id: GUILD,
                message: "voice connection closed".into(),
            })
            .await;

        assert!(h.player.registry().get(GUILD).is_some());
        assert!(session.lock().await.is_idle());
        assert!(h.node.disconnected().is_empty());
        assert!(!h.notifier.sent().contains(&Notice::QueueEnded));
    }

    #[tokio::test]
    async fn stale_player_destroyed_keeps_new_session() {
        let h = harness();
        start(&h, &["a"]).await;
        h.player.stop(GUILD).await.unwrap();
        let session = start(&h, &["b"]).await;

        // llega tarde el aviso del player anterior
        h.relay
            .handle(NodeEvent::PlayerDestroyed { guild_id: GUILD })
            .await;

        let current = h.player.registry().get(GUILD).unwrap();
        assert!(Arc::ptr_eq(&current, &session));
        assert_eq!(session.lock().await.current(), Some(&track("b")));
        assert_eq!(h.node.disconnected(), vec![GUILD]);
    }

    #[tokio::test]
    async fn relay_task_drains_channel_in_order() {
        let h = harness();
        let session = start(&h, &["a", "b", "c"]).await;
        let relay = Arc::new(h.relay);

        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(ended(EndReason::Finished)).unwrap();
        tx.send(ended(EndReason::Finished)).unwrap();
        drop(tx);
        relay.run(rx).await;

        assert_eq!(session.lock().await.current(), Some(&track("c")));
    }

    #[tokio::test]
    async fn play_skip_volume_stop_scenario() {
        let h = harness();
        let session = start(&h, &["t1", "t2", "t3"]).await;
        h.relay.handle(started("t1")).await;
        {
            let session = session.lock().await;
            assert_eq!(session.current(), Some(&track("t1")));
            assert_eq!(session.queue().len(), 2);
        }

        h.player.skip(GUILD).await.unwrap();
        h.relay.handle(ended(EndReason::Stopped)).await;
        {
            let session = session.lock().await;
            assert_eq!(session.current(), Some(&track("t2")));
            assert_eq!(session.queue().len(), 1);
            assert!(!session.manual_stop_requested());
        }

        assert!(matches!(
            h.player.set_volume(GUILD, 150).await,
            Err(MusicError::OutOfRange { value: 150 })
        ));

        h.player.stop(GUILD).await.unwrap();
        assert!(h.player.registry().get(GUILD).is_none());

        // un fin de track tardío no resucita la sesión
        h.relay.handle(ended(EndReason::Stopped)).await;
        assert!(h.player.registry().get(GUILD).is_none());
        assert_eq!(
            h.notifier.edits().first().map(|(m, _)| *m),
            Some(MessageRef {
                channel_id: TEXT,
                message_id: MessageId::new(1),
            })
        );
    }
}
