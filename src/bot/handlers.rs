use chrono::{DateTime, Utc};
use serenity::model::id::{ChannelId, GuildId, UserId};
use std::{collections::HashMap, sync::Arc, time::Duration};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::{
    audio::{
        error::{MusicError, MusicResult},
        filters::FilterPreset,
        player::{AudioPlayer, SessionSnapshot},
        queue::QueuePage,
        track::{LoopMode, Track},
    },
    config::Config,
    sources::{ResolvedResult, SearchResolver},
    ui::buttons::button_ids,
};

/// Comando normalizado, independiente de la superficie que lo originó
/// (slash, prefijo o componente)
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Play { query: String },
    Pause,
    Resume,
    TogglePause,
    Skip,
    Stop,
    Queue { page: usize },
    NowPlaying,
    Shuffle,
    Loop { mode: LoopMode },
    ToggleLoop,
    Remove { position: i64 },
    Move { from: i64, to: i64 },
    ClearQueue,
    Volume { level: Option<i64> },
    TwentyFourSeven,
    Filter { preset: FilterPreset },
    Help,
    Ping,
    Stats,
    Invite,
    Support,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Usage: `{0}`")]
    Usage(String),

    #[error("Unknown filter `{0}`.")]
    UnknownFilter(String),
}

/// Valor de una opción de comando slash
#[derive(Debug, Clone, PartialEq)]
pub enum SlashValue {
    Str(String),
    Int(i64),
}

pub type SlashOptions = HashMap<String, SlashValue>;

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Play { .. } => "play",
            Command::Pause => "pause",
            Command::Resume => "resume",
            Command::TogglePause => "pause_resume",
            Command::Skip => "skip",
            Command::Stop => "stop",
            Command::Queue { .. } => "queue",
            Command::NowPlaying => "nowplaying",
            Command::Shuffle => "shuffle",
            Command::Loop { .. } => "loop",
            Command::ToggleLoop => "loop_toggle",
            Command::Remove { .. } => "remove",
            Command::Move { .. } => "move",
            Command::ClearQueue => "clearqueue",
            Command::Volume { .. } => "volume",
            Command::TwentyFourSeven => "247",
            Command::Filter { .. } => "filter",
            Command::Help => "help",
            Command::Ping => "ping",
            Command::Stats => "stats",
            Command::Invite => "invite",
            Command::Support => "support",
        }
    }

    /// Comandos que exigen que el usuario esté en un canal de voz
    pub fn requires_voice(&self) -> bool {
        matches!(
            self,
            Command::Play { .. } | Command::TogglePause | Command::Skip | Command::Stop | Command::ToggleLoop
        )
    }

    /// Interpreta un mensaje con prefijo. `None` si el mensaje no es un
    /// comando conocido.
    pub fn from_prefix(content: &str, prefix: &str) -> Option<Result<Command, ParseError>> {
        let body = content.trim().strip_prefix(prefix)?;
        let mut parts = body.split_whitespace();
        let name = parts.next()?.to_ascii_lowercase();
        let args: Vec<&str> = parts.collect();
        let usage = |text: &str| ParseError::Usage(format!("{prefix}{text}"));

        let command = match name.as_str() {
            "play" | "p" => {
                if args.is_empty() {
                    Err(usage("play <song name or URL>"))
                } else {
                    Ok(Command::Play {
                        query: args.join(" "),
                    })
                }
            }
            "pause" => Ok(Command::Pause),
            "resume" => Ok(Command::Resume),
            "skip" | "s" => Ok(Command::Skip),
            "stop" => Ok(Command::Stop),
            "queue" | "q" => Ok(Command::Queue {
                page: args.first().and_then(|p| p.parse().ok()).unwrap_or(1),
            }),
            "nowplaying" | "np" => Ok(Command::NowPlaying),
            "shuffle" => Ok(Command::Shuffle),
            "loop" => Ok(Command::Loop {
                mode: LoopMode::parse_or_track(args.first().copied().unwrap_or_default()),
            }),
            "remove" => match args.first().map(|a| a.parse::<i64>()) {
                Some(Ok(position)) => Ok(Command::Remove { position }),
                _ => Err(usage("remove <position>")),
            },
            "move" => match (
                args.first().map(|a| a.parse::<i64>()),
                args.get(1).map(|a| a.parse::<i64>()),
            ) {
                (Some(Ok(from)), Some(Ok(to))) => Ok(Command::Move { from, to }),
                _ => Err(usage("move <from> <to>")),
            },
            "clearqueue" | "clear" => Ok(Command::ClearQueue),
            "volume" | "vol" => match args.first().map(|a| a.parse::<i64>()) {
                None => Ok(Command::Volume { level: None }),
                Some(Ok(level)) => Ok(Command::Volume { level: Some(level) }),
                Some(Err(_)) => Err(usage("volume <0-100>")),
            },
            "247" => Ok(Command::TwentyFourSeven),
            "filter" => match args.first() {
                None => Err(usage("filter <clear|nightcore|vaporwave|bassboost|8d|karaoke>")),
                Some(value) => FilterPreset::parse(value)
                    .map(|preset| Command::Filter { preset })
                    .ok_or_else(|| ParseError::UnknownFilter(value.to_string())),
            },
            "help" => Ok(Command::Help),
            "ping" => Ok(Command::Ping),
            "stats" => Ok(Command::Stats),
            "invite" => Ok(Command::Invite),
            "support" => Ok(Command::Support),
            _ => return None,
        };
        Some(command)
    }

    pub fn from_slash(name: &str, options: &SlashOptions) -> Option<Result<Command, ParseError>> {
        let string = |key: &str| match options.get(key) {
            Some(SlashValue::Str(value)) => Some(value.clone()),
            _ => None,
        };
        let integer = |key: &str| match options.get(key) {
            Some(SlashValue::Int(value)) => Some(*value),
            _ => None,
        };
        let required = |value: Option<i64>, text: &str| value.ok_or_else(|| ParseError::Usage(format!("/{text}")));

        let command = match name {
            "play" => string("query")
                .filter(|q| !q.trim().is_empty())
                .map(|query| Command::Play { query })
                .ok_or_else(|| ParseError::Usage("/play query:<song name or URL>".to_string())),
            "pause" => Ok(Command::Pause),
            "resume" => Ok(Command::Resume),
            "skip" => Ok(Command::Skip),
            "stop" => Ok(Command::Stop),
            "queue" => Ok(Command::Queue {
                page: integer("page").map(|p| p.max(1) as usize).unwrap_or(1),
            }),
            "nowplaying" => Ok(Command::NowPlaying),
            "shuffle" => Ok(Command::Shuffle),
            "loop" => Ok(Command::Loop {
                mode: LoopMode::parse_or_track(&string("mode").unwrap_or_default()),
            }),
            "remove" => required(integer("position"), "remove position:<n>").map(|position| Command::Remove { position }),
            "move" => required(integer("from"), "move from:<n> to:<n>").and_then(|from| {
                required(integer("to"), "move from:<n> to:<n>").map(|to| Command::Move { from, to })
            }),
            "clearqueue" => Ok(Command::ClearQueue),
            "volume" => Ok(Command::Volume {
                level: integer("level"),
            }),
            "247" => Ok(Command::TwentyFourSeven),
            "filter" => {
                let value = string("preset").unwrap_or_default();
                FilterPreset::parse(&value)
                    .map(|preset| Command::Filter { preset })
                    .ok_or(ParseError::UnknownFilter(value))
            }
            "help" => Ok(Command::Help),
            "ping" => Ok(Command::Ping),
            "stats" => Ok(Command::Stats),
            "invite" => Ok(Command::Invite),
            "support" => Ok(Command::Support),
            _ => return None,
        };
        Some(command)
    }

    /// Botones y menús del mensaje de estado
    pub fn from_component(custom_id: &str, values: &[String]) -> Option<Command> {
        match custom_id {
            button_ids::PAUSE_RESUME => Some(Command::TogglePause),
            button_ids::SKIP => Some(Command::Skip),
            button_ids::STOP => Some(Command::Stop),
            button_ids::LOOP => Some(Command::ToggleLoop),
            button_ids::QUEUE => Some(Command::Queue { page: 1 }),
            button_ids::REFRESH_HELP => Some(Command::Help),
            button_ids::REFRESH_STATS => Some(Command::Stats),
            button_ids::FILTER_MENU => values
                .first()
                .and_then(|value| FilterPreset::parse(value))
                .map(|preset| Command::Filter { preset }),
            _ => None,
        }
    }
}

/// Contexto de quien invoca un comando
#[derive(Debug, Clone)]
pub struct Invocation {
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    pub user_id: UserId,
    pub voice_channel: Option<ChannelId>,
    pub gateway: GatewayInfo,
}

/// Datos del gateway que solo conoce la capa de Discord
#[derive(Debug, Clone, Default)]
pub struct GatewayInfo {
    pub guild_count: usize,
    pub latency: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BotStats {
    pub guilds: usize,
    pub sessions: usize,
    pub playing: usize,
    pub uptime: Duration,
    pub version: &'static str,
}

/// Respuesta de un comando, renderizada por `ui::embeds`
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Started { track: Track },
    Queued { track: Track, position: usize },
    PlaylistQueued { name: String, count: usize, started: Option<Track> },
    NoResults { query: String },
    Paused,
    Resumed,
    Skipped { next: Option<Track> },
    Stopped,
    Queue { snapshot: SessionSnapshot, page: QueuePage },
    NowPlaying(SessionSnapshot),
    Shuffled { count: usize },
    Loop(LoopMode),
    Removed { position: i64, track: Track },
    Moved { track: Track, from: i64, to: i64 },
    Cleared { count: usize },
    Volume { level: u8 },
    Persistent(bool),
    Filter(FilterPreset),
    Help { prefix: Option<String> },
    Pong { latency: Option<Duration> },
    Stats(BotStats),
    Invite(Option<String>),
    Support { support: Option<String>, github: Option<String> },
    Usage(String),
    Failed(String),
}

impl Reply {
    pub fn is_failure(&self) -> bool {
        matches!(self, Reply::Failed(_) | Reply::Usage(_) | Reply::NoResults { .. })
    }
}

impl From<ParseError> for Reply {
    fn from(err: ParseError) -> Self {
        Reply::Usage(err.to_string())
    }
}

impl From<MusicError> for Reply {
    fn from(err: MusicError) -> Self {
        Reply::Failed(err.to_string())
    }
}

/// Ejecuta comandos normalizados contra el reproductor
pub struct Dispatcher {
    player: Arc<AudioPlayer>,
    resolver: SearchResolver,
    config: Arc<Config>,
    started_at: DateTime<Utc>,
}

impl Dispatcher {
    pub fn new(player: Arc<AudioPlayer>, resolver: SearchResolver, config: Arc<Config>) -> Self {
        Self {
            player,
            resolver,
            config,
            started_at: Utc::now(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn player(&self) -> &Arc<AudioPlayer> {
        &self.player
    }

    pub async fn execute(&self, invocation: &Invocation, command: Command) -> Reply {
        let name = command.name();
        info!(
            "🎵 Comando {} de {} en guild {}",
            name, invocation.user_id, invocation.guild_id
        );

        match self.run(invocation, command).await {
            Ok(reply) => reply,
            Err(e) if e.is_user_error() => {
                debug!("Comando {} rechazado: {}", name, e);
                e.into()
            }
            Err(e) => {
                error!("❌ Error ejecutando {}: {}", name, e);
                e.into()
            }
        }
    }

    async fn run(&self, inv: &Invocation, command: Command) -> MusicResult<Reply> {
        if command.requires_voice() && inv.voice_channel.is_none() {
            return Err(MusicError::NotInVoiceChannel);
        }
        let guild = inv.guild_id;

        let reply = match command {
            Command::Play { query } => return self.play(inv, query).await,
            Command::Pause => {
                self.player.set_paused(guild, true).await?;
                Reply::Paused
            }
            Command::Resume => {
                self.player.set_paused(guild, false).await?;
                Reply::Resumed
            }
            Command::TogglePause => {
                if self.player.toggle_pause(guild).await? {
                    Reply::Paused
                } else {
                    Reply::Resumed
                }
            }
            Command::Skip => Reply::Skipped {
                next: self.player.skip(guild).await?,
            },
            Command::Stop => {
                self.player.stop(guild).await?;
                Reply::Stopped
            }
            Command::Queue { page } => {
                let (snapshot, page) = self
                    .player
                    .queue_page(guild, page, self.config.queue_page_size)
                    .await?;
                if snapshot.current.is_none() && page.total_items == 0 {
                    return Err(MusicError::NothingPlaying);
                }
                Reply::Queue { snapshot, page }
            }
            Command::NowPlaying => Reply::NowPlaying(self.player.now_playing(guild).await?),
            Command::Shuffle => Reply::Shuffled {
                count: self.player.shuffle(guild).await?,
            },
            Command::Loop { mode } => Reply::Loop(self.player.set_loop(guild, mode).await?),
            Command::ToggleLoop => Reply::Loop(self.player.toggle_loop(guild).await?),
            Command::Remove { position } => Reply::Removed {
                position,
                track: self.player.remove(guild, position).await?,
            },
            Command::Move { from, to } => Reply::Moved {
                track: self.player.move_track(guild, from, to).await?,
                from,
                to,
            },
            Command::ClearQueue => Reply::Cleared {
                count: self.player.clear(guild).await?,
            },
            Command::Volume { level: Some(level) } => Reply::Volume {
                level: self.player.set_volume(guild, level).await?,
            },
            Command::Volume { level: None } => Reply::Volume {
                level: self.player.now_playing(guild).await?.volume,
            },
            Command::TwentyFourSeven => Reply::Persistent(self.player.toggle_persistent(guild).await?),
            Command::Filter { preset } => {
                self.player.apply_filter(guild, preset).await?;
                Reply::Filter(preset)
            }
            Command::Help => Reply::Help {
                prefix: self.config.enable_prefix.then(|| self.config.prefix.clone()),
            },
            Command::Ping => Reply::Pong {
                latency: inv.gateway.latency,
            },
            Command::Stats => Reply::Stats(self.stats(inv)),
            Command::Invite => Reply::Invite(self.config.invite_url()),
            Command::Support => Reply::Support {
                support: self.config.support_url.clone(),
                github: self.config.github_url.clone(),
            },
        };
        Ok(reply)
    }

    /// Resuelve primero y solo después se une al canal, así una búsqueda
    /// sin resultados no deja una sesión inactiva
    async fn play(&self, inv: &Invocation, query: String) -> MusicResult<Reply> {
        let voice_channel = inv.voice_channel.ok_or(MusicError::NotInVoiceChannel)?;

        let (tracks, playlist) = match self.resolver.resolve(inv.guild_id, &query, inv.user_id).await {
            ResolvedResult::Empty => return Ok(Reply::NoResults { query }),
            ResolvedResult::Single(tracks) => match tracks.into_iter().next() {
                Some(track) => (vec![track], None),
                None => return Ok(Reply::NoResults { query }),
            },
            ResolvedResult::Playlist { name, tracks } if !tracks.is_empty() => (tracks, Some(name)),
            ResolvedResult::Playlist { .. } => return Ok(Reply::NoResults { query }),
        };

        let session = self
            .player
            .join(inv.guild_id, voice_channel, inv.channel_id)
            .await?;
        let first = tracks[0].clone();
        let outcome = self.player.enqueue(&session, tracks).await?;

        Ok(match (playlist, outcome.started) {
            (Some(name), started) => Reply::PlaylistQueued {
                name,
                count: outcome.count,
                started,
            },
            (None, Some(track)) => Reply::Started { track },
            (None, None) => Reply::Queued {
                track: first,
                position: outcome.position,
            },
        })
    }

    fn stats(&self, inv: &Invocation) -> BotStats {
        let uptime = (Utc::now() - self.started_at).to_std().unwrap_or_default();
        let registry = self.player.registry();
        BotStats {
            guilds: inv.gateway.guild_count,
            sessions: registry.len(),
            playing: registry.playing_count(),
            uptime,
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        audio::{
            node::{LoadKind, LoadResult},
            registry::SessionRegistry,
            testing::{track, FakeNode, FakeNotifier},
        },
        sources::SearchPlatform,
    };
    use pretty_assertions::assert_eq;

    fn prefix(content: &str) -> Option<Result<Command, ParseError>> {
        Command::from_prefix(content, ".")
    }

    #[test]
    fn prefix_commands_and_aliases() {
        assert_eq!(
            prefix(".play never gonna  give"),
            Some(Ok(Command::Play {
                query: "never gonna give".into()
            }))
        );
        assert_eq!(prefix(".np"), Some(Ok(Command::NowPlaying)));
        assert_eq!(prefix(".clear"), Some(Ok(Command::ClearQueue)));
        assert_eq!(prefix(".vol 30"), Some(Ok(Command::Volume { level: Some(30) })));
        assert_eq!(prefix(".VOLUME"), Some(Ok(Command::Volume { level: None })));
        assert_eq!(prefix(".move 3 1"), Some(Ok(Command::Move { from: 3, to: 1 })));
        assert_eq!(prefix(".queue 2"), Some(Ok(Command::Queue { page: 2 })));
    }

    #[test]
    fn prefix_loop_defaults_to_track() {
        assert_eq!(prefix(".loop"), Some(Ok(Command::Loop { mode: LoopMode::Track })));
        assert_eq!(prefix(".loop off"), Some(Ok(Command::Loop { mode: LoopMode::Off })));
        assert_eq!(prefix(".loop queue"), Some(Ok(Command::Loop { mode: LoopMode::Queue })));
    }

    #[test]
    fn prefix_reports_missing_arguments() {
        assert_eq!(prefix(".play"), Some(Err(ParseError::Usage(".play <song name or URL>".into()))));
        assert!(matches!(prefix(".remove abc"), Some(Err(ParseError::Usage(_)))));
        assert!(matches!(prefix(".move 1"), Some(Err(ParseError::Usage(_)))));
        assert!(matches!(prefix(".filter reverb"), Some(Err(ParseError::UnknownFilter(_)))));
    }

    #[test]
    fn unrelated_messages_are_ignored() {
        assert_eq!(prefix("hello there"), None);
        assert_eq!(prefix(".dance"), None);
        assert_eq!(prefix("."), None);
        assert_eq!(Command::from_prefix("!play x", "."), None);
    }

    #[test]
    fn slash_options_are_read_by_name() {
        let mut options = SlashOptions::new();
        options.insert("from".into(), SlashValue::Int(4));
        options.insert("to".into(), SlashValue::Int(2));
        assert_eq!(
            Command::from_slash("move", &options),
            Some(Ok(Command::Move { from: 4, to: 2 }))
        );

        let mut options = SlashOptions::new();
        options.insert("mode".into(), SlashValue::Str("queue".into()));
        assert_eq!(
            Command::from_slash("loop", &options),
            Some(Ok(Command::Loop { mode: LoopMode::Queue }))
        );

        assert!(matches!(
            Command::from_slash("remove", &SlashOptions::new()),
            Some(Err(ParseError::Usage(_)))
        ));
        assert_eq!(Command::from_slash("lyrics", &SlashOptions::new()), None);
    }

    #[test]
    fn components_map_to_commands() {
        assert_eq!(Command::from_component(button_ids::PAUSE_RESUME, &[]), Some(Command::TogglePause));
        assert_eq!(Command::from_component(button_ids::LOOP, &[]), Some(Command::ToggleLoop));
        assert_eq!(
            Command::from_component(button_ids::FILTER_MENU, &["nightcore".to_string()]),
            Some(Command::Filter {
                preset: FilterPreset::Nightcore
            })
        );
        assert_eq!(Command::from_component("unknown", &[]), None);
    }

    struct Harness {
        node: Arc<FakeNode>,
        dispatcher: Dispatcher,
    }

    fn harness(node: FakeNode) -> Harness {
        let node = Arc::new(node);
        let notifier = Arc::new(FakeNotifier::default());
        let registry = Arc::new(SessionRegistry::new(node.clone(), 100));
        let player = Arc::new(AudioPlayer::new(registry, node.clone(), notifier));
        let resolver = SearchResolver::new(node.clone(), SearchPlatform::YoutubeMusic);
        Harness {
            node,
            dispatcher: Dispatcher::new(player, resolver, Arc::new(Config::default())),
        }
    }

    fn invocation(voice: bool) -> Invocation {
        Invocation {
            guild_id: GuildId::new(1),
            channel_id: ChannelId::new(2),
            user_id: UserId::new(42),
            voice_channel: voice.then(|| ChannelId::new(3)),
            gateway: GatewayInfo {
                guild_count: 5,
                latency: Some(Duration::from_millis(40)),
            },
        }
    }

    fn search_hit(title: &str) -> LoadResult {
        LoadResult::tracks(LoadKind::Search, vec![track(title), track("other")])
    }

    #[tokio::test]
    async fn play_requires_a_voice_channel() {
        let h = harness(FakeNode::default());
        let reply = h
            .dispatcher
            .execute(&invocation(false), Command::Play { query: "song".into() })
            .await;
        assert_eq!(reply, Reply::Failed(MusicError::NotInVoiceChannel.to_string()));
        assert!(h.node.loads().is_empty());
    }

    #[tokio::test]
    async fn play_starts_then_queues() {
        let h = harness(FakeNode::default().with_result("ytmsearch:song", search_hit("song")));
        let inv = invocation(true);

        let reply = h.dispatcher.execute(&inv, Command::Play { query: "song".into() }).await;
        assert_eq!(reply, Reply::Started { track: track("song") });

        let reply = h.dispatcher.execute(&inv, Command::Play { query: "song".into() }).await;
        assert_eq!(
            reply,
            Reply::Queued {
                track: track("song"),
                position: 1
            }
        );
        assert_eq!(h.node.handle.played(), vec!["song"]);
    }

    #[tokio::test]
    async fn empty_search_creates_no_session() {
        let h = harness(FakeNode::default());
        let inv = invocation(true);

        let reply = h.dispatcher.execute(&inv, Command::Play { query: "nothing".into() }).await;
        assert_eq!(reply, Reply::NoResults { query: "nothing".into() });
        assert!(h.dispatcher.player().registry().is_empty());
        assert!(h.node.connects().is_empty());
    }

    #[tokio::test]
    async fn playlists_are_queued_whole() {
        let url = "https://www.youtube.com/playlist?list=PL1";
        let playlist = LoadResult::playlist("Mix", vec![track("a"), track("b"), track("c")]);
        let h = harness(FakeNode::default().with_result(url, playlist));

        let reply = h.dispatcher.execute(&invocation(true), Command::Play { query: url.into() }).await;
        assert_eq!(
            reply,
            Reply::PlaylistQueued {
                name: "Mix".into(),
                count: 3,
                started: Some(track("a")),
            }
        );
    }

    #[tokio::test]
    async fn queue_commands_without_session_fail_softly() {
        let h = harness(FakeNode::default());
        let inv = invocation(true);

        for command in [Command::Shuffle, Command::ClearQueue, Command::Remove { position: 1 }] {
            let reply = h.dispatcher.execute(&inv, command).await;
            assert_eq!(reply, Reply::Failed(MusicError::NoSession.to_string()));
        }
        let reply = h.dispatcher.execute(&inv, Command::Queue { page: 1 }).await;
        assert_eq!(reply, Reply::Failed(MusicError::NothingPlaying.to_string()));
    }

    #[tokio::test]
    async fn volume_without_level_reports_current() {
        let h = harness(FakeNode::default().with_result("ytmsearch:song", search_hit("song")));
        let inv = invocation(true);
        h.dispatcher.execute(&inv, Command::Play { query: "song".into() }).await;

        let reply = h.dispatcher.execute(&inv, Command::Volume { level: Some(35) }).await;
        assert_eq!(reply, Reply::Volume { level: 35 });
        let reply = h.dispatcher.execute(&inv, Command::Volume { level: None }).await;
        assert_eq!(reply, Reply::Volume { level: 35 });

        let reply = h.dispatcher.execute(&inv, Command::Volume { level: Some(101) }).await;
        assert!(reply.is_failure());
    }

    #[tokio::test]
    async fn info_commands_need_no_session() {
        let h = harness(FakeNode::default());
        let inv = invocation(false);

        assert_eq!(
            h.dispatcher.execute(&inv, Command::Ping).await,
            Reply::Pong {
                latency: Some(Duration::from_millis(40))
            }
        );
        assert_eq!(
            h.dispatcher.execute(&inv, Command::Help).await,
            Reply::Help {
                prefix: Some(".".into())
            }
        );
        match h.dispatcher.execute(&inv, Command::Stats).await {
            Reply::Stats(stats) => {
                assert_eq!(stats.guilds, 5);
                assert_eq!(stats.sessions, 0);
            }
            other => panic!("unexpected reply {other:?}"),
        }
    }
}
