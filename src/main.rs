use anyhow::Result;
use serenity::{http::Http, model::gateway::GatewayIntents, Client};
use songbird::{SerenityInit, Songbird};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};

mod audio;
mod bot;
mod config;
mod health;
mod sources;
mod ui;

use crate::audio::{lavalink_client::LavalinkManager, player::AudioPlayer, registry::SessionRegistry};
use crate::bot::{events::EventRelay, handlers::Dispatcher, notifier::DiscordNotifier, MusicBot};
use crate::config::Config;
use crate::sources::SearchResolver;

#[tokio::main]
async fn main() -> Result<()> {
    // Inicializar logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("musicbot=debug".parse()?)
                .add_directive("serenity=info".parse()?)
                .add_directive("songbird=info".parse()?)
                .add_directive("lavalink_rs=info".parse()?),
        )
        .init();

    info!("🎵 Iniciando Music Bot v{}", env!("CARGO_PKG_VERSION"));

    // Cargar configuración
    let config = Arc::new(Config::load()?);

    // Manejar health check si es necesario
    if std::env::args().any(|arg| arg == "--health-check") {
        return health::check(&config).await;
    }

    info!("{}", config.summary());

    let http = Arc::new(Http::new(&config.discord_token));
    let user_id = http.get_current_user().await?.id;

    // Inicializar Lavalink
    info!("🎼 Inicializando Lavalink...");
    let songbird = Songbird::serenity();
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let lavalink = Arc::new(LavalinkManager::new(&config, user_id, songbird.clone(), event_tx).await);

    // Sesiones y reproductor
    let notifier = Arc::new(DiscordNotifier::new(http.clone()));
    let registry = Arc::new(SessionRegistry::new(lavalink.clone(), config.default_volume));
    let player = Arc::new(AudioPlayer::new(registry, lavalink.clone(), notifier));

    let relay = Arc::new(EventRelay::new(player.clone()));
    tokio::spawn(relay.run(event_rx));

    let resolver = SearchResolver::new(lavalink, config.search_platform);
    let dispatcher = Arc::new(Dispatcher::new(player, resolver, config.clone()));

    // Configurar intents mínimos necesarios
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_VOICE_STATES
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    // Construir cliente
    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(MusicBot::new(config.clone(), dispatcher))
        .register_songbird_with(songbird)
        .await?;

    // Health check HTTP
    let health_config = config.clone();
    tokio::spawn(async move {
        if let Err(e) = health::serve(&health_config).await {
            error!("❌ Error en el servidor de health check: {:?}", e);
        }
    });

    // Manejar shutdown graceful
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("⚠️ Señal de shutdown recibida, cerrando...");
                std::process::exit(0);
            }
            Err(e) => error!("Error al registrar Ctrl+C: {:?}", e),
        }
    });

    // Iniciar bot
    info!("🚀 Bot iniciado exitosamente");
    if let Err(why) = client.start().await {
        error!("Error al ejecutar cliente: {:?}", why);
    }

    Ok(())
}
