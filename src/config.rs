use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::sources::SearchPlatform;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    // Discord
    pub discord_token: String,
    pub application_id: Option<u64>,
    pub guild_id: Option<u64>, // Para comandos de desarrollo

    // Comandos con prefijo
    pub prefix: String,
    pub enable_prefix: bool,

    // Lavalink
    pub lavalink_host: String,
    pub lavalink_port: u16,
    pub lavalink_password: String,
    pub lavalink_secure: bool,

    // Audio
    pub search_platform: SearchPlatform,
    pub default_volume: u8,
    pub queue_page_size: usize,

    // Enlaces
    pub support_url: Option<String>,
    pub github_url: Option<String>,

    // Health check
    pub health_host: String,
    pub health_port: u16,
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Construye la configuración a partir de una función de búsqueda de
    /// variables, para poder probarla sin tocar el entorno del proceso
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let optional = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let config = Self {
            // Discord
            discord_token: optional("DISCORD_TOKEN").context("DISCORD_TOKEN no está definido")?,
            application_id: optional("APPLICATION_ID")
                .map(|id| id.parse())
                .transpose()
                .context("APPLICATION_ID inválido")?,
            guild_id: optional("GUILD_ID").and_then(|s| s.parse().ok()),

            prefix: var("PREFIX", "."),
            enable_prefix: var("ENABLE_PREFIX", "true")
                .parse()
                .context("ENABLE_PREFIX debe ser true o false")?,

            // Lavalink
            lavalink_host: var("LAVALINK_HOST", "localhost"),
            lavalink_port: var("LAVALINK_PORT", "2333")
                .parse()
                .context("LAVALINK_PORT inválido")?,
            lavalink_password: var("LAVALINK_PASSWORD", "youshallnotpass"),
            lavalink_secure: var("LAVALINK_SECURE", "false")
                .parse()
                .context("LAVALINK_SECURE debe ser true o false")?,

            // Audio
            search_platform: var("SEARCH_PLATFORM", "youtube_music")
                .parse()
                .map_err(anyhow::Error::msg)?,
            default_volume: var("DEFAULT_VOLUME", "100")
                .parse()
                .context("DEFAULT_VOLUME inválido")?,
            queue_page_size: var("QUEUE_PAGE_SIZE", "10")
                .parse()
                .context("QUEUE_PAGE_SIZE inválido")?,

            // Enlaces
            support_url: optional("SUPPORT_URL"),
            github_url: optional("GITHUB_URL"),

            // Health check
            health_host: var("HEALTH_HOST", "0.0.0.0"),
            health_port: var("HEALTH_PORT", "3000")
                .parse()
                .context("HEALTH_PORT inválido")?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates configuration values for correctness.
    pub fn validate(&self) -> Result<()> {
        if self.default_volume > 100 {
            anyhow::bail!("Default volume must be between 0 and 100, got: {}", self.default_volume);
        }

        if self.queue_page_size == 0 || self.queue_page_size > 25 {
            anyhow::bail!("Queue page size must be between 1 and 25, got: {}", self.queue_page_size);
        }

        if self.prefix.trim().is_empty() || self.prefix.contains(char::is_whitespace) {
            anyhow::bail!("Command prefix must be non-empty and contain no spaces");
        }

        Ok(())
    }

    /// Enlace de invitación del bot, si se conoce el application id
    pub fn invite_url(&self) -> Option<String> {
        self.application_id.map(|id| {
            format!(
                "https://discord.com/oauth2/authorize?client_id={}&permissions=3165184&scope=bot%20applications.commands",
                id
            )
        })
    }

    /// Returns a summary of the current configuration for logging.
    ///
    /// Tokens and passwords are left out.
    pub fn summary(&self) -> String {
        format!(
            "Config Summary:\n  \
            Discord: App ID {} (Guild: {})\n  \
            Commands: prefix {:?} ({})\n  \
            Lavalink: {}:{} (ssl: {})\n  \
            Audio: {}% vol, search {}, {} per page\n  \
            Health: {}:{}",
            self.application_id.map_or("unknown".to_string(), |id| id.to_string()),
            self.guild_id.map_or("global".to_string(), |id| id.to_string()),
            self.prefix,
            if self.enable_prefix { "enabled" } else { "disabled" },
            self.lavalink_host,
            self.lavalink_port,
            self.lavalink_secure,
            self.default_volume,
            self.search_platform,
            self.queue_page_size,
            self.health_host,
            self.health_port,
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            // Discord (no defaults - must be provided)
            discord_token: String::new(),
            application_id: None,
            guild_id: None,

            prefix: ".".to_string(),
            enable_prefix: true,

            lavalink_host: "localhost".to_string(),
            lavalink_port: 2333,
            lavalink_password: "youshallnotpass".to_string(),
            lavalink_secure: false,

            search_platform: SearchPlatform::YoutubeMusic,
            default_volume: 100,
            queue_page_size: 10,

            support_url: None,
            github_url: None,

            health_host: "0.0.0.0".to_string(),
            health_port: 3000,
        }
    }
}
