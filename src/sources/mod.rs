//! Turns free-form user input into playable tracks.
//!
//! Direct links go straight to the audio node. Anything else is normalized
//! and tried against a fixed chain of search strategies, stopping at the
//! first one that yields tracks.

use regex::Regex;
use serenity::model::id::{GuildId, UserId};
use std::{fmt, str::FromStr, sync::{Arc, LazyLock}};
use tracing::{debug, info, warn};
use url::Url;

use crate::audio::{
    node::{AudioNode, LoadKind, LoadResult},
    track::Track,
};

/// Prefijos de búsqueda que el usuario puede escribir a mano
static SEARCH_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i)(?:\s*(?:ytmsearch|ytsearch|scsearch):)+").expect("search prefix regex")
});

/// Catálogo preferido para las búsquedas por texto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchPlatform {
    #[default]
    YoutubeMusic,
    Youtube,
    Soundcloud,
}

impl SearchPlatform {
    pub fn prefix(&self) -> &'static str {
        match self {
            SearchPlatform::YoutubeMusic => "ytmsearch",
            SearchPlatform::Youtube => "ytsearch",
            SearchPlatform::Soundcloud => "scsearch",
        }
    }
}

impl FromStr for SearchPlatform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "youtube_music" | "ytmsearch" | "ytm" => Ok(SearchPlatform::YoutubeMusic),
            "youtube" | "ytsearch" | "yt" => Ok(SearchPlatform::Youtube),
            "soundcloud" | "scsearch" | "sc" => Ok(SearchPlatform::Soundcloud),
            other => Err(format!("plataforma de búsqueda desconocida: {other}")),
        }
    }
}

impl fmt::Display for SearchPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Resultado normalizado de una resolución
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedResult {
    Single(Vec<Track>),
    Playlist { name: String, tracks: Vec<Track> },
    Empty,
}

impl ResolvedResult {
    fn from_load(result: LoadResult) -> Self {
        match result.kind {
            LoadKind::Playlist => ResolvedResult::Playlist {
                name: result
                    .playlist_name
                    .unwrap_or_else(|| "Unknown playlist".to_string()),
                tracks: result.tracks,
            },
            _ => ResolvedResult::Single(result.tracks),
        }
    }
}

pub struct SearchResolver {
    node: Arc<dyn AudioNode>,
    platform: SearchPlatform,
}

impl SearchResolver {
    pub fn new(node: Arc<dyn AudioNode>, platform: SearchPlatform) -> Self {
        Self { node, platform }
    }

    /// Resuelve la consulta del usuario. Los fallos del nodo nunca se
    /// propagan: se registran y cuentan como "sin resultado".
    pub async fn resolve(&self, guild_id: GuildId, query: &str, requester: UserId) -> ResolvedResult {
        let query = query.trim();

        if is_direct_locator(query) {
            if let Some(result) = self.attempt(guild_id, query, requester).await {
                return result;
            }
            debug!("🔗 URL sin resultados, probando búsqueda: {}", query);
        }

        let normalized = normalize_query(query);
        if normalized.is_empty() {
            debug!("Consulta vacía tras normalizar: {:?}", query);
            return ResolvedResult::Empty;
        }

        for identifier in self.search_chain(&normalized) {
            if let Some(result) = self.attempt(guild_id, &identifier, requester).await {
                info!("🔍 Resultado encontrado con {}", identifier);
                return result;
            }
        }

        info!("❌ Sin resultados para: {}", normalized);
        ResolvedResult::Empty
    }

    /// Plataforma preferida, búsqueda genérica de vídeo y texto crudo
    fn search_chain(&self, query: &str) -> [String; 3] {
        [
            format!("{}:{}", self.platform.prefix(), query),
            format!("{}:{}", SearchPlatform::Youtube.prefix(), query),
            query.to_string(),
        ]
    }

    async fn attempt(&self, guild_id: GuildId, identifier: &str, requester: UserId) -> Option<ResolvedResult> {
        match self.node.load(guild_id, identifier, requester).await {
            Ok(result) if result.is_usable() => Some(ResolvedResult::from_load(result)),
            Ok(result) => {
                if let Some(error) = &result.error {
                    warn!("⚠️ El nodo no pudo cargar {}: {}", identifier, error);
                }
                None
            }
            Err(e) => {
                warn!("⚠️ Error al buscar {}: {}", identifier, e);
                None
            }
        }
    }
}

/// Enlaces http(s) que el nodo puede cargar directamente
pub fn is_direct_locator(query: &str) -> bool {
    Url::parse(query)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.host().is_some())
        .unwrap_or(false)
}

/// Quita los prefijos de búsqueda escritos por el usuario
pub fn normalize_query(query: &str) -> String {
    SEARCH_PREFIX.replace(query.trim(), "").trim().to_string()
}
