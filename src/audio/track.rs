use serenity::model::id::UserId;
use std::{fmt, time::Duration};

/// Pista normalizada. Todo lo que entra desde el nodo de audio se convierte
/// a este tipo en la frontera, el resto del bot nunca ve el formato crudo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    /// Identificador opaco que el nodo necesita para reproducir la pista
    pub encoded: String,
    pub title: String,
    pub author: String,
    pub uri: Option<String>,
    /// `None` para streams o duración desconocida
    pub duration: Option<Duration>,
    pub artwork_url: Option<String>,
    pub requester: UserId,
}

impl Track {
    pub fn new(encoded: impl Into<String>, title: impl Into<String>, requester: UserId) -> Self {
        Self {
            encoded: encoded.into(),
            title: title.into(),
            author: String::new(),
            uri: None,
            duration: None,
            artwork_url: None,
            requester,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Una duración de cero milisegundos se trata como desconocida
    pub fn with_duration_ms(mut self, millis: u64) -> Self {
        self.duration = (millis > 0).then(|| Duration::from_millis(millis));
        self
    }

    pub fn with_artwork(mut self, artwork_url: Option<String>) -> Self {
        self.artwork_url = artwork_url;
        self
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration.map(|d| d.as_millis() as u64).unwrap_or(0)
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.author.is_empty() {
            write!(f, "{}", self.title)
        } else {
            write!(f, "{} - {}", self.title, self.author)
        }
    }
}

/// Modo de repetición de una sesión
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopMode {
    #[default]
    Off,
    Track,
    Queue,
}

impl LoopMode {
    /// Interpreta el argumento de usuario. Cualquier valor no reconocido
    /// (incluido el vacío) selecciona `Track`.
    pub fn parse_or_track(input: &str) -> Self {
        match input.trim().to_ascii_lowercase().as_str() {
            "off" | "none" | "disable" | "disabled" => LoopMode::Off,
            "queue" | "all" => LoopMode::Queue,
            _ => LoopMode::Track,
        }
    }

    /// Alterna entre `Off` y `Track`, usado por el botón de repetición
    pub fn toggled(self) -> Self {
        match self {
            LoopMode::Off => LoopMode::Track,
            _ => LoopMode::Off,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LoopMode::Off => "off",
            LoopMode::Track => "track",
            LoopMode::Queue => "queue",
        }
    }
}

impl fmt::Display for LoopMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
