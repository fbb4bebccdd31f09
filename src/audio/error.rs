use thiserror::Error;

pub type MusicResult<T> = Result<T, MusicError>;

/// Errores de las operaciones de reproducción. Los mensajes se muestran
/// tal cual al usuario.
#[derive(Debug, Error)]
pub enum MusicError {
    #[error("Nothing is playing right now.")]
    NothingPlaying,

    #[error("There is no active player in this server.")]
    NoSession,

    #[error("Invalid position {position}. The queue has {len} track(s).")]
    InvalidPosition { position: i64, len: usize },

    #[error("Volume must be between 0 and 100 (got {value}).")]
    OutOfRange { value: i64 },

    #[error("Not enough tracks in the queue to shuffle.")]
    InsufficientTracks,

    #[error("You need to join a voice channel first.")]
    NotInVoiceChannel,

    #[error("The player is not connected to a voice channel.")]
    NotConnected,

    #[error("The audio node failed: {0}")]
    Node(#[from] NodeError),
}

impl MusicError {
    /// Errores provocados por el usuario, se registran a nivel debug
    pub fn is_user_error(&self) -> bool {
        !matches!(self, MusicError::Node(_))
    }
}

/// Fallos del nodo de audio remoto
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("track lookup failed: {0}")]
    Load(String),

    #[error("could not join the voice channel: {0}")]
    Connect(String),

    #[error("player request failed: {0}")]
    Request(String),
}

/// Fallos al entregar mensajes al canal de texto
#[derive(Debug, Error)]
#[error("failed to deliver message: {0}")]
pub struct NotifyError(pub String);
