use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong, as distinct variants so callers can match
/// on the case instead of inspecting message text.
#[derive(Debug, Error)]
pub enum Error {
    /// The API answered with a non-success status. `detail` carries the
    /// server-provided body when there was one.
    #[error("API error {status}: {detail}")]
    Api { status: u16, detail: String },

    /// Transport-level failure (connection, TLS, decode).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A name-to-id lookup found nothing.
    #[error("{kind} \"{query}\" not found")]
    NotFound { kind: &'static str, query: String },

    #[error("Space ID {0} is not in allowed list")]
    SpaceNotAllowed(i64),

    #[error("Board ID {0} is not in allowed list")]
    BoardNotAllowed(i64),

    #[error("Card {card_id} belongs to board {board_id} which is not in allowed list")]
    CardNotAllowed { card_id: i64, board_id: i64 },

    #[error("Not a git repository")]
    NotARepo,

    #[error("git {command} failed: {stderr}")]
    Git { command: String, stderr: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Usage(String),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    /// True for allowlist violations. The card-scoped guard uses this to
    /// decide which lookup errors to re-raise.
    pub fn is_access_denied(&self) -> bool {
        matches!(
            self,
            Error::SpaceNotAllowed(_) | Error::BoardNotAllowed(_) | Error::CardNotAllowed { .. }
        )
    }
}
