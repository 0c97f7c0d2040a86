//! Error types shared by the handlers and the persistence layer.

/// Result type for persistence operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by a `Store` implementation
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Failed to read image manifest: {0}")]
    Manifest(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Errors surfaced to the client as `{success: false, message}`
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("not logged in")]
    Unauthenticated,

    #[error("invalid csrf token")]
    InvalidCsrfToken,

    #[error("missing session data")]
    MissingSessionData,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("persistence failure: {0}")]
    Persistence(#[from] StoreError),

    #[error("unknown action: {0}")]
    UnknownAction(String),
}

pub const PROCESSING_ERROR_MESSAGE: &str =
    "An error occurred while processing your request. Please try again.";

impl GameError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        GameError::InvalidInput(msg.into())
    }

    /// Message shown to the player. Persistence details never leave the server.
    pub fn client_message(&self) -> String {
        match self {
            GameError::Unauthenticated => "You must be logged in to play".to_string(),
            GameError::InvalidCsrfToken => "Invalid CSRF token".to_string(),
            GameError::MissingSessionData => {
                "Game session expired or not started. Please start a new game.".to_string()
            }
            GameError::InvalidInput(msg) => msg.clone(),
            GameError::NotFound(what) => format!("{} not found", what),
            GameError::Persistence(_) => PROCESSING_ERROR_MESSAGE.to_string(),
            GameError::UnknownAction(action) => format!("Unknown action: {}", action),
        }
    }
}

pub type GameResult<T> = Result<T, GameError>;
