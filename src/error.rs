/// Error types for Meeting Insight
///
/// Uses thiserror for ergonomic error handling with proper Display implementations.
use thiserror::Error;

/// Main error type for the application
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] rusqlite_migration::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Keychain error: {0}")]
    Keychain(#[from] keyring::Error),

    #[error("LLM service error: {0}")]
    Llm(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// A gateway request failed and the user has already been notified
    #[error("{0} failed")]
    RequestFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;
