//! Error handling for HackConf
//!
//! This module defines the main error type used throughout the crate
//! and the mapping the HTTP layer applies when turning it into a response.

use thiserror::Error;

/// Main error type for HackConf operations
#[derive(Error, Debug)]
pub enum HackConfError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("User {user_id} has already checked into event {event_id}")]
    DuplicateCheckIn { event_id: i64, user_id: i64 },

    #[error("Storage error: {0}")]
    Storage(String),

}

/// Result type alias for HackConf operations
pub type Result<T> = std::result::Result<T, HackConfError>;

impl HackConfError {
    pub fn user_not_found() -> Self {
        HackConfError::NotFound("user does not exist".to_string())
    }

    pub fn event_not_found() -> Self {
        HackConfError::NotFound("event does not exist".to_string())
    }

    /// HTTP status code the web layer should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            HackConfError::NotFound(_) => 404,
            HackConfError::BadRequest(_) => 400,
            HackConfError::DuplicateCheckIn { .. } => 409,
            _ => 500,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            HackConfError::Database(_) => ErrorSeverity::Critical,
            HackConfError::Migration(_) => ErrorSeverity::Critical,
            HackConfError::Config(_) => ErrorSeverity::Critical,
            HackConfError::NotFound(_) => ErrorSeverity::Info,
            HackConfError::BadRequest(_) => ErrorSeverity::Info,
            HackConfError::DuplicateCheckIn { .. } => ErrorSeverity::Warning,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
