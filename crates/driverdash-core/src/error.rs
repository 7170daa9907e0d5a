//! Crate-level errors

use thiserror::Error;

use crate::location::LocationError;

/// Errors surfaced by configuration, persistence and location plumbing
#[derive(Error, Debug)]
pub enum DashError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Location error: {0}")]
    Location(#[from] LocationError),

    #[error("Failed to persist '{key}': {reason}")]
    Persist { key: String, reason: String },

    #[error("Session runner has shut down")]
    RunnerClosed,
}

/// Result alias used across the crate
pub type DashResult<T> = Result<T, DashError>;
