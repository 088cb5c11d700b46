//! Error types for plexiglass

use thiserror::Error;

/// Main error type for plexiglass
#[derive(Error, Debug)]
pub enum PlexiglassError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Type mismatch at '{key}': expected {expected}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
    },

    #[error("Invalid workspace '{0}'")]
    InvalidWorkspace(String),

    #[error("Timeout after {0:.1} seconds")]
    Timeout(f64),

    #[error("Invalid argument: {0}")]
    Argument(String),
}

pub type Result<T> = std::result::Result<T, PlexiglassError>;
