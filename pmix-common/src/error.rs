//! Common error types for PMIX

use thiserror::Error;

/// Common result type for PMIX operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across PMIX crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON input (source lists, audio features)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed TOML configuration file
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid caller input (rejected before sequencing starts)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
