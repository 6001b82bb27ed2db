//! Common error types for djbuddy

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for djbuddy operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors shared by the config loader, the database layer and the poller
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file exists but is not valid TOML for [`crate::config::TomlConfig`]
    #[error("Malformed config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration value out of range or unresolvable
    #[error("Configuration error: {0}")]
    Config(String),

    /// Mixxx library database was not found at the resolved location
    #[error("Mixxx database not found at {}", .0.display())]
    DatabaseNotFound(PathBuf),
}
