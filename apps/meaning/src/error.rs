//! # Application Errors
//!
//! Everything that can stop a CLI invocation. Engine errors are wrapped,
//! never re-described.

use meaning_core::EngineError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// A file could not be read.
    #[error("Cannot read '{}': {reason}", path.display())]
    Io { path: PathBuf, reason: String },

    /// A file exceeded the size the host is willing to load.
    #[error("File '{}' is {size} bytes, more than the {limit} allowed", path.display())]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    /// A file was read but did not parse.
    #[error("Cannot parse '{}': {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    /// The TOML configuration was rejected.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A command argument was malformed.
    #[error("Invalid argument: {0}")]
    Argument(String),

    /// The world failed validation.
    #[error("World is invalid ({0} error(s))")]
    InvalidWorld(usize),

    /// The engine refused to build or load something.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Output could not be rendered.
    #[error("Cannot render output: {0}")]
    Render(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Render(err.to_string())
    }
}
