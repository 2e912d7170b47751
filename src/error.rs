//! Error types for the media shelf

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for media shelf operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the media shelf
///
/// Classification and reconciliation never produce these; only the
/// directory and favorites collaborators do.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Library directory unavailable ({}): {message}", display_path(.path))]
    StorageUnavailable {
        path: Option<PathBuf>,
        message: String,
    },

    #[error("Favorites store unavailable ({}): {message}", display_path(.path))]
    PersistenceUnavailable {
        path: Option<PathBuf>,
        message: String,
    },

    #[error("Favorites data at {} is malformed: {message}", display_path(.path))]
    MalformedPersistedData {
        path: Option<PathBuf>,
        message: String,
    },

    #[error("Media not found in library: {name}")]
    MediaNotFound { name: String },

    #[error("Invalid media name: {name}")]
    InvalidName { name: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Directory traversal error: {0}")]
    WalkDir(#[from] walkdir::Error),

    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),
}

impl Error {
    /// Read-path failures that a listing recovers from by rendering empty
    pub fn is_recoverable_read(&self) -> bool {
        matches!(
            self,
            Error::StorageUnavailable { .. }
                | Error::PersistenceUnavailable { .. }
                | Error::MalformedPersistedData { .. }
        )
    }
}

fn display_path(path: &Option<PathBuf>) -> String {
    match path {
        Some(p) => p.display().to_string(),
        None => "not configured".to_string(),
    }
}
