use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures that stop a job (or a utility) before it can do its work.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Import folder not found: {}", .0.display())]
    SourceMissing(PathBuf),

    #[error("Import path is not a directory: {}", .0.display())]
    SourceNotDirectory(PathBuf),

    #[error("Import folder {} is not readable: {source}", path.display())]
    SourceUnreadable { path: PathBuf, source: io::Error },

    #[error("Worker thread panicked")]
    WorkerPanicked,
}

/// Failure confined to a single file. Recorded and counted, never propagated
/// past the file boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FileError {
    #[error("failed to decode image {}: {reason}", path.display())]
    Unreadable { path: PathBuf, reason: String },

    #[error("source file vanished: {}", .0.display())]
    SourceMissing(PathBuf),

    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("cannot create destination folder {}: {reason}", path.display())]
    DestinationUncreatable { path: PathBuf, reason: String },

    #[error("failed to move {}: {reason}", path.display())]
    Io { path: PathBuf, reason: String },
}

impl FileError {
    /// Maps an I/O failure on `path` onto the matching per-file variant.
    pub(crate) fn from_io(path: PathBuf, err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => FileError::SourceMissing(path),
            io::ErrorKind::PermissionDenied => FileError::PermissionDenied(path),
            _ => FileError::Io {
                path,
                reason: err.to_string(),
            },
        }
    }
}
