use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("File not found: {0}")]
    NotFound(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("Malformed JSON on line {line}: {source}")]
    Malformed {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("Line {line} is not a JSON object")]
    NotAnObject { line: usize },
    #[error("Failed to serialize document: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl FileError {
    /// Maps an open/create failure onto the path it concerned.
    pub fn from_open(path: &str, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => FileError::NotFound(path.to_string()),
            io::ErrorKind::PermissionDenied => FileError::PermissionDenied(path.to_string()),
            _ => FileError::IoError(err),
        }
    }
}
