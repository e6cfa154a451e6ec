use connectors::{error::ClientError, file::error::FileError};
use engine_core::error::PagingError;
use engine_processing::error::{ExportError, ImportError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to set up the search client: {0}")]
    Client(#[from] ClientError),

    #[error("File error: {0}")]
    File(#[from] FileError),

    #[error(transparent)]
    Paging(#[from] PagingError),

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),

    #[error("Import failed: {0}")]
    Import(#[from] ImportError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),
}

impl CliError {
    pub fn is_invalid_paging_config(&self) -> bool {
        match self {
            CliError::Paging(err) => err.is_invalid_paging_config(),
            CliError::Export(err) => err.is_invalid_paging_config(),
            CliError::Import(err) => err.is_invalid_paging_config(),
            _ => false,
        }
    }
}
