use connectors::{error::ClientError, file::error::FileError};
use engine_core::error::PagingError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Paging failed: {0}")]
    Paging(#[from] PagingError),

    #[error("Failed to write export file: {0}")]
    File(#[from] FileError),
}

impl ExportError {
    pub fn is_invalid_paging_config(&self) -> bool {
        matches!(self, ExportError::Paging(err) if err.is_invalid_paging_config())
    }
}

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Commit batch size must be greater than zero")]
    InvalidBatchSize,

    #[error("Failed to read documents: {0}")]
    Read(#[from] FileError),

    #[error("Failed to read documents from source index: {0}")]
    Source(#[from] PagingError),

    #[error("Failed to write batch {batch}: {source}")]
    Write {
        batch: u64,
        #[source]
        source: ClientError,
    },
}

impl ImportError {
    pub fn is_invalid_paging_config(&self) -> bool {
        matches!(self, ImportError::Source(err) if err.is_invalid_paging_config())
    }
}
