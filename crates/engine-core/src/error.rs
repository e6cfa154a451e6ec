use connectors::error::{ClientError, FailureKind};
use model::search::query::QueryError;
use thiserror::Error;

/// Failures surfaced by the pager from `start` or `next`.
///
/// Nothing here is retried by the pager itself; the caller decides.
#[derive(Error, Debug)]
pub enum PagingError {
    /// The query was rejected before any request went out.
    #[error("Invalid query: {0}")]
    InvalidQuery(#[from] QueryError),

    /// The server could not be reached or failed to answer.
    #[error("Failed to reach the search server: {source}")]
    Connectivity {
        #[source]
        source: ClientError,
    },

    /// The server answered with something the paging contract does not allow.
    #[error("Unexpected response from the search server: {0}")]
    Protocol(String),

    /// Cursor paging is not possible for this query as configured, typically
    /// because the sort does not end on the unique key field.
    #[error("Invalid paging configuration: {0}")]
    InvalidPagingConfig(String),
}

impl PagingError {
    /// Reclassifies a client failure into the pager's taxonomy.
    pub fn from_client(err: ClientError) -> Self {
        match err.kind() {
            FailureKind::InvalidPagingConfig => PagingError::InvalidPagingConfig(err.detail()),
            FailureKind::MalformedResponse => PagingError::Protocol(err.to_string()),
            FailureKind::Transport => PagingError::Connectivity { source: err },
        }
    }

    pub fn is_invalid_paging_config(&self) -> bool {
        matches!(self, PagingError::InvalidPagingConfig(_))
    }
}
