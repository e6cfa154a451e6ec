use reqwest::StatusCode;
use thiserror::Error;

/// How the pager should treat a failed client call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The server rejected the paging parameters (cursor without a unique-key sort, etc.).
    InvalidPagingConfig,
    /// The server answered, but not in the shape the contract promises.
    MalformedResponse,
    /// Anything else: network, timeouts, server-side faults.
    Transport,
}

/// All errors coming from a search/index client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Low-level HTTP failure (connect, timeout, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("Search server returned status {status}: {message}")]
    Server { status: StatusCode, message: String },

    /// The response body could not be decoded.
    #[error("Failed to decode search response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The response decoded, but a section the contract requires is absent.
    #[error("Search response is missing the '{0}' section")]
    MissingField(&'static str),

    /// The configured server URL is unusable.
    #[error("Invalid server URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Rejected paging parameters reported by a client that is not HTTP-backed.
    #[error("Invalid paging configuration: {0}")]
    InvalidPaging(String),

    #[error("Client error: {0}")]
    Other(String),
}

impl ClientError {
    pub fn server(status: StatusCode, message: impl Into<String>) -> Self {
        ClientError::Server {
            status,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            ClientError::Server { .. } => FailureKind::Transport,
            ClientError::InvalidPaging(_) => FailureKind::InvalidPagingConfig,
            ClientError::Decode(_) | ClientError::MissingField(_) => FailureKind::MalformedResponse,
            ClientError::Http(err) if err.is_decode() => FailureKind::MalformedResponse,
            ClientError::Http(_) => FailureKind::Transport,
            ClientError::InvalidUrl { .. } => FailureKind::Transport,
            ClientError::Other(_) => FailureKind::Transport,
        }
    }

    /// Message suitable for surfacing to an operator without the variant prefix.
    pub fn detail(&self) -> String {
        match self {
            ClientError::Server { message, .. } => message.clone(),
            ClientError::InvalidPaging(message) => message.clone(),
            other => other.to_string(),
        }
    }
}
