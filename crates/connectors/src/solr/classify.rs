use crate::error::{ClientError, FailureKind};
use model::pagination::page::PagePosition;
use reqwest::StatusCode;

/// The server names the feature in every refusal of a cursor request.
const CURSOR_REJECTION_MARKER: &str = "Cursor";

/// Classifies a server-reported error message for the request that produced it.
///
/// Paging misconfiguration comes back as an ordinary 400 with free text, so
/// the message only counts as one when the request actually carried a cursor mark.
pub fn classify_server_message(message: &str, position: &PagePosition) -> FailureKind {
    match position {
        PagePosition::Cursor(_) if message.contains(CURSOR_REJECTION_MARKER) => {
            FailureKind::InvalidPagingConfig
        }
        _ => FailureKind::Transport,
    }
}

/// Turns a 400 refusal of a cursor request into [`ClientError::InvalidPaging`].
pub fn reclassify(err: ClientError, position: &PagePosition) -> ClientError {
    match err {
        ClientError::Server { status, message }
            if status == StatusCode::BAD_REQUEST
                && classify_server_message(&message, position)
                    == FailureKind::InvalidPagingConfig =>
        {
            ClientError::InvalidPaging(message)
        }
        other => other,
    }
}
