use model::core::document::Document;
use serde::Deserialize;

/// Body of a select handler response, reduced to what the pager consumes.
#[derive(Debug, Deserialize)]
pub struct SelectResponse {
    pub response: Option<ResultBlock>,
    #[serde(rename = "nextCursorMark")]
    pub next_cursor_mark: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResultBlock {
    #[serde(rename = "numFound")]
    pub num_found: Option<u64>,
    #[serde(default)]
    pub docs: Vec<Document>,
}

/// Error envelope the server returns alongside non-success statuses.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub msg: Option<String>,
}

/// Pulls the human-readable message out of an error body, falling back to the raw text.
pub fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(ErrorResponse {
            error: ErrorBody { msg: Some(msg), .. },
        }) => msg,
        _ => body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_cursor_page() {
        let body = r#"{
            "responseHeader": {"status": 0, "QTime": 3},
            "response": {"numFound": 2, "start": 0, "docs": [{"id": "a"}, {"id": "b"}]},
            "nextCursorMark": "AoEhYg=="
        }"#;

        let parsed: SelectResponse = serde_json::from_str(body).unwrap();
        let block = parsed.response.unwrap();
        assert_eq!(block.num_found, Some(2));
        assert_eq!(block.docs.len(), 2);
        assert_eq!(parsed.next_cursor_mark.as_deref(), Some("AoEhYg=="));
    }

    #[test]
    fn test_missing_count_survives_decoding() {
        let parsed: SelectResponse = serde_json::from_str(r#"{"response": {"docs": []}}"#).unwrap();
        assert_eq!(parsed.response.unwrap().num_found, None);
    }

    #[test]
    fn test_error_message_prefers_envelope() {
        let body = r#"{"error": {"msg": "Cursor functionality requires a sort", "code": 400}}"#;
        assert_eq!(error_message(body), "Cursor functionality requires a sort");
        assert_eq!(error_message("  Bad Gateway \n"), "Bad Gateway");
    }
}
