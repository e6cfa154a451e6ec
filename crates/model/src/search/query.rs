use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Matches every document in the collection.
pub const MATCH_ALL: &str = "*:*";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("Page size must be greater than zero")]
    ZeroRows,

    #[error("Query string must not be empty")]
    EmptyQuery,

    #[error("Request parameter '{0}' is managed by the pager and cannot be overridden")]
    ReservedParam(String),
}

/// Request parameters the pager owns; callers may not smuggle them in through `params`.
const RESERVED_PARAMS: [&str; 6] = ["q", "rows", "start", "sort", "cursorMark", "fl"];

/// An immutable description of what to scan and how large each page is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Query string in the index's own syntax.
    pub q: String,
    /// Field allowlist for returned documents. Empty means every stored field.
    pub fields: Vec<String>,
    /// Sort clause, e.g. `id desc`. Cursor paging requires one that ends on the unique key.
    pub sort: Option<String>,
    /// Page size.
    pub rows: usize,
    /// Extra request parameters forwarded verbatim (filter queries and the like).
    pub params: Vec<(String, String)>,
}

impl Query {
    pub fn new(q: impl Into<String>, rows: usize) -> Self {
        Query {
            q: q.into(),
            fields: Vec::new(),
            sort: None,
            rows,
            params: Vec::new(),
        }
    }

    pub fn match_all(rows: usize) -> Self {
        Query::new(MATCH_ALL, rows)
    }

    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Checks the invariants the pager relies on before any request goes out.
    pub fn validate(&self) -> Result<(), QueryError> {
        if self.rows == 0 {
            return Err(QueryError::ZeroRows);
        }
        if self.q.trim().is_empty() {
            return Err(QueryError::EmptyQuery);
        }
        if let Some((key, _)) = self
            .params
            .iter()
            .find(|(key, _)| RESERVED_PARAMS.contains(&key.as_str()))
        {
            return Err(QueryError::ReservedParam(key.clone()));
        }
        Ok(())
    }
}
