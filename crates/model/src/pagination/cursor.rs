use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque, server-issued resume token for a sorted scan.
///
/// The pager never looks inside a mark; it only compares consecutive marks for
/// equality, which is how the server signals that the scan made no progress.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct CursorMark(String);

impl CursorMark {
    /// Reserved token that asks the server for the first page.
    pub const START: &'static str = "*";

    pub fn new(token: impl Into<String>) -> Self {
        CursorMark(token.into())
    }

    pub fn start() -> Self {
        CursorMark(Self::START.to_string())
    }

    pub fn is_start(&self) -> bool {
        self.0 == Self::START
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CursorMark {
    fn default() -> Self {
        CursorMark::start()
    }
}

impl fmt::Display for CursorMark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CursorMark {
    fn from(token: &str) -> Self {
        CursorMark::new(token)
    }
}
