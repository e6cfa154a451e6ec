use crate::{core::document::Document, pagination::cursor::CursorMark};
use serde::Serialize;

/// Where in the result set a page starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PagePosition {
    /// Resume from a server-issued cursor mark.
    Cursor(CursorMark),
    /// Skip this many matching documents.
    Offset(u64),
}

/// A single page request as the pager issues it to a search client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    pub rows: usize,
    pub position: PagePosition,
}

impl PageRequest {
    pub fn cursor(rows: usize, mark: CursorMark) -> Self {
        PageRequest {
            rows,
            position: PagePosition::Cursor(mark),
        }
    }

    pub fn offset(rows: usize, start: u64) -> Self {
        PageRequest {
            rows,
            position: PagePosition::Offset(start),
        }
    }
}

/// Documents returned for one page request, in server order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub docs: Vec<Document>,
    /// Present when the request was cursor-positioned.
    pub next_cursor_mark: Option<CursorMark>,
}

impl Page {
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

/// Answer to a zero-row probe request.
///
/// `num_found` is optional because it comes straight off the wire; the pager
/// decides what a missing count means.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProbeResult {
    pub num_found: Option<u64>,
}
