use crate::pagination::cursor::CursorMark;
use serde::Serialize;

/// Bookkeeping for a cursor-mark scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CursorState {
    /// Mark sent with the most recent successful fetch. `None` until the first fetch.
    pub previous: Option<CursorMark>,
    /// Mark to send with the next fetch.
    pub current: CursorMark,
    pub total_hits: u64,
    pub rows_fetched_this_page: usize,
}

impl CursorState {
    pub fn new(total_hits: u64) -> Self {
        CursorState {
            previous: None,
            current: CursorMark::start(),
            total_hits,
            rows_fetched_this_page: 0,
        }
    }

    /// The server handed back the mark it was given: no further pages exist.
    pub fn is_complete(&self) -> bool {
        self.previous.as_ref() == Some(&self.current)
    }
}

/// Bookkeeping for a numeric offset scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OffsetState {
    /// Pages fetched so far; also the index of the next page to fetch.
    pub page_index: u64,
    pub total_hits: u64,
}

impl OffsetState {
    pub fn new(total_hits: u64) -> Self {
        OffsetState {
            page_index: 0,
            total_hits,
        }
    }

    /// Offset of the first document on the next page.
    pub fn next_start(&self, rows: usize) -> u64 {
        self.page_index.saturating_mul(rows as u64)
    }

    pub fn is_complete(&self, rows: usize) -> bool {
        self.next_start(rows) >= self.total_hits
    }
}

/// Snapshot of where a scan stands, whichever strategy drives it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PagingState {
    Cursor(CursorState),
    Offset(OffsetState),
}

impl PagingState {
    pub fn total_hits(&self) -> u64 {
        match self {
            PagingState::Cursor(state) => state.total_hits,
            PagingState::Offset(state) => state.total_hits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_state_is_not_complete_before_first_fetch() {
        let state = CursorState::new(10);
        assert!(!state.is_complete());
        assert!(state.current.is_start());
    }

    #[test]
    fn test_cursor_state_completes_on_repeated_mark() {
        let state = CursorState {
            previous: Some(CursorMark::new("B")),
            current: CursorMark::new("B"),
            total_hits: 10,
            rows_fetched_this_page: 0,
        };
        assert!(state.is_complete());
    }

    #[test]
    fn test_offset_state_boundary() {
        let mut state = OffsetState::new(6);
        assert!(!state.is_complete(3));
        state.page_index = 1;
        assert!(!state.is_complete(3));
        state.page_index = 2;
        assert!(state.is_complete(3));
    }

    #[test]
    fn test_offset_state_with_no_hits_is_complete_immediately() {
        assert!(OffsetState::new(0).is_complete(500));
    }
}
