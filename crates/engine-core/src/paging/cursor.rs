use crate::{
    error::PagingError,
    paging::{PageStrategy, PagingMode},
};
use model::pagination::{
    page::{Page, PagePosition},
    state::{CursorState, PagingState},
};

/// Cursor-mark paging.
///
/// The scan is over when the server hands back the same mark it was sent.
/// Row counts are never consulted, so documents added or removed mid-scan
/// cannot make it stop early or spin.
pub struct CursorPaging {
    state: CursorState,
}

impl CursorPaging {
    pub fn new(total_hits: u64) -> Self {
        CursorPaging {
            state: CursorState::new(total_hits),
        }
    }
}

impl PageStrategy for CursorPaging {
    fn mode(&self) -> PagingMode {
        PagingMode::Cursor
    }

    fn next_position(&self) -> Option<PagePosition> {
        if self.state.is_complete() {
            None
        } else {
            Some(PagePosition::Cursor(self.state.current.clone()))
        }
    }

    fn advance(&mut self, page: &Page) -> Result<(), PagingError> {
        let next = page.next_cursor_mark.clone().ok_or_else(|| {
            PagingError::Protocol("cursor page is missing nextCursorMark".to_string())
        })?;

        let sent = std::mem::replace(&mut self.state.current, next);
        self.state.previous = Some(sent);
        self.state.rows_fetched_this_page = page.len();
        Ok(())
    }

    fn state(&self) -> PagingState {
        PagingState::Cursor(self.state.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::pagination::cursor::CursorMark;

    fn page(mark: Option<&str>) -> Page {
        Page {
            docs: Vec::new(),
            next_cursor_mark: mark.map(CursorMark::new),
        }
    }

    #[test]
    fn test_first_request_uses_start_mark() {
        let paging = CursorPaging::new(3);
        assert_eq!(
            paging.next_position(),
            Some(PagePosition::Cursor(CursorMark::start()))
        );
    }

    #[test]
    fn test_stops_when_mark_repeats() {
        let mut paging = CursorPaging::new(3);
        paging.advance(&page(Some("A"))).unwrap();
        assert_eq!(
            paging.next_position(),
            Some(PagePosition::Cursor(CursorMark::new("A")))
        );

        paging.advance(&page(Some("A"))).unwrap();
        assert_eq!(paging.next_position(), None);
    }

    #[test]
    fn test_missing_mark_is_protocol_error_and_keeps_state() {
        let mut paging = CursorPaging::new(3);
        paging.advance(&page(Some("A"))).unwrap();
        let before = paging.state();

        let err = paging.advance(&page(None)).unwrap_err();
        assert!(matches!(err, PagingError::Protocol(_)));
        assert_eq!(paging.state(), before);
    }
}
