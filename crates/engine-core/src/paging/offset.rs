use crate::{
    error::PagingError,
    paging::{PageStrategy, PagingMode},
};
use model::pagination::{
    page::{Page, PagePosition},
    state::{OffsetState, PagingState},
};

/// Numeric `start` paging.
///
/// Bounded by the probe-time hit count: stops once `page_index * rows` reaches it.
/// Each page costs more than the last on typical search-engine internals.
pub struct OffsetPaging {
    state: OffsetState,
    rows: usize,
}

impl OffsetPaging {
    pub fn new(total_hits: u64, rows: usize) -> Self {
        OffsetPaging {
            state: OffsetState::new(total_hits),
            rows,
        }
    }
}

impl PageStrategy for OffsetPaging {
    fn mode(&self) -> PagingMode {
        PagingMode::Offset
    }

    fn next_position(&self) -> Option<PagePosition> {
        if self.state.is_complete(self.rows) {
            None
        } else {
            Some(PagePosition::Offset(self.state.next_start(self.rows)))
        }
    }

    fn advance(&mut self, _page: &Page) -> Result<(), PagingError> {
        self.state.page_index += 1;
        Ok(())
    }

    fn state(&self) -> PagingState {
        PagingState::Offset(self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walks_offsets_until_hits_exhausted() {
        let mut paging = OffsetPaging::new(7, 3);
        let mut starts = Vec::new();

        while let Some(position) = paging.next_position() {
            starts.push(position);
            paging.advance(&Page::default()).unwrap();
        }

        assert_eq!(
            starts,
            vec![
                PagePosition::Offset(0),
                PagePosition::Offset(3),
                PagePosition::Offset(6)
            ]
        );
    }

    #[test]
    fn test_exact_multiple_has_no_trailing_page() {
        let mut paging = OffsetPaging::new(6, 3);
        paging.advance(&Page::default()).unwrap();
        paging.advance(&Page::default()).unwrap();
        assert_eq!(paging.next_position(), None);
    }
}
