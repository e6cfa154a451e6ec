use crate::{
    error::PagingError,
    paging::{PageStrategy, PagingMode, strategy_for},
};
use connectors::search::SearchClient;
use model::{
    core::document::Document,
    pagination::{page::PageRequest, state::PagingState},
    search::query::Query,
};
use std::collections::VecDeque;
use tracing::{debug, info, warn};

/// A restartable scan definition: a client, a query and a paging mode.
///
/// Every call to [`PageIterator::start`] probes the server again and returns
/// a fresh [`IterationHandle`]; nothing carries over from earlier scans.
pub struct PageIterator<C> {
    client: C,
    query: Query,
    mode: PagingMode,
}

impl<C: SearchClient> PageIterator<C> {
    pub fn new(client: C, query: Query, mode: PagingMode) -> Self {
        PageIterator {
            client,
            query,
            mode,
        }
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn mode(&self) -> PagingMode {
        self.mode
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Starts a new scan from the beginning of the result set.
    pub fn start(&self) -> Result<IterationHandle<&C>, PagingError> {
        IterationHandle::start(&self.client, self.query.clone(), self.mode)
    }
}

/// One forward-only pass over a result set.
///
/// Pulls pages lazily: [`IterationHandle::next_document`] serves from the
/// current page buffer and only goes to the server once it runs dry. After
/// the end of the sequence has been reported once, every further call reports
/// it again without touching the server.
pub struct IterationHandle<C> {
    client: C,
    query: Query,
    strategy: Box<dyn PageStrategy>,
    buffer: VecDeque<Document>,
    exhausted: bool,
    total_hits: u64,
    pages_fetched: u64,
    docs_yielded: u64,
}

impl<C: SearchClient> IterationHandle<C> {
    /// Validates the query, probes for the hit count and prepares paging state.
    pub fn start(client: C, query: Query, mode: PagingMode) -> Result<Self, PagingError> {
        query.validate()?;
        if mode == PagingMode::Cursor && query.sort.is_none() {
            return Err(PagingError::InvalidPagingConfig(
                "cursor paging requires a sort that ends on the unique key field".to_string(),
            ));
        }

        let probe = client.probe(&query).map_err(PagingError::from_client)?;
        let total_hits = probe.num_found.ok_or_else(|| {
            PagingError::Protocol("probe response is missing the hit count".to_string())
        })?;
        info!(query = %query.q, mode = %mode, "Found {} docs", total_hits);

        Ok(IterationHandle {
            strategy: strategy_for(mode, total_hits, query.rows),
            client,
            query,
            buffer: VecDeque::new(),
            exhausted: false,
            total_hits,
            pages_fetched: 0,
            docs_yielded: 0,
        })
    }

    /// Returns the next document, or `None` at the end of the sequence.
    ///
    /// A failed fetch leaves the buffer and paging state untouched.
    pub fn next_document(&mut self) -> Result<Option<Document>, PagingError> {
        if let Some(doc) = self.buffer.pop_front() {
            self.docs_yielded += 1;
            return Ok(Some(doc));
        }
        if self.exhausted {
            return Ok(None);
        }

        let Some(position) = self.strategy.next_position() else {
            self.finish();
            return Ok(None);
        };

        let request = PageRequest {
            rows: self.query.rows,
            position,
        };
        debug!(page = self.pages_fetched + 1, request = ?request, "Fetching page");

        let page = self
            .client
            .fetch(&self.query, &request)
            .map_err(PagingError::from_client)?;
        self.strategy.advance(&page)?;
        self.pages_fetched += 1;

        if page.is_empty() {
            if self.docs_yielded < self.total_hits {
                warn!(
                    yielded = self.docs_yielded,
                    total_hits = self.total_hits,
                    "Server returned an empty page before the expected hit count; stopping"
                );
            }
            self.finish();
            return Ok(None);
        }

        self.buffer.extend(page.docs);
        self.next_document()
    }

    fn finish(&mut self) {
        if !self.exhausted {
            self.exhausted = true;
            info!(
                docs = self.docs_yielded,
                pages = self.pages_fetched,
                "Scan complete"
            );
        }
    }

    pub fn mode(&self) -> PagingMode {
        self.strategy.mode()
    }

    pub fn total_hits(&self) -> u64 {
        self.total_hits
    }

    pub fn pages_fetched(&self) -> u64 {
        self.pages_fetched
    }

    pub fn docs_yielded(&self) -> u64 {
        self.docs_yielded
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted && self.buffer.is_empty()
    }

    pub fn state(&self) -> PagingState {
        self.strategy.state()
    }
}

impl<C: SearchClient> Iterator for IterationHandle<C> {
    type Item = Result<Document, PagingError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_document().transpose()
    }
}
