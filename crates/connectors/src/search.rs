use crate::error::ClientError;
use model::{
    core::document::Document,
    pagination::page::{Page, PageRequest, ProbeResult},
    search::query::Query,
};

/// Read side of an index: hit counting and positioned page fetches.
///
/// Implementations are synchronous; each call is one blocking round trip.
pub trait SearchClient {
    /// Issues a zero-row request to learn how many documents match.
    fn probe(&self, query: &Query) -> Result<ProbeResult, ClientError>;

    /// Fetches one page of `request.rows` documents at `request.position`.
    fn fetch(&self, query: &Query, request: &PageRequest) -> Result<Page, ClientError>;
}

/// Write side of an index.
pub trait IndexWriter {
    /// Adds (upserts) `docs`, optionally committing once they are accepted.
    ///
    /// An empty `docs` slice with `commit = true` is a plain commit.
    fn add(&self, docs: &[Document], commit: bool) -> Result<(), ClientError>;
}

impl<T: SearchClient + ?Sized> SearchClient for &T {
    fn probe(&self, query: &Query) -> Result<ProbeResult, ClientError> {
        (**self).probe(query)
    }

    fn fetch(&self, query: &Query, request: &PageRequest) -> Result<Page, ClientError> {
        (**self).fetch(query, request)
    }
}

impl<T: IndexWriter + ?Sized> IndexWriter for &T {
    fn add(&self, docs: &[Document], commit: bool) -> Result<(), ClientError> {
        (**self).add(docs, commit)
    }
}
