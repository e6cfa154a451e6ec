#![allow(dead_code)]

use connectors::{
    error::ClientError,
    search::{IndexWriter, SearchClient},
};
use model::{
    core::document::{Document, VERSION_FIELD},
    pagination::{
        cursor::CursorMark,
        page::{Page, PagePosition, PageRequest, ProbeResult},
    },
    search::query::{MATCH_ALL, Query},
};
use serde_json::{Value, json};
use std::{
    collections::BTreeMap,
    sync::{
        Mutex,
        atomic::{AtomicU64, AtomicUsize, Ordering},
    },
};
use tracing::debug;

pub mod utils;

/// Unique key of every document in the simulated index.
pub const UNIQUE_KEY: &str = "id";

const CURSOR_SORT_ERROR: &str =
    "Cursor functionality requires a sort containing a uniqueKey field tie breaker";
const MISSING_KEY_ERROR: &str = "Document is missing mandatory uniqueKey field: id";

pub type Store = BTreeMap<String, Document>;
type FetchHook = Box<dyn Fn(usize, &mut Store) + Send>;

/// Sort direction on the unique key, as parsed from a sort clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyOrder {
    Asc,
    Desc,
}

/// In-memory stand-in for a search index.
///
/// Documents are kept by unique key. Cursor marks encode the last key served,
/// so a cursor scan stays consistent while documents come and go. Offset
/// requests are served against the live document set and drift under mutation.
pub struct MemoryIndex {
    store: Mutex<Store>,
    pending: Mutex<Vec<Document>>,
    version: AtomicU64,
    probes: AtomicUsize,
    fetches: AtomicUsize,
    commits: AtomicUsize,
    fetch_log: Mutex<Vec<(PageRequest, usize)>>,
    add_log: Mutex<Vec<(usize, bool)>>,
    before_fetch: Mutex<Option<FetchHook>>,
    fail_fetch: Mutex<Option<usize>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        MemoryIndex {
            store: Mutex::new(BTreeMap::new()),
            pending: Mutex::new(Vec::new()),
            version: AtomicU64::new(1),
            probes: AtomicUsize::new(0),
            fetches: AtomicUsize::new(0),
            commits: AtomicUsize::new(0),
            fetch_log: Mutex::new(Vec::new()),
            add_log: Mutex::new(Vec::new()),
            before_fetch: Mutex::new(None),
            fail_fetch: Mutex::new(None),
        }
    }

    /// An index holding `n` committed documents `doc-0000` .. `doc-{n-1}`.
    pub fn seeded(n: usize) -> Self {
        let index = MemoryIndex::new();
        {
            let mut store = index.store.lock().unwrap();
            for i in 0..n {
                let doc = index.stamp(sample_doc(i));
                store.insert(doc_id(i), doc);
            }
        }
        index
    }

    /// Runs `hook` with the fetch number (1-based) and the live store before each fetch is served.
    pub fn before_fetch(&self, hook: impl Fn(usize, &mut Store) + Send + 'static) {
        *self.before_fetch.lock().unwrap() = Some(Box::new(hook));
    }

    /// Makes the `n`th fetch (1-based) fail with a transport error.
    pub fn fail_fetch(&self, n: usize) {
        *self.fail_fetch.lock().unwrap() = Some(n);
    }

    pub fn len(&self) -> usize {
        self.store.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Committed documents in key order.
    pub fn documents(&self) -> Vec<Document> {
        self.store.lock().unwrap().values().cloned().collect()
    }

    pub fn probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    /// Every fetch served, with the number of documents it returned.
    pub fn fetch_log(&self) -> Vec<(PageRequest, usize)> {
        self.fetch_log.lock().unwrap().clone()
    }

    /// Every add call received, as (document count, commit flag).
    pub fn add_log(&self) -> Vec<(usize, bool)> {
        self.add_log.lock().unwrap().clone()
    }

    fn stamp(&self, mut doc: Document) -> Document {
        let version = self.version.fetch_add(1, Ordering::SeqCst);
        doc.insert(VERSION_FIELD, json!(version));
        doc
    }

    fn matching(store: &Store, query: &Query) -> Vec<Document> {
        store
            .values()
            .filter(|doc| matches_query(doc, &query.q))
            .cloned()
            .collect()
    }

    fn key_order(query: &Query) -> Option<KeyOrder> {
        let sort = query.sort.as_deref()?;
        let last = sort.split(',').next_back()?.trim();
        match last.split_whitespace().collect::<Vec<_>>().as_slice() {
            [field, dir] if *field == UNIQUE_KEY && dir.eq_ignore_ascii_case("asc") => {
                Some(KeyOrder::Asc)
            }
            [field, dir] if *field == UNIQUE_KEY && dir.eq_ignore_ascii_case("desc") => {
                Some(KeyOrder::Desc)
            }
            _ => None,
        }
    }

    fn serve(&self, query: &Query, request: &PageRequest) -> Result<Page, ClientError> {
        let store = self.store.lock().unwrap();
        let mut docs = Self::matching(&store, query);
        let order = Self::key_order(query);
        if order == Some(KeyOrder::Desc) {
            docs.reverse();
        }

        let (page_docs, next_cursor_mark) = match &request.position {
            PagePosition::Offset(start) => {
                let page = docs
                    .into_iter()
                    .skip(*start as usize)
                    .take(request.rows)
                    .collect::<Vec<_>>();
                (page, None)
            }
            PagePosition::Cursor(mark) => {
                let Some(order) = order else {
                    return Err(ClientError::InvalidPaging(CURSOR_SORT_ERROR.into()));
                };
                let after = decode_mark(mark);
                let page = docs
                    .into_iter()
                    .filter(|doc| match (&after, order) {
                        (None, _) => true,
                        (Some(last), KeyOrder::Asc) => key_of(doc) > last.as_str(),
                        (Some(last), KeyOrder::Desc) => key_of(doc) < last.as_str(),
                    })
                    .take(request.rows)
                    .collect::<Vec<_>>();
                let next = match page.last() {
                    Some(doc) => encode_mark(key_of(doc)),
                    None => mark.clone(),
                };
                (page, Some(next))
            }
        };

        Ok(Page {
            docs: page_docs
                .into_iter()
                .map(|doc| project(doc, &query.fields))
                .collect(),
            next_cursor_mark,
        })
    }
}

impl Default for MemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchClient for MemoryIndex {
    fn probe(&self, query: &Query) -> Result<ProbeResult, ClientError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        let store = self.store.lock().unwrap();
        Ok(ProbeResult {
            num_found: Some(Self::matching(&store, query).len() as u64),
        })
    }

    fn fetch(&self, query: &Query, request: &PageRequest) -> Result<Page, ClientError> {
        let n = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(hook) = self.before_fetch.lock().unwrap().as_ref() {
            hook(n, &mut self.store.lock().unwrap());
        }
        if *self.fail_fetch.lock().unwrap() == Some(n) {
            return Err(ClientError::Other(format!("connection reset on fetch {n}")));
        }

        let page = self.serve(query, request)?;
        debug!(fetch = n, docs = page.len(), "Served page");
        self.fetch_log
            .lock()
            .unwrap()
            .push((request.clone(), page.len()));
        Ok(page)
    }
}

impl IndexWriter for MemoryIndex {
    fn add(&self, docs: &[Document], commit: bool) -> Result<(), ClientError> {
        if docs.iter().any(|doc| doc.get(UNIQUE_KEY).is_none()) {
            return Err(ClientError::Other(MISSING_KEY_ERROR.into()));
        }

        self.add_log.lock().unwrap().push((docs.len(), commit));
        self.pending.lock().unwrap().extend_from_slice(docs);

        if commit {
            let pending = std::mem::take(&mut *self.pending.lock().unwrap());
            let mut store = self.store.lock().unwrap();
            for doc in pending {
                let key = key_of(&doc).to_string();
                store.insert(key, self.stamp(doc));
            }
            self.commits.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

pub fn doc_id(i: usize) -> String {
    format!("doc-{i:04}")
}

pub fn sample_doc(i: usize) -> Document {
    [
        (UNIQUE_KEY, json!(doc_id(i))),
        ("title", json!(format!("Article {i}"))),
        ("kind", json!(if i % 2 == 0 { "even" } else { "odd" })),
    ]
    .into_iter()
    .collect()
}

fn key_of(doc: &Document) -> &str {
    doc.get(UNIQUE_KEY).and_then(Value::as_str).unwrap_or_default()
}

fn encode_mark(key: &str) -> CursorMark {
    CursorMark::new(format!("after:{key}"))
}

fn decode_mark(mark: &CursorMark) -> Option<String> {
    mark.as_str().strip_prefix("after:").map(str::to_string)
}

/// Supports `*:*` and single `field:value` equality.
fn matches_query(doc: &Document, q: &str) -> bool {
    if q == MATCH_ALL {
        return true;
    }
    match q.split_once(':') {
        Some((field, expected)) => match doc.get(field) {
            Some(Value::String(s)) => s == expected,
            Some(other) => other.to_string() == expected,
            None => false,
        },
        None => false,
    }
}

fn project(doc: Document, fields: &[String]) -> Document {
    if fields.is_empty() {
        return doc;
    }
    let mut doc = doc;
    doc.retain(|name| fields.iter().any(|f| f == name));
    doc
}
