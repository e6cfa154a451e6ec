use crate::{
    error::ExportError,
    report::{Operation, TransferReport},
};
use chrono::Utc;
use connectors::{file::jsonl::JsonlWriter, search::SearchClient};
use engine_core::{
    iterator::IterationHandle,
    paging::PagingMode,
    progress::{DEFAULT_PROGRESS_INTERVAL, ProgressTracker},
};
use model::search::query::Query;
use std::io::Write;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub mode: PagingMode,
    /// Redo the scan with offset paging if the server rejects cursor paging
    /// before anything has been written.
    pub fallback_to_offset: bool,
    pub progress_interval: u64,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions {
            mode: PagingMode::Cursor,
            fallback_to_offset: false,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

/// Streams every document matching a query into an NDJSON writer.
pub struct BulkExporter {
    options: ExportOptions,
}

impl BulkExporter {
    pub fn new(options: ExportOptions) -> Self {
        BulkExporter { options }
    }

    pub fn export<C, W>(
        &self,
        client: &C,
        query: &Query,
        writer: &mut JsonlWriter<W>,
    ) -> Result<TransferReport, ExportError>
    where
        C: SearchClient,
        W: Write,
    {
        let mut report = TransferReport::new(Operation::Export, Utc::now());
        let written_before = writer.written();

        let result = match self.scan(client, query, self.options.mode, writer, &mut report) {
            Err(err)
                if err.is_invalid_paging_config()
                    && self.options.fallback_to_offset
                    && self.options.mode == PagingMode::Cursor
                    && writer.written() == written_before =>
            {
                warn!(error = %err, "Cursor paging rejected; restarting export with offset paging");
                report.fell_back_to_offset = true;
                self.scan(client, query, PagingMode::Offset, writer, &mut report)
            }
            other => other,
        };
        result?;

        Ok(report.finished())
    }

    fn scan<C, W>(
        &self,
        client: &C,
        query: &Query,
        mode: PagingMode,
        writer: &mut JsonlWriter<W>,
        report: &mut TransferReport,
    ) -> Result<(), ExportError>
    where
        C: SearchClient,
        W: Write,
    {
        let mut handle = IterationHandle::start(client, query.clone(), mode)?;
        report.mode = Some(mode);
        report.total_hits = Some(handle.total_hits());

        let mut progress = ProgressTracker::new("Wrote").with_interval(self.options.progress_interval);
        while let Some(doc) = handle.next_document()? {
            writer.write(&doc)?;
            progress.record();
        }
        progress.finish();

        report.documents = progress.count();
        report.pages = handle.pages_fetched();
        info!(mode = %mode, pages = report.pages, "Export finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use connectors::error::ClientError;
    use model::{
        core::document::Document,
        pagination::{
            cursor::CursorMark,
            page::{Page, PagePosition, PageRequest, ProbeResult},
        },
    };
    use serde_json::json;
    use std::cell::RefCell;
    use tracing_test::traced_test;

    /// Five documents; refuses cursor requests when `reject_cursor` is set.
    struct FixedIndex {
        reject_cursor: bool,
        requests: RefCell<Vec<PageRequest>>,
    }

    impl FixedIndex {
        fn new(reject_cursor: bool) -> Self {
            FixedIndex {
                reject_cursor,
                requests: RefCell::new(Vec::new()),
            }
        }

        fn docs() -> Vec<Document> {
            (0..5).map(|n| [("id", json!(n))].into_iter().collect()).collect()
        }
    }

    impl SearchClient for FixedIndex {
        fn probe(&self, _query: &Query) -> Result<ProbeResult, ClientError> {
            Ok(ProbeResult { num_found: Some(5) })
        }

        fn fetch(&self, _query: &Query, request: &PageRequest) -> Result<Page, ClientError> {
            self.requests.borrow_mut().push(request.clone());
            let docs = Self::docs();
            match &request.position {
                PagePosition::Cursor(_) if self.reject_cursor => Err(ClientError::InvalidPaging(
                    "Cursor functionality requires a sort containing a uniqueKey field tie breaker"
                        .into(),
                )),
                PagePosition::Cursor(mark) if mark.is_start() => Ok(Page {
                    docs,
                    next_cursor_mark: Some(CursorMark::new("end")),
                }),
                PagePosition::Cursor(mark) => Ok(Page {
                    docs: Vec::new(),
                    next_cursor_mark: Some(mark.clone()),
                }),
                PagePosition::Offset(start) => Ok(Page {
                    docs: docs
                        .into_iter()
                        .skip(*start as usize)
                        .take(request.rows)
                        .collect(),
                    next_cursor_mark: None,
                }),
            }
        }
    }

    fn query() -> Query {
        Query::match_all(2).with_sort("id desc")
    }

    fn lines(writer: JsonlWriter<Vec<u8>>) -> Vec<String> {
        let out = String::from_utf8(writer.finish().unwrap()).unwrap();
        out.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_exports_one_line_per_document() {
        let index = FixedIndex::new(false);
        let mut writer = JsonlWriter::new(Vec::new());

        let report = BulkExporter::new(ExportOptions::default())
            .export(&index, &query(), &mut writer)
            .unwrap();

        assert_eq!(report.documents, 5);
        assert_eq!(report.total_hits, Some(5));
        assert_eq!(report.mode, Some(PagingMode::Cursor));
        assert!(!report.fell_back_to_offset);
        assert_eq!(lines(writer)[4], r#"{"id":4}"#);
    }

    #[test]
    fn test_rejected_cursor_fails_without_fallback() {
        let index = FixedIndex::new(true);
        let mut writer = JsonlWriter::new(Vec::new());

        let err = BulkExporter::new(ExportOptions::default())
            .export(&index, &query(), &mut writer)
            .unwrap_err();

        assert!(err.is_invalid_paging_config());
        assert_eq!(writer.written(), 0);
    }

    #[traced_test]
    #[test]
    fn test_rejected_cursor_falls_back_to_offset() {
        let index = FixedIndex::new(true);
        let mut writer = JsonlWriter::new(Vec::new());
        let options = ExportOptions {
            fallback_to_offset: true,
            ..ExportOptions::default()
        };

        let report = BulkExporter::new(options)
            .export(&index, &query(), &mut writer)
            .unwrap();

        assert!(report.fell_back_to_offset);
        assert_eq!(report.mode, Some(PagingMode::Offset));
        assert_eq!(report.documents, 5);
        assert_eq!(report.pages, 3);
        assert_eq!(lines(writer).len(), 5);
        // One rejected cursor request, then three offset pages.
        assert_eq!(index.requests.borrow().len(), 4);
        assert!(logs_contain("restarting export with offset paging"));
    }

    #[test]
    fn test_offset_mode_needs_no_sort() {
        let index = FixedIndex::new(true);
        let mut writer = JsonlWriter::new(Vec::new());
        let options = ExportOptions {
            mode: PagingMode::Offset,
            ..ExportOptions::default()
        };

        let report = BulkExporter::new(options)
            .export(&index, &Query::match_all(5), &mut writer)
            .unwrap();
        assert_eq!(report.documents, 5);
        assert_eq!(report.pages, 1);
    }
}
