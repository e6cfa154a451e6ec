use crate::{
    error::ImportError,
    report::{Operation, TransferReport},
    transform::{
        pipeline::{TransformPipeline, TransformPipelineExt},
        pruner::{FieldPruner, VersionStripper},
    },
};
use chrono::Utc;
use connectors::search::IndexWriter;
use engine_core::progress::{DEFAULT_PROGRESS_INTERVAL, ProgressTracker};
use model::{core::document::Document, records::batch::Batch};
use tracing::{debug, info, warn};

pub const DEFAULT_BATCH_SIZE: usize = 500;

#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Documents per add request; every full batch is committed.
    pub batch_size: usize,
    /// Drop the `_version_` system field before indexing.
    pub strip_version: bool,
    /// Field allowlist. `None` indexes every field.
    pub fields: Option<Vec<String>>,
    pub progress_interval: u64,
}

impl Default for ImportOptions {
    fn default() -> Self {
        ImportOptions {
            batch_size: DEFAULT_BATCH_SIZE,
            strip_version: true,
            fields: None,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

/// Feeds a stream of documents into an index in committed batches.
pub struct BulkImporter {
    options: ImportOptions,
    pipeline: TransformPipeline,
}

impl BulkImporter {
    pub fn new(options: ImportOptions) -> Self {
        let pipeline = TransformPipeline::new()
            .add_if(options.strip_version, || VersionStripper)
            .add_if(options.fields.is_some(), || {
                FieldPruner::new(options.fields.clone().unwrap_or_default())
            });

        BulkImporter { options, pipeline }
    }

    /// Imports an NDJSON file (or any stream of parsed documents).
    pub fn import<I, E, W>(&self, docs: I, writer: &W) -> Result<TransferReport, ImportError>
    where
        I: IntoIterator<Item = Result<Document, E>>,
        E: Into<ImportError>,
        W: IndexWriter + ?Sized,
    {
        self.run(Operation::Import, docs, writer)
    }

    /// Same as [`BulkImporter::import`], labelled as an index-to-index copy.
    pub fn copy<I, E, W>(&self, docs: I, writer: &W) -> Result<TransferReport, ImportError>
    where
        I: IntoIterator<Item = Result<Document, E>>,
        E: Into<ImportError>,
        W: IndexWriter + ?Sized,
    {
        self.run(Operation::Copy, docs, writer)
    }

    fn run<I, E, W>(
        &self,
        operation: Operation,
        docs: I,
        writer: &W,
    ) -> Result<TransferReport, ImportError>
    where
        I: IntoIterator<Item = Result<Document, E>>,
        E: Into<ImportError>,
        W: IndexWriter + ?Sized,
    {
        if self.options.batch_size == 0 {
            return Err(ImportError::InvalidBatchSize);
        }

        let mut report = TransferReport::new(operation, Utc::now());
        let mut progress =
            ProgressTracker::new("Indexed").with_interval(self.options.progress_interval);
        let mut batch = Batch::new(1, self.options.batch_size);

        for doc in docs {
            let doc = self.pipeline.apply(doc.map_err(Into::<ImportError>::into)?);
            if doc.is_empty() {
                warn!(
                    position = progress.count() + report.skipped + 1,
                    "Skipping document with no fields left after pruning"
                );
                report.skipped += 1;
                continue;
            }

            batch.push(doc);
            progress.record();

            if batch.len() >= self.options.batch_size {
                self.flush(batch.take(), writer, &mut report)?;
            }
        }

        // Always close with a commit, even if nothing is left to add.
        self.flush(batch.take(), writer, &mut report)?;
        progress.finish();

        report.documents = progress.count();
        info!(
            docs = report.documents,
            commits = report.commits,
            skipped = report.skipped,
            "Import finished"
        );
        Ok(report.finished())
    }

    fn flush<W>(
        &self,
        batch: Batch,
        writer: &W,
        report: &mut TransferReport,
    ) -> Result<(), ImportError>
    where
        W: IndexWriter + ?Sized,
    {
        debug!(batch = batch.seq, docs = batch.len(), "Committing batch");
        writer
            .add(&batch.docs, true)
            .map_err(|source| ImportError::Write {
                batch: batch.seq,
                source,
            })?;
        report.commits += 1;
        Ok(())
    }
}
