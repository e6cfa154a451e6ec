use chrono::{DateTime, Utc};
use engine_core::paging::PagingMode;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Export,
    Import,
    Copy,
}

/// Outcome of one export, import or copy run.
#[derive(Debug, Clone, Serialize)]
pub struct TransferReport {
    pub operation: Operation,
    /// Paging mode that produced the documents; absent for file imports.
    pub mode: Option<PagingMode>,
    /// True when cursor paging was rejected and the scan was redone with offsets.
    pub fell_back_to_offset: bool,
    /// Probe-time hit count; absent for file imports.
    pub total_hits: Option<u64>,
    pub documents: u64,
    /// Input documents dropped because nothing was left after pruning.
    pub skipped: u64,
    pub pages: u64,
    pub commits: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl TransferReport {
    pub fn new(operation: Operation, started_at: DateTime<Utc>) -> Self {
        TransferReport {
            operation,
            mode: None,
            fell_back_to_offset: false,
            total_hits: None,
            documents: 0,
            skipped: 0,
            pages: 0,
            commits: 0,
            started_at,
            finished_at: started_at,
        }
    }

    pub fn finished(mut self) -> Self {
        self.finished_at = Utc::now();
        self
    }

    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}
