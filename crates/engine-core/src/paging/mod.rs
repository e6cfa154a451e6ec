pub mod cursor;
pub mod offset;

use crate::{
    error::PagingError,
    paging::{cursor::CursorPaging, offset::OffsetPaging},
};
use model::pagination::{
    page::{Page, PagePosition},
    state::PagingState,
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Which paging protocol walks the result set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PagingMode {
    /// Server-issued cursor marks. Constant cost per page; needs a sort on the unique key.
    #[default]
    Cursor,
    /// Numeric `start` offsets. Works for any query; cost grows with depth.
    Offset,
}

impl PagingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PagingMode::Cursor => "cursor",
            PagingMode::Offset => "offset",
        }
    }
}

impl fmt::Display for PagingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PagingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cursor" => Ok(PagingMode::Cursor),
            "offset" => Ok(PagingMode::Offset),
            other => Err(format!("Unknown paging mode: {other}")),
        }
    }
}

/// One paging protocol: decides where the next page starts and when the scan is over.
pub trait PageStrategy: Send {
    fn mode(&self) -> PagingMode;

    /// Position of the next page to fetch, or `None` once the scan is complete.
    fn next_position(&self) -> Option<PagePosition>;

    /// Records a successfully fetched page.
    ///
    /// On error the strategy's state is left exactly as it was.
    fn advance(&mut self, page: &Page) -> Result<(), PagingError>;

    /// Snapshot of the bookkeeping.
    fn state(&self) -> PagingState;
}

/// Builds a fresh strategy for a scan over `total_hits` documents in pages of `rows`.
pub fn strategy_for(mode: PagingMode, total_hits: u64, rows: usize) -> Box<dyn PageStrategy> {
    match mode {
        PagingMode::Cursor => Box::new(CursorPaging::new(total_hits)),
        PagingMode::Offset => Box::new(OffsetPaging::new(total_hits, rows)),
    }
}
