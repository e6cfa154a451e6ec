#![allow(dead_code)]

use crate::{MemoryIndex, UNIQUE_KEY};
use connectors::file::{error::FileError, jsonl::JsonlReader, jsonl::JsonlWriter};
use engine_processing::{
    error::ExportError,
    exporter::{BulkExporter, ExportOptions},
    report::TransferReport,
};
use model::{core::document::Document, search::query::Query};
use serde_json::Value;
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

/// Default sort used by the scenarios; matches the CLI default.
pub const ID_DESC: &str = "id desc";

pub fn query(rows: usize) -> Query {
    Query::match_all(rows).with_sort(ID_DESC)
}

/// Runs a full export into `path` and returns the report.
pub fn export_to_file(
    index: &MemoryIndex,
    query: &Query,
    options: ExportOptions,
    path: &Path,
) -> Result<TransferReport, ExportError> {
    let mut writer = JsonlWriter::create(&path.to_string_lossy())?;
    let report = BulkExporter::new(options).export(index, query, &mut writer);
    writer.finish()?;
    report
}

pub fn read_export(path: &Path) -> Vec<Document> {
    JsonlReader::open(&path.to_string_lossy())
        .expect("export file should open")
        .collect::<Result<Vec<_>, FileError>>()
        .expect("export file should parse")
}

pub fn file_line_count(path: &Path) -> usize {
    let file = File::open(path).expect("file should open");
    BufReader::new(file).lines().count()
}

/// Unique keys in the order given.
pub fn ids(docs: &[Document]) -> Vec<String> {
    docs.iter()
        .filter_map(|doc| doc.get(UNIQUE_KEY).and_then(Value::as_str))
        .map(str::to_string)
        .collect()
}

/// Unique keys of the index's committed documents, highest first (the `id desc` order).
pub fn ids_desc(index: &MemoryIndex) -> Vec<String> {
    let mut keys = ids(&index.documents());
    keys.reverse();
    keys
}

/// Asserts no key appears twice.
pub fn assert_unique(keys: &[String]) {
    let mut sorted = keys.to_vec();
    sorted.sort();
    sorted.dedup();
    assert_eq!(sorted.len(), keys.len(), "duplicate documents in {keys:?}");
}
