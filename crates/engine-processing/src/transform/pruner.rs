use super::pipeline::Transform;
use model::core::document::{Document, VERSION_FIELD};
use std::collections::HashSet;

/// Removes the index's `_version_` stamp so re-indexing does not trip
/// optimistic-concurrency checks on the destination.
pub struct VersionStripper;

impl Transform for VersionStripper {
    fn apply(&self, mut doc: Document) -> Document {
        doc.remove(VERSION_FIELD);
        doc
    }
}

/// Keeps only the allowlisted fields. Listed fields a document lacks are ignored.
pub struct FieldPruner {
    keep: HashSet<String>,
}

impl FieldPruner {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keep: fields.into_iter().map(Into::into).collect(),
        }
    }
}

impl Transform for FieldPruner {
    fn apply(&self, mut doc: Document) -> Document {
        doc.retain(|name| self.keep.contains(name));
        doc
    }
}
