use crate::core::document::Document;

/// Documents buffered for one write/commit round trip.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    /// 1-based sequence number within a run.
    pub seq: u64,
    pub docs: Vec<Document>,
}

impl Batch {
    pub fn new(seq: u64, capacity: usize) -> Self {
        Batch {
            seq,
            docs: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, doc: Document) {
        self.docs.push(doc);
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Takes the buffered documents and opens the next batch in sequence.
    pub fn take(&mut self) -> Batch {
        let capacity = self.docs.capacity();
        let next = Batch::new(self.seq + 1, capacity);
        std::mem::replace(self, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_advances_sequence() {
        let mut batch = Batch::new(1, 4);
        batch.push(Document::new());
        batch.push(Document::new());

        let full = batch.take();
        assert_eq!(full.seq, 1);
        assert_eq!(full.len(), 2);
        assert_eq!(batch.seq, 2);
        assert!(batch.is_empty());
    }
}
