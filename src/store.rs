use crate::models::{Record, RecordId, RecordsDocument};

/// The session's authoritative record collection, in insertion order.
///
/// Mutations touch only memory. Persisting and re-rendering are up to the caller.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<Record>,
}

impl RecordStore {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn append(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn remove(&mut self, id: &RecordId) -> Option<Record> {
        let index = self.records.iter().position(|record| &record.id == id)?;
        Some(self.records.remove(index))
    }

    pub fn snapshot(&self) -> RecordsDocument {
        RecordsDocument {
            records: self.records.clone(),
        }
    }
}

impl From<RecordsDocument> for RecordStore {
    fn from(document: RecordsDocument) -> Self {
        Self::new(document.records)
    }
}
