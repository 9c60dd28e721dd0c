use std::collections::HashMap;

use crate::models::CorpusEntry;

/// Display-record lookup by `kural_id`, used to hydrate results.
pub trait RecordStore: Send + Sync {
    fn get(&self, kural_id: i64) -> Option<CorpusEntry>;
}

/// Record store backed by the loaded corpus. Duplicate ids resolve to the
/// last entry.
pub struct CorpusRecordStore {
    records: HashMap<i64, CorpusEntry>,
}

impl CorpusRecordStore {
    pub fn new(entries: &[CorpusEntry]) -> Self {
        let records = entries
            .iter()
            .map(|e| (e.kural_id, e.clone()))
            .collect();
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordStore for CorpusRecordStore {
    fn get(&self, kural_id: i64) -> Option<CorpusEntry> {
        self.records.get(&kural_id).cloned()
    }
}
