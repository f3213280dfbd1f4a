//! Document cache keyed by IRI.
//!
//! Filled while normalizing responses that embed sub-documents and read by
//! `get_many` before falling back to individual fetches. Entries are never
//! evicted and may go stale after mutations; last write wins.

use crate::core::types::Record;
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct DocumentCache {
    entries: Mutex<HashMap<String, Record>>,
}

impl DocumentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a record under its own identifier.
    pub fn put(&self, record: Record) {
        self.entries.lock().insert(record.id().to_string(), record);
    }

    pub fn get(&self, id: &str) -> Option<Record> {
        self.entries.lock().get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.lock().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}
