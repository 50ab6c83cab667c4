//! In-memory record store.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;

use super::{upsert, PersistenceError, SolveRecord, SolveRecorder};

/// Shared in-memory store. Clones see the same records.
#[derive(Clone, Debug, Default)]
pub struct MemoryRecords {
    records: Arc<Mutex<BTreeMap<usize, SolveRecord>>>,
}

impl MemoryRecords {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record for `map_id`, if it was ever solved.
    pub fn get(&self, map_id: usize) -> Option<SolveRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&map_id)
            .cloned()
    }

    /// All records ordered by map id.
    pub fn all(&self) -> Vec<SolveRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }
}

impl SolveRecorder for MemoryRecords {
    fn record_solve(&mut self, map_id: usize, steps: u32) -> Result<SolveRecord, PersistenceError> {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(upsert(&mut records, map_id, steps, Utc::now()))
    }
}
