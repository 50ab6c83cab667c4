//! Solve Records
//!
//! Best-effort store of per-map results. A record is upserted every time
//! a map is solved; it keeps the lowest step count seen. Recording the same
//! solve twice leaves the record unchanged.

pub mod memory;
pub mod json_file;

use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};

pub use memory::MemoryRecords;
pub use json_file::JsonFileRecords;

/// Persistence errors.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// Store could not be read or written.
    #[error("Record store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Store contents are not valid JSON.
    #[error("Record store is corrupt: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result for one map.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveRecord {
    /// Catalogue index.
    pub map_id: usize,
    /// Fewest steps in any solve.
    pub best_steps: u32,
    /// Time the map was first solved.
    pub first_solved_at: DateTime<Utc>,
}

impl SolveRecord {
    /// Record for a first solve.
    pub fn first(map_id: usize, steps: u32, at: DateTime<Utc>) -> Self {
        Self {
            map_id,
            best_steps: steps,
            first_solved_at: at,
        }
    }

    /// Fold in another solve.
    pub fn update(&mut self, steps: u32) {
        self.best_steps = self.best_steps.min(steps);
    }
}

/// Persistence collaborator for solved maps.
pub trait SolveRecorder: Send {
    /// Upsert the result of a solve keyed by map id. Returns the stored record.
    fn record_solve(&mut self, map_id: usize, steps: u32) -> Result<SolveRecord, PersistenceError>;
}

/// Insert or fold a solve into `records`.
pub(crate) fn upsert(
    records: &mut std::collections::BTreeMap<usize, SolveRecord>,
    map_id: usize,
    steps: u32,
    at: DateTime<Utc>,
) -> SolveRecord {
    records
        .entry(map_id)
        .and_modify(|record| record.update(steps))
        .or_insert_with(|| SolveRecord::first(map_id, steps, at))
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::BTreeMap;

    #[test]
    fn test_upsert_keeps_best() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap();
        let mut records = BTreeMap::new();

        let first = upsert(&mut records, 3, 9, t0);
        assert_eq!(first, SolveRecord::first(3, 9, t0));

        upsert(&mut records, 3, 4, t1);
        let record = upsert(&mut records, 3, 7, t1);
        assert_eq!(record.best_steps, 4);
        assert_eq!(record.first_solved_at, t0);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap();
        let mut records = BTreeMap::new();

        let once = upsert(&mut records, 1, 5, t0);
        let twice = upsert(&mut records, 1, 5, t1);
        assert_eq!(once, twice);
        assert_eq!(records.get(&1), Some(&once));
    }
}
