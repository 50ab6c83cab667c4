//! JSON file record store.
//!
//! The whole store is rewritten on every solve: serialized to a sibling
//! temp file, then renamed over the target.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::debug;

use super::{upsert, PersistenceError, SolveRecord, SolveRecorder};

/// Record store backed by a JSON array on disk.
#[derive(Debug)]
pub struct JsonFileRecords {
    path: PathBuf,
    records: BTreeMap<usize, SolveRecord>,
}

impl JsonFileRecords {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let path = path.into();
        let records = match fs::read_to_string(&path) {
            Ok(contents) => {
                let list: Vec<SolveRecord> = serde_json::from_str(&contents)?;
                list.into_iter().map(|r| (r.map_id, r)).collect()
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!("Loaded {} solve records from {}", records.len(), path.display());
        Ok(Self { path, records })
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record for `map_id`.
    pub fn get(&self, map_id: usize) -> Option<&SolveRecord> {
        self.records.get(&map_id)
    }

    /// Number of maps with a record.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if no map has been solved.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn save(&self) -> Result<(), PersistenceError> {
        let list: Vec<&SolveRecord> = self.records.values().collect();
        let json = serde_json::to_string_pretty(&list)?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl SolveRecorder for JsonFileRecords {
    fn record_solve(&mut self, map_id: usize, steps: u32) -> Result<SolveRecord, PersistenceError> {
        let record = upsert(&mut self.records, map_id, steps, Utc::now());
        self.save()?;
        Ok(record)
    }
}
