//! State Snapshots
//!
//! Save/restore record for suspending a session. Every field is optional
//! so a partially written record can be represented; restore validates
//! one field group at a time.
//!
//! JSON keys follow the bundle layout (`map.id`, `map.goals`, ...). The
//! goal grid is column-major, index `x * size_y + y`.

use serde::{Serialize, Deserialize};

use crate::core::grid::CellCoord;
use crate::core::hash::{compute_state_hash, StateHash};

/// Snapshot errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    /// A required key is absent.
    #[error("Snapshot is missing '{0}'")]
    MissingField(&'static str),

    /// Map id is not in the catalogue.
    #[error("Snapshot map id {map_id} is out of range ({map_count} maps)")]
    InvalidMapId {
        /// Stored id.
        map_id: usize,
        /// Catalogue size.
        map_count: usize,
    },

    /// Goal grid does not match the map dimensions.
    #[error("Snapshot goal grid has {actual} cells, map has {expected}")]
    GoalGridLength {
        /// Cells on the loaded map.
        expected: usize,
        /// Cells in the snapshot.
        actual: usize,
    },

    /// Ball position lies outside the grid.
    #[error("Snapshot ball position {cell} is outside the {size_x}x{size_y} grid")]
    BallOutOfBounds {
        /// Stored position.
        cell: CellCoord,
        /// Grid width.
        size_x: u32,
        /// Grid height.
        size_y: u32,
    },

    /// Encoding failed.
    #[error("Snapshot encoding failed: {0}")]
    Encode(String),

    /// Decoding failed.
    #[error("Snapshot decoding failed: {0}")]
    Decode(String),
}

/// Captured session state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Catalogue index of the active map.
    #[serde(rename = "map.id", default)]
    pub map_id: Option<usize>,

    /// Goal grid, column-major.
    #[serde(rename = "map.goals", default)]
    pub goals: Option<Vec<u32>>,

    /// Step counter.
    #[serde(rename = "stepcount", default)]
    pub step_count: Option<u32>,

    /// Ball column.
    #[serde(rename = "ball.x", default)]
    pub ball_x: Option<u32>,

    /// Ball row.
    #[serde(rename = "ball.y", default)]
    pub ball_y: Option<u32>,

    /// Sensor gate.
    #[serde(rename = "sensorenabled", default)]
    pub sensor_enabled: Option<bool>,
}

impl StateSnapshot {
    /// Build a complete snapshot.
    pub fn new(
        map_id: usize,
        goals: Vec<u32>,
        step_count: u32,
        ball: CellCoord,
        sensor_enabled: bool,
    ) -> Self {
        Self {
            map_id: Some(map_id),
            goals: Some(goals),
            step_count: Some(step_count),
            ball_x: Some(ball.x),
            ball_y: Some(ball.y),
            sensor_enabled: Some(sensor_enabled),
        }
    }

    /// Check if every field is present.
    pub fn is_complete(&self) -> bool {
        self.map_id.is_some()
            && self.goals.is_some()
            && self.step_count.is_some()
            && self.ball_x.is_some()
            && self.ball_y.is_some()
            && self.sensor_enabled.is_some()
    }

    /// Ball cell, if both coordinates are present.
    pub fn ball(&self) -> Option<CellCoord> {
        Some(CellCoord::new(self.ball_x?, self.ball_y?))
    }

    /// Hash of the captured state.
    ///
    /// Equals [`GameEngine::compute_hash`](crate::game::engine::GameEngine::compute_hash)
    /// of the session it was captured from. Missing fields hash as zero values.
    pub fn state_hash(&self) -> StateHash {
        session_hash(
            self.map_id.unwrap_or(0),
            self.step_count.unwrap_or(0),
            self.goals.as_deref().unwrap_or(&[]),
            self.ball().unwrap_or_default(),
            self.sensor_enabled.unwrap_or(false),
        )
    }

    /// Serialize to bundle-style JSON.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string(self).map_err(|e| SnapshotError::Encode(e.to_string()))
    }

    /// Parse bundle-style JSON. Absent keys become `None`.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        serde_json::from_str(json).map_err(|e| SnapshotError::Decode(e.to_string()))
    }

    /// Serialize to bytes using bincode.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        bincode::serialize(self).map_err(|e| SnapshotError::Encode(e.to_string()))
    }

    /// Deserialize from bincode bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self, SnapshotError> {
        bincode::deserialize(data).map_err(|e| SnapshotError::Decode(e.to_string()))
    }
}

/// Hash of the restorable session fields.
pub(crate) fn session_hash(
    map_id: usize,
    step_count: u32,
    goals: &[u32],
    ball: CellCoord,
    sensor_enabled: bool,
) -> StateHash {
    compute_state_hash(map_id, step_count, |hasher| {
        hasher.update_u32_slice(goals);
        hasher.update_cell(ball);
        hasher.update_bool(sensor_enabled);
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StateSnapshot {
        StateSnapshot::new(2, vec![0, 1, 0, 0, 1, 0], 7, CellCoord::new(1, 0), false)
    }

    #[test]
    fn test_json_uses_bundle_keys() {
        let json = sample().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["map.id"], 2);
        assert_eq!(value["map.goals"], serde_json::json!([0, 1, 0, 0, 1, 0]));
        assert_eq!(value["stepcount"], 7);
        assert_eq!(value["ball.x"], 1);
        assert_eq!(value["ball.y"], 0);
        assert_eq!(value["sensorenabled"], false);
    }

    #[test]
    fn test_json_missing_keys() {
        let snapshot = StateSnapshot::from_json(r#"{"map.id": 1, "stepcount": 3}"#).unwrap();
        assert_eq!(snapshot.map_id, Some(1));
        assert_eq!(snapshot.step_count, Some(3));
        assert_eq!(snapshot.goals, None);
        assert_eq!(snapshot.ball(), None);
        assert!(!snapshot.is_complete());
    }

    #[test]
    fn test_json_round_trip() {
        let snapshot = sample();
        let decoded = StateSnapshot::from_json(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(decoded, snapshot);
        assert!(decoded.is_complete());
    }

    #[test]
    fn test_bincode_round_trip() {
        let snapshot = sample();
        let bytes = snapshot.to_bytes().unwrap();
        assert_eq!(StateSnapshot::from_bytes(&bytes).unwrap(), snapshot);
    }

    #[test]
    fn test_malformed_input() {
        assert!(matches!(
            StateSnapshot::from_json("{\"map.id\": \"two\"}"),
            Err(SnapshotError::Decode(_))
        ));
        assert!(matches!(
            StateSnapshot::from_bytes(&[0xff]),
            Err(SnapshotError::Decode(_))
        ));
    }

    #[test]
    fn test_state_hash_changes_with_fields() {
        let base = sample();
        let mut moved = base.clone();
        moved.ball_x = Some(2);
        let mut toggled = base.clone();
        toggled.sensor_enabled = Some(true);

        assert_eq!(base.state_hash(), sample().state_hash());
        assert_ne!(base.state_hash(), moved.state_hash());
        assert_ne!(base.state_hash(), toggled.state_hash());
    }
}
