//! State Hashing for Verification
//!
//! Deterministic hashing of session state, used to check that a
//! snapshot restores to exactly the state it was captured from.

use sha2::{Sha256, Digest};
use super::grid::CellCoord;

/// Hash output type (256 bits / 32 bytes)
pub type StateHash = [u8; 32];

/// Domain separator for session state hashes.
pub const SESSION_STATE_DOMAIN: &[u8] = b"TILT_MAZE_STATE_V1";

/// Domain separator for map design hashes.
pub const MAP_DESIGN_DOMAIN: &[u8] = b"TILT_MAZE_DESIGN_V1";

/// Deterministic hasher for game state.
///
/// Wraps SHA-256. Order of updates is part of the hash.
pub struct StateHasher {
    hasher: Sha256,
}

impl StateHasher {
    /// Create a new hasher with domain separator.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Create hasher for session state.
    pub fn for_session_state() -> Self {
        Self::new(SESSION_STATE_DOMAIN)
    }

    /// Create hasher for a map design.
    pub fn for_map_design() -> Self {
        Self::new(MAP_DESIGN_DOMAIN)
    }

    /// Update with raw bytes.
    #[inline]
    pub fn update_bytes(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    /// Update with a u8 value.
    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.hasher.update([value]);
    }

    /// Update with a u32 value (little-endian).
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a u64 value (little-endian).
    #[inline]
    pub fn update_u64(&mut self, value: u64) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a boolean.
    #[inline]
    pub fn update_bool(&mut self, value: bool) {
        self.update_u8(value as u8);
    }

    /// Update with a cell coordinate.
    #[inline]
    pub fn update_cell(&mut self, cell: CellCoord) {
        self.update_u32(cell.x);
        self.update_u32(cell.y);
    }

    /// Update with a length-prefixed slice of counters.
    pub fn update_u32_slice(&mut self, values: &[u32]) {
        self.update_u64(values.len() as u64);
        for value in values {
            self.update_u32(*value);
        }
    }

    /// Update with a length-prefixed string.
    pub fn update_str(&mut self, value: &str) {
        self.update_u64(value.len() as u64);
        self.hasher.update(value.as_bytes());
    }

    /// Finalize and return the hash.
    pub fn finalize(self) -> StateHash {
        self.hasher.finalize().into()
    }
}

/// Compute the session state hash.
///
/// Map id and step count always go first; `add_state` appends the rest.
pub fn compute_state_hash<F>(map_id: usize, step_count: u32, add_state: F) -> StateHash
where
    F: FnOnce(&mut StateHasher),
{
    let mut hasher = StateHasher::for_session_state();

    hasher.update_u64(map_id as u64);
    hasher.update_u32(step_count);

    add_state(&mut hasher);

    hasher.finalize()
}

// =============================================================================
// TESTS
// =============================================================================
