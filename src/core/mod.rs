//! Core deterministic primitives.
//!
//! Grid geometry and state hashing shared by the simulation and the
//! session runtime.

pub mod grid;
pub mod hash;

// Re-export core types
pub use grid::{CellCoord, Direction};
pub use hash::{compute_state_hash, StateHash, StateHasher};
