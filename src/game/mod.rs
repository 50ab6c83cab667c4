//! Game Logic Module
//!
//! All simulation code. Synchronous and deterministic: the same design,
//! snapshot and command sequence always produce the same state.
//!
//! ## Module Structure
//!
//! - `design`: Map designs, ASCII layout parser, catalogue
//! - `maze`: Wall topology and goal grid of the active map
//! - `ball`: Ball actor and the roll algorithm
//! - `input`: Tilt sample to commanded direction
//! - `events`: Simulation outcomes
//! - `engine`: Session controller state machine
//! - `snapshot`: Save/restore record and codecs

pub mod design;
pub mod maze;
pub mod ball;
pub mod input;
pub mod events;
pub mod engine;
pub mod snapshot;

// Re-export key types
pub use design::{AsciiDesign, DesignError, MapCatalogue, MapDesign};
pub use maze::Maze;
pub use ball::{Ball, RollStep};
pub use input::{direction_from_tilt, TiltSample, DEFAULT_TILT_THRESHOLD};
pub use events::GameEvent;
pub use engine::{GameEngine, SessionPhase};
pub use snapshot::{SnapshotError, StateSnapshot};
