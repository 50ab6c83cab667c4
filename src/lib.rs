//! # Tilt Maze
//!
//! Simulation core for a tilt-controlled rolling ball maze.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         TILT MAZE                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── grid.rs     - Cell coordinates, directions, wall bits   │
//! │  └── hash.rs     - State hashing for snapshot verification   │
//! │                                                              │
//! │  game/           - Simulation (deterministic)                │
//! │  ├── design.rs   - Map designs and catalogue                 │
//! │  ├── maze.rs     - Wall topology and goal grid               │
//! │  ├── ball.rs     - Ball actor and roll algorithm             │
//! │  ├── input.rs    - Tilt to commanded direction               │
//! │  ├── events.rs   - Simulation outcomes                       │
//! │  ├── engine.rs   - Session controller state machine          │
//! │  └── snapshot.rs - Save/restore record                       │
//! │                                                              │
//! │  session/        - Runtime (non-deterministic)               │
//! │  ├── dispatch.rs - FIFO message queue                        │
//! │  ├── ports.rs    - Haptics and display collaborators         │
//! │  ├── runner.rs   - Single consumer loop                      │
//! │  └── sampler.rs  - Tilt producer                             │
//! │                                                              │
//! │  persistence/    - Solve records (memory, JSON file)         │
//! │  config.rs       - Runtime configuration                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Threading
//!
//! Simulation state is owned by the [`SessionRunner`](session::SessionRunner)
//! alone. Producers such as the [`TiltSampler`](session::TiltSampler) only
//! post messages to the queue, so a roll in flight is never interrupted.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod session;
pub mod persistence;
pub mod config;

// Re-export commonly used types
pub use crate::core::grid::{CellCoord, Direction};
pub use game::design::{MapCatalogue, MapDesign};
pub use game::engine::{GameEngine, SessionPhase};
pub use game::snapshot::StateSnapshot;
pub use config::{Config, RollMode};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Haptic pulse when the ball consumes a goal (ms)
pub const GOAL_PULSE_MS: u64 = 100;

/// Haptic pulse when the ball hits a wall (ms)
pub const WALL_PULSE_MS: u64 = 12;
