//! Game Events
//!
//! Outcomes produced by the simulation. The engine queues them; the
//! session runtime drains them and turns them into observable effects.

use serde::{Serialize, Deserialize};
use crate::core::grid::{CellCoord, Direction};

/// Simulation outcome.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A map was (re)loaded; every display needs a refresh.
    MapLoaded {
        /// Catalogue index.
        map_id: usize,
        /// Display name.
        name: String,
        /// Goals on the fresh map.
        goals_remaining: u32,
    },

    /// Step counter changed.
    StepCountChanged {
        /// New value.
        steps: u32,
    },

    /// Remaining goal count changed outside a roll (restore).
    GoalsChanged {
        /// New value.
        goals_remaining: u32,
    },

    /// Ball entered a goal cell and consumed it.
    ReachedGoal {
        /// Goal cell.
        cell: CellCoord,
        /// Goals left after this one.
        goals_remaining: u32,
    },

    /// Ball tried to leave a cell and hit a wall or the boundary.
    ReachedWall {
        /// Cell the ball stopped in.
        cell: CellCoord,
        /// Blocked heading.
        direction: Direction,
    },

    /// Ball moved; the view must be redrawn.
    Invalidate,

    /// Last goal consumed.
    Solved {
        /// Catalogue index.
        map_id: usize,
        /// Step count at the moment of solving.
        steps: u32,
    },
}
