//! Ball Actor
//!
//! Grid-aligned ball and the roll algorithm. A roll advances one cell at a
//! time in a fixed direction until the maze blocks it. Goals are consumed
//! on entry and never stop the ball.
//!
//! The roll is exposed both atomically ([`Ball::roll`]) and as
//! [`Ball::start`] + [`Ball::step`] for hosts that animate one cell per
//! frame. Both paths run the same step function.

use crate::core::grid::{CellCoord, Direction};
use crate::game::events::GameEvent;
use crate::game::maze::Maze;

/// Result of advancing an in-flight roll by one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RollStep {
    /// No roll in flight.
    Idle,
    /// Ball entered `to`.
    Moved {
        /// New cell.
        to: CellCoord,
        /// Whether a goal was consumed in `to`.
        goal_consumed: bool,
    },
    /// Ball could not leave its cell; the roll is over.
    Blocked {
        /// Cell the ball stopped in.
        at: CellCoord,
    },
}

/// The rolling ball.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ball {
    position: CellCoord,
    rolling: bool,
    direction: Direction,
    /// Position when the current roll started.
    origin: CellCoord,
}

impl Ball {
    /// Create an idle ball at `spawn`.
    pub fn new(spawn: CellCoord) -> Self {
        Self {
            position: spawn,
            rolling: false,
            direction: Direction::None,
            origin: spawn,
        }
    }

    /// Put the ball back at `spawn`, idle.
    pub fn reset(&mut self, spawn: CellCoord) {
        *self = Self::new(spawn);
    }

    /// Current cell.
    #[inline]
    pub fn position(&self) -> CellCoord {
        self.position
    }

    /// Move the ball without rolling (restore).
    pub fn set_position(&mut self, cell: CellCoord) {
        self.position = cell;
        self.origin = cell;
    }

    /// True while a roll has not reached its stopping cell.
    #[inline]
    pub fn is_rolling(&self) -> bool {
        self.rolling
    }

    /// Heading of the in-flight roll, `None` when idle.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Check if the current or last roll moved the ball.
    pub fn moved(&self) -> bool {
        self.position != self.origin
    }

    /// Begin a roll. Returns false for `Direction::None` or while
    /// another roll is in flight.
    pub fn start(&mut self, direction: Direction) -> bool {
        if !direction.is_some() || self.rolling {
            return false;
        }
        self.rolling = true;
        self.direction = direction;
        self.origin = self.position;
        true
    }

    /// Halt an in-flight roll where the ball currently is.
    pub fn stop(&mut self) {
        self.rolling = false;
        self.direction = Direction::None;
    }

    /// Advance the in-flight roll by one cell, pushing outcome events.
    pub fn step(&mut self, maze: &mut Maze, events: &mut Vec<GameEvent>) -> RollStep {
        if !self.rolling {
            return RollStep::Idle;
        }

        let direction = self.direction;
        let next = match self.position.step(direction, maze.size_x(), maze.size_y()) {
            Some(next) if !maze.wall_between(self.position, next) => next,
            _ => {
                #[cfg(feature = "debug-tracing")]
                tracing::trace!(cell = %self.position, ?direction, "roll blocked");

                let at = self.position;
                self.stop();
                events.push(GameEvent::ReachedWall { cell: at, direction });
                return RollStep::Blocked { at };
            }
        };

        self.position = next;

        #[cfg(feature = "debug-tracing")]
        tracing::trace!(cell = %next, ?direction, "roll advanced");

        let goal_consumed = maze.consume_goal(next);
        if goal_consumed {
            events.push(GameEvent::ReachedGoal {
                cell: next,
                goals_remaining: maze.goal_count(),
            });
        }

        RollStep::Moved { to: next, goal_consumed }
    }

    /// Roll to completion in one call.
    ///
    /// Returns true iff the ball ends in a different cell. A roll already in
    /// flight makes this a no-op returning false.
    pub fn roll(&mut self, direction: Direction, maze: &mut Maze, events: &mut Vec<GameEvent>) -> bool {
        if !self.start(direction) {
            return false;
        }
        // Each step moves strictly one way, so this ends within the grid size.
        while let RollStep::Moved { .. } = self.step(maze, events) {}
        self.moved()
    }
}

// =============================================================================
// TESTS
// =============================================================================
