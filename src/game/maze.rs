//! Grid Maze Model
//!
//! Wall topology plus the mutable goal grid of one loaded map instance.
//! The maze is rebuilt wholesale from a [`MapDesign`] on every load.

use crate::core::grid::{CellCoord, Direction};
use crate::game::design::MapDesign;

/// Live maze for the active map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Maze {
    size_x: u32,
    size_y: u32,
    /// Per-cell wall bits, row-major. Immutable between loads.
    walls: Vec<u8>,
    /// Per-cell goal markers, row-major.
    goals: Vec<u32>,
    /// Cached count of non-zero entries in `goals`.
    goal_count: u32,
    spawn: CellCoord,
}

impl Maze {
    /// Build a maze from a design.
    pub fn new(design: &MapDesign) -> Self {
        let goals = design.goals().to_vec();
        let goal_count = count_goals(&goals);
        Self {
            size_x: design.size_x(),
            size_y: design.size_y(),
            walls: design.walls().to_vec(),
            goals,
            goal_count,
            spawn: design.spawn(),
        }
    }

    /// Rebuild walls and goals from `design`, discarding all goal progress.
    pub fn reset(&mut self, design: &MapDesign) {
        *self = Self::new(design);
    }

    /// Grid width.
    pub fn size_x(&self) -> u32 {
        self.size_x
    }

    /// Grid height.
    pub fn size_y(&self) -> u32 {
        self.size_y
    }

    /// Spawn cell of the design this maze was built from.
    pub fn spawn(&self) -> CellCoord {
        self.spawn
    }

    /// Check if `cell` lies inside the grid.
    #[inline]
    pub fn contains(&self, cell: CellCoord) -> bool {
        cell.x < self.size_x && cell.y < self.size_y
    }

    /// True if the ball cannot leave `cell` heading `direction`.
    ///
    /// The grid boundary counts as a wall, as does `Direction::None`.
    pub fn blocked(&self, cell: CellCoord, direction: Direction) -> bool {
        match cell.step(direction, self.size_x, self.size_y) {
            Some(next) => self.wall_between(cell, next),
            None => true,
        }
    }

    /// True if no traversal is possible between `a` and `b`.
    ///
    /// Non-adjacent or out-of-grid pairs are always separated. Either side
    /// of an edge carrying the wall bit is enough to block it.
    pub fn wall_between(&self, a: CellCoord, b: CellCoord) -> bool {
        if !self.contains(a) || !self.contains(b) {
            return true;
        }
        match a.direction_to(b) {
            Some(dir) => {
                self.walls[self.index(a)] & dir.wall_bit() != 0
                    || self.walls[self.index(b)] & dir.opposite().wall_bit() != 0
            }
            None => true,
        }
    }

    /// Clear the goal at `cell` if one is present.
    ///
    /// Returns true iff a goal was consumed.
    pub fn consume_goal(&mut self, cell: CellCoord) -> bool {
        if !self.contains(cell) {
            return false;
        }
        let idx = self.index(cell);
        if self.goals[idx] == 0 {
            return false;
        }
        self.goals[idx] = 0;
        self.goal_count -= 1;
        true
    }

    /// Goal marker at `cell` (0 when none or outside the grid).
    pub fn goal_at(&self, cell: CellCoord) -> u32 {
        if self.contains(cell) {
            self.goals[self.index(cell)]
        } else {
            0
        }
    }

    /// Remaining goals.
    #[inline]
    pub fn goal_count(&self) -> u32 {
        self.goal_count
    }

    /// Check if every goal has been consumed.
    pub fn is_solved(&self) -> bool {
        self.goal_count == 0
    }

    /// Goal grid flattened column by column: index `x * size_y + y`.
    pub fn goals_column_major(&self) -> Vec<u32> {
        let mut out = Vec::with_capacity(self.goals.len());
        for x in 0..self.size_x {
            for y in 0..self.size_y {
                out.push(self.goals[self.index(CellCoord::new(x, y))]);
            }
        }
        out
    }

    /// Overlay a goal grid in the layout produced by
    /// [`goals_column_major`](Self::goals_column_major).
    ///
    /// Returns false and leaves the maze untouched if the length does not
    /// match the grid.
    pub fn overlay_goals_column_major(&mut self, column_major: &[u32]) -> bool {
        if column_major.len() != self.goals.len() {
            return false;
        }
        let mut values = column_major.iter();
        for x in 0..self.size_x {
            for y in 0..self.size_y {
                let idx = self.index(CellCoord::new(x, y));
                self.goals[idx] = values.next().copied().unwrap_or(0);
            }
        }
        self.goal_count = count_goals(&self.goals);
        true
    }

    #[inline]
    fn index(&self, cell: CellCoord) -> usize {
        (cell.y as usize) * (self.size_x as usize) + (cell.x as usize)
    }
}

fn count_goals(goals: &[u32]) -> u32 {
    goals.iter().filter(|g| **g != 0).count() as u32
}

// =============================================================================
// TESTS
// =============================================================================
