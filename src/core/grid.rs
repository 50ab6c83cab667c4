//! Grid Coordinates and Directions
//!
//! Integer cell coordinates and the four roll directions.
//! Row 0 is the top of the maze, so `Up` decreases `y`.

use serde::{Serialize, Deserialize};

// =============================================================================
// WALL BITS
// =============================================================================

/// Wall on the top edge of a cell.
pub const WALL_UP: u8 = 0x01;
/// Wall on the right edge of a cell.
pub const WALL_RIGHT: u8 = 0x02;
/// Wall on the bottom edge of a cell.
pub const WALL_DOWN: u8 = 0x04;
/// Wall on the left edge of a cell.
pub const WALL_LEFT: u8 = 0x08;
/// All four edges walled.
pub const WALL_ALL: u8 = WALL_UP | WALL_RIGHT | WALL_DOWN | WALL_LEFT;

// =============================================================================
// DIRECTION
// =============================================================================

/// Commanded roll direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
#[derive(Default)]
pub enum Direction {
    /// No active command.
    #[default]
    None = 0,
    /// Toward row 0.
    Up = 1,
    /// Toward the last row.
    Down = 2,
    /// Toward column 0.
    Left = 3,
    /// Toward the last column.
    Right = 4,
}

impl Direction {
    /// The four axis-aligned directions.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit step `(dx, dy)` for this direction.
    #[inline]
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::None => (0, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Direction pointing the other way.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::None => Direction::None,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Wall bit guarding the edge a ball crosses when leaving a cell this way.
    #[inline]
    pub fn wall_bit(self) -> u8 {
        match self {
            Direction::None => 0,
            Direction::Up => WALL_UP,
            Direction::Down => WALL_DOWN,
            Direction::Left => WALL_LEFT,
            Direction::Right => WALL_RIGHT,
        }
    }

    /// Check if this is an actual command.
    #[inline]
    pub fn is_some(self) -> bool {
        self != Direction::None
    }
}

// =============================================================================
// CELL COORDINATE
// =============================================================================

/// Location of a single maze cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellCoord {
    /// Column, 0 at the left edge.
    pub x: u32,
    /// Row, 0 at the top edge.
    pub y: u32,
}

impl CellCoord {
    /// Create a new cell coordinate.
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Neighbouring cell in `direction`, if it stays inside a
    /// `size_x` by `size_y` grid.
    pub fn step(self, direction: Direction, size_x: u32, size_y: u32) -> Option<CellCoord> {
        let (dx, dy) = direction.delta();
        if dx == 0 && dy == 0 {
            return None;
        }
        let nx = self.x.checked_add_signed(dx)?;
        let ny = self.y.checked_add_signed(dy)?;
        if nx >= size_x || ny >= size_y {
            return None;
        }
        Some(CellCoord::new(nx, ny))
    }

    /// Direction from `self` to an orthogonally adjacent `other`.
    pub fn direction_to(self, other: CellCoord) -> Option<Direction> {
        let dx = other.x as i64 - self.x as i64;
        let dy = other.y as i64 - self.y as i64;
        match (dx, dy) {
            (0, -1) => Some(Direction::Up),
            (0, 1) => Some(Direction::Down),
            (-1, 0) => Some(Direction::Left),
            (1, 0) => Some(Direction::Right),
            _ => None,
        }
    }
}

impl std::fmt::Display for CellCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// =============================================================================
// TESTS
// =============================================================================
