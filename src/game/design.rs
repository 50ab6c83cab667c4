//! Map Designs and Catalogue
//!
//! Immutable maze descriptors (wall layout, goal placement, spawn cell,
//! display name) and the ordered catalogue the session navigates.
//!
//! Designs are authored in the usual ASCII maze notation:
//!
//! ```text
//! +-+-+-+
//! |o    |
//! + +-+ +
//! |    x|
//! +-+-+-+
//! ```
//!
//! Cell `(x, y)` sits at text row `2y + 1`, column `2x + 1`. A `|` between
//! two cells or a `-` above a cell is a wall. `o` marks the spawn cell,
//! `x` a goal. The outer boundary is always walled, whatever the text says.

use serde::{Serialize, Deserialize};

use crate::core::grid::{CellCoord, Direction, WALL_DOWN, WALL_LEFT, WALL_RIGHT, WALL_UP};
use crate::core::hash::{StateHash, StateHasher};

/// Design authoring errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DesignError {
    /// Layout has no rows or a zero-sized grid.
    #[error("Design '{0}' has no cells")]
    Empty(String),

    /// Text dimensions are not of the form 2n+1.
    #[error("Design '{name}' has {rows}x{cols} characters, expected odd dimensions of at least 3")]
    BadDimensions {
        /// Design name.
        name: String,
        /// Text rows.
        rows: usize,
        /// Text columns.
        cols: usize,
    },

    /// A cell contained a character other than ` `, `o` or `x`.
    #[error("Design '{name}' has unknown marker '{marker}' at {cell}")]
    UnknownMarker {
        /// Design name.
        name: String,
        /// Offending cell.
        cell: CellCoord,
        /// Offending character.
        marker: char,
    },

    /// No spawn cell was marked.
    #[error("Design '{0}' has no spawn cell")]
    MissingSpawn(String),

    /// More than one spawn cell was marked.
    #[error("Design '{0}' has more than one spawn cell")]
    DuplicateSpawn(String),

    /// A cell reference lies outside the grid.
    #[error("Design '{name}' references {cell} outside its {size_x}x{size_y} grid")]
    OutOfBounds {
        /// Design name.
        name: String,
        /// Offending cell.
        cell: CellCoord,
        /// Grid width.
        size_x: u32,
        /// Grid height.
        size_y: u32,
    },

    /// Catalogue must hold at least one design.
    #[error("Map catalogue is empty")]
    EmptyCatalogue,

    /// Catalogue JSON could not be parsed.
    #[error("Invalid catalogue JSON: {0}")]
    Json(String),
}

// =============================================================================
// MAP DESIGN
// =============================================================================

/// Immutable description of one maze.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapDesign {
    name: String,
    size_x: u32,
    size_y: u32,
    /// Per-cell wall bits, row-major.
    walls: Vec<u8>,
    /// Per-cell goal markers, row-major.
    goals: Vec<u32>,
    spawn: CellCoord,
}

impl MapDesign {
    /// Create an open design with only the boundary walled.
    pub fn open(
        name: impl Into<String>,
        size_x: u32,
        size_y: u32,
        spawn: CellCoord,
    ) -> Result<Self, DesignError> {
        let name = name.into();
        if size_x == 0 || size_y == 0 {
            return Err(DesignError::Empty(name));
        }
        let cells = (size_x as usize) * (size_y as usize);
        let mut design = Self {
            name,
            size_x,
            size_y,
            walls: vec![0; cells],
            goals: vec![0; cells],
            spawn,
        };
        design.check_bounds(spawn)?;
        design.wall_boundary();
        Ok(design)
    }

    /// Parse a design from ASCII maze notation.
    pub fn from_ascii<S: AsRef<str>>(name: impl Into<String>, rows: &[S]) -> Result<Self, DesignError> {
        let name = name.into();
        let grid: Vec<Vec<char>> = rows.iter().map(|r| r.as_ref().chars().collect()).collect();

        let text_rows = grid.len();
        let text_cols = grid.iter().map(Vec::len).max().unwrap_or(0);
        if text_rows == 0 || text_cols == 0 {
            return Err(DesignError::Empty(name));
        }
        if text_rows < 3 || text_cols < 3 || text_rows % 2 == 0 || text_cols % 2 == 0 {
            return Err(DesignError::BadDimensions { name, rows: text_rows, cols: text_cols });
        }

        // Short rows read as open space.
        let at = |row: usize, col: usize| -> char {
            grid.get(row).and_then(|r| r.get(col)).copied().unwrap_or(' ')
        };

        let size_x = ((text_cols - 1) / 2) as u32;
        let size_y = ((text_rows - 1) / 2) as u32;

        let mut spawn = None;
        let mut goal_cells = Vec::new();
        for y in 0..size_y {
            for x in 0..size_x {
                let cell = CellCoord::new(x, y);
                match at(2 * y as usize + 1, 2 * x as usize + 1) {
                    ' ' | '.' => {}
                    'o' | 'O' => {
                        if spawn.replace(cell).is_some() {
                            return Err(DesignError::DuplicateSpawn(name));
                        }
                    }
                    'x' | 'X' => goal_cells.push(cell),
                    marker => return Err(DesignError::UnknownMarker { name, cell, marker }),
                }
            }
        }
        let spawn = spawn.ok_or_else(|| DesignError::MissingSpawn(name.clone()))?;

        let mut design = Self::open(name, size_x, size_y, spawn)?;
        for y in 0..size_y {
            for x in 0..size_x {
                let cell = CellCoord::new(x, y);
                let (row, col) = (2 * y as usize + 1, 2 * x as usize + 1);
                if y > 0 && at(row - 1, col) == '-' {
                    design.add_wall(cell, Direction::Up)?;
                }
                if x > 0 && at(row, col - 1) == '|' {
                    design.add_wall(cell, Direction::Left)?;
                }
            }
        }
        for cell in goal_cells {
            design.add_goal(cell)?;
        }

        Ok(design)
    }

    /// Wall off the edge of `cell` facing `direction`, on both sides.
    pub fn add_wall(&mut self, cell: CellCoord, direction: Direction) -> Result<(), DesignError> {
        self.check_bounds(cell)?;
        let idx = self.index(cell);
        self.walls[idx] |= direction.wall_bit();
        if let Some(neighbour) = cell.step(direction, self.size_x, self.size_y) {
            let n_idx = self.index(neighbour);
            self.walls[n_idx] |= direction.opposite().wall_bit();
        }
        Ok(())
    }

    /// Place a goal marker on `cell`.
    pub fn add_goal(&mut self, cell: CellCoord) -> Result<(), DesignError> {
        self.check_bounds(cell)?;
        let idx = self.index(cell);
        self.goals[idx] = 1;
        Ok(())
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Grid width in cells.
    pub fn size_x(&self) -> u32 {
        self.size_x
    }

    /// Grid height in cells.
    pub fn size_y(&self) -> u32 {
        self.size_y
    }

    /// Spawn cell.
    pub fn spawn(&self) -> CellCoord {
        self.spawn
    }

    /// Wall bits of `cell`.
    pub fn walls_at(&self, cell: CellCoord) -> u8 {
        self.walls[self.index(cell)]
    }

    /// Row-major wall bits.
    pub fn walls(&self) -> &[u8] {
        &self.walls
    }

    /// Row-major initial goal markers.
    pub fn goals(&self) -> &[u32] {
        &self.goals
    }

    /// Number of goal cells at load time.
    pub fn goal_count(&self) -> u32 {
        self.goals.iter().filter(|g| **g != 0).count() as u32
    }

    /// Content hash of this design.
    pub fn fingerprint(&self) -> StateHash {
        let mut hasher = StateHasher::for_map_design();
        hasher.update_str(&self.name);
        hasher.update_u32(self.size_x);
        hasher.update_u32(self.size_y);
        hasher.update_bytes(&self.walls);
        hasher.update_u32_slice(&self.goals);
        hasher.update_cell(self.spawn);
        hasher.finalize()
    }

    #[inline]
    fn index(&self, cell: CellCoord) -> usize {
        (cell.y as usize) * (self.size_x as usize) + (cell.x as usize)
    }

    fn check_bounds(&self, cell: CellCoord) -> Result<(), DesignError> {
        if cell.x < self.size_x && cell.y < self.size_y {
            Ok(())
        } else {
            Err(DesignError::OutOfBounds {
                name: self.name.clone(),
                cell,
                size_x: self.size_x,
                size_y: self.size_y,
            })
        }
    }

    fn wall_boundary(&mut self) {
        let (w, h) = (self.size_x, self.size_y);
        for x in 0..w {
            let top = self.index(CellCoord::new(x, 0));
            let bottom = self.index(CellCoord::new(x, h - 1));
            self.walls[top] |= WALL_UP;
            self.walls[bottom] |= WALL_DOWN;
        }
        for y in 0..h {
            let left = self.index(CellCoord::new(0, y));
            let right = self.index(CellCoord::new(w - 1, y));
            self.walls[left] |= WALL_LEFT;
            self.walls[right] |= WALL_RIGHT;
        }
    }
}

// =============================================================================
// CATALOGUE
// =============================================================================

/// Serialized form of a design: a name plus its ASCII rows.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AsciiDesign {
    /// Display name.
    pub name: String,
    /// ASCII layout rows.
    pub rows: Vec<String>,
}

/// Ordered, fixed list of map designs.
#[derive(Clone, Debug)]
pub struct MapCatalogue {
    designs: Vec<MapDesign>,
}

impl MapCatalogue {
    /// Create a catalogue. Must hold at least one design.
    pub fn new(designs: Vec<MapDesign>) -> Result<Self, DesignError> {
        if designs.is_empty() {
            return Err(DesignError::EmptyCatalogue);
        }
        Ok(Self { designs })
    }

    /// Parse a catalogue from a JSON array of [`AsciiDesign`].
    pub fn from_json(json: &str) -> Result<Self, DesignError> {
        let entries: Vec<AsciiDesign> =
            serde_json::from_str(json).map_err(|e| DesignError::Json(e.to_string()))?;
        let designs = entries
            .iter()
            .map(|entry| MapDesign::from_ascii(entry.name.clone(), &entry.rows))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(designs)
    }

    /// The designs shipped with the game.
    pub fn builtin() -> Result<Self, DesignError> {
        let designs = BUILTIN_DESIGNS
            .iter()
            .map(|(name, rows)| MapDesign::from_ascii(*name, rows))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(designs)
    }

    /// Number of designs; the modulus for navigation.
    pub fn len(&self) -> usize {
        self.designs.len()
    }

    /// Always false for a constructed catalogue.
    pub fn is_empty(&self) -> bool {
        self.designs.is_empty()
    }

    /// Design by id.
    pub fn get(&self, id: usize) -> Option<&MapDesign> {
        self.designs.get(id)
    }

    /// All designs in order.
    pub fn iter(&self) -> impl Iterator<Item = &MapDesign> {
        self.designs.iter()
    }

    /// Combined hash of every design, in order.
    pub fn fingerprint(&self) -> StateHash {
        let mut hasher = StateHasher::for_map_design();
        hasher.update_u64(self.designs.len() as u64);
        for design in &self.designs {
            hasher.update_bytes(&design.fingerprint());
        }
        hasher.finalize()
    }
}

const BUILTIN_DESIGNS: &[(&str, &[&str])] = &[
    (
        "Warm Up",
        &[
            "+-+-+-+",
            "|o    |",
            "+ +-+ +",
            "|    x|",
            "+-+-+-+",
        ],
    ),
    (
        "Four Corners",
        &[
            "+-+-+-+-+",
            "|x     x|",
            "+ +-+ + +",
            "|   |o  |",
            "+ + + +-+",
            "|       |",
            "+-+ + + +",
            "|x     x|",
            "+-+-+-+-+",
        ],
    ),
    (
        "Spiral",
        &[
            "+-+-+-+-+-+",
            "|o        |",
            "+-+-+-+-+ +",
            "|x      | |",
            "+ +-+-+ + +",
            "| |  x| | |",
            "+ + +-+ + +",
            "| |     | |",
            "+ +-+-+-+ +",
            "|         |",
            "+-+-+-+-+-+",
        ],
    ),
    (
        "Crossroads",
        &[
            "+-+-+-+-+-+",
            "|x  | |  x|",
            "+ + + + + +",
            "|   | |   |",
            "+-+ + + +-+",
            "|    o    |",
            "+-+ + + +-+",
            "|   | |   |",
            "+ + + + + +",
            "|x  | |  x|",
            "+-+-+-+-+-+",
        ],
    ),
];

// =============================================================================
// TESTS
// =============================================================================
