//! Shared data structures and constants
//!
//! This crate defines the values that cross the boundary between the engine
//! subprocess and the embedding application. Everything here is plain data
//! with no I/O, so it can be used by the wire codec, the session, and any
//! UI that renders the grids.
//!
//! # Snapshot Layout
//!
//! The engine dumps its state as a block of text rows, each row holding
//! exactly [`GRID_SIZE`] whitespace-separated tokens:
//!
//! | Rows | Grid | Typical tokens |
//! |------|------|----------------|
//! | 0-7 | `board` | piece codes, `.` for empty |
//! | 8-15 | `sides` | owner of each square |
//! | 16-23 | `highlights` | `1` where a selected piece may move |
//!
//! # Examples
//!
//! ```
//! use engine_adapter_types::{CoordinateOrder, BLOCK_LINES, GRID_SIZE};
//!
//! assert_eq!(BLOCK_LINES, 3 * GRID_SIZE);
//! assert_eq!(CoordinateOrder::ColumnRow.arrange(5, 1), (1, 5));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Rows per grid and tokens per row (8)
pub const GRID_SIZE: usize = 8;

/// Grids per snapshot: board, sides, highlights (3)
pub const GRIDS_PER_SNAPSHOT: usize = 3;

/// Classified lines making up one snapshot block (24)
pub const BLOCK_LINES: usize = GRID_SIZE * GRIDS_PER_SNAPSHOT;

/// Default wait for each individual output line, in milliseconds.
///
/// Must absorb the engine's think time between two rows; there is no
/// aggregate cap on a whole block.
pub const DEFAULT_LINE_TIMEOUT_MS: u64 = 10_000;

/// Literal that switches the reference engine into two-player mode.
pub const TWO_PLAYER_HANDSHAKE: &str = "3";

/// One 8x8 grid of tokens, indexed `[row][col]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grid {
    rows: [[String; GRID_SIZE]; GRID_SIZE],
}

impl Grid {
    pub fn from_rows(rows: [[String; GRID_SIZE]; GRID_SIZE]) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[[String; GRID_SIZE]; GRID_SIZE] {
        &self.rows
    }

    /// Row `row`, or `None` when out of range.
    pub fn row(&self, row: usize) -> Option<&[String; GRID_SIZE]> {
        self.rows.get(row)
    }

    /// Token at `(row, col)`, or `None` when out of range.
    ///
    /// # Examples
    ///
    /// ```
    /// use engine_adapter_types::Grid;
    ///
    /// let grid = Grid::from_rows(std::array::from_fn(|r| {
    ///     std::array::from_fn(|c| format!("{r}{c}"))
    /// }));
    /// assert_eq!(grid.cell(2, 3), Some("23"));
    /// assert_eq!(grid.cell(8, 0), None);
    /// ```
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(String::as_str)
    }

    /// Nested `Vec` copy, for callers that want list-of-lists.
    pub fn to_vec(&self) -> Vec<Vec<String>> {
        self.rows.iter().map(|r| r.to_vec()).collect()
    }

    pub fn into_rows(self) -> [[String; GRID_SIZE]; GRID_SIZE] {
        self.rows
    }
}

/// Renders the grid the way the engine prints it: one space-joined row per line.
impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", row.join(" "))?;
        }
        Ok(())
    }
}

/// The three parallel grids describing the engine's visible state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Snapshot {
    pub board: Grid,
    pub sides: Grid,
    pub highlights: Grid,
}

impl Snapshot {
    pub fn into_parts(self) -> (Grid, Grid, Grid) {
        (self.board, self.sides, self.highlights)
    }
}

/// Order in which a coordinate pair is written to the engine.
///
/// Engines built from the same sources disagree on this, so it is always
/// chosen explicitly per target engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateOrder {
    /// `"<row> <col>"`
    #[default]
    RowColumn,
    /// `"<col> <row>"`
    ColumnRow,
}

impl CoordinateOrder {
    /// Arrange `(row, col)` into wire order.
    pub fn arrange(self, row: i32, col: i32) -> (i32, i32) {
        match self {
            CoordinateOrder::RowColumn => (row, col),
            CoordinateOrder::ColumnRow => (col, row),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CoordinateOrder::RowColumn => "row_column",
            CoordinateOrder::ColumnRow => "column_row",
        }
    }
}

/// How many blocks the engine prints after a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectResponse {
    /// One block, returned to the caller.
    #[default]
    Single,
    /// A highlighted block followed by an unhighlighted one. Only the first
    /// is returned; the second is drained to keep the stream aligned.
    HighlightThenClear,
}

impl SelectResponse {
    pub fn block_count(self) -> usize {
        match self {
            SelectResponse::Single => 1,
            SelectResponse::HighlightThenClear => 2,
        }
    }
}
