//! Board-row classification.
//!
//! The engine interleaves its grid dump with prompts and debug output on the
//! same stream. A row is recognised purely by shape: exactly [`GRID_SIZE`]
//! whitespace-separated tokens. Nothing stricter is attempted, since the
//! token vocabulary differs between engine builds.

use crate::types::GRID_SIZE;

/// Number of whitespace-separated tokens in `line`.
pub fn token_count(line: &str) -> usize {
    line.split_whitespace().count()
}

/// True iff `line` is a grid row.
///
/// Stops scanning as soon as a ninth token shows up, so long log lines are
/// rejected cheaply.
pub fn is_board_line(line: &str) -> bool {
    let mut tokens = line.split_whitespace();
    for _ in 0..GRID_SIZE {
        if tokens.next().is_none() {
            return false;
        }
    }
    tokens.next().is_none()
}
