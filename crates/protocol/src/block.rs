//! Block parsing: 24 grid rows into three 8x8 grids.

use arrayvec::ArrayVec;
use thiserror::Error;

use crate::classify::token_count;
use crate::types::{Grid, Snapshot, BLOCK_LINES, GRID_SIZE};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockError {
    #[error("expected {expected} rows, got {actual}")]
    WrongLineCount { expected: usize, actual: usize },
    #[error("row {index} has {tokens} tokens, expected 8")]
    NotARow { index: usize, tokens: usize },
}

fn parse_row(index: usize, line: &str) -> Result<[String; GRID_SIZE], BlockError> {
    let mut row: ArrayVec<String, GRID_SIZE> = ArrayVec::new();
    for token in line.split_whitespace() {
        row.try_push(token.to_owned()).map_err(|_| BlockError::NotARow {
            index,
            tokens: token_count(line),
        })?;
    }
    row.into_inner()
        .map_err(|partial| BlockError::NotARow {
            index,
            tokens: partial.len(),
        })
}

/// `first_index` is only used to report which block row was bad.
fn parse_rows<S: AsRef<str>>(lines: &[S], first_index: usize) -> Result<Grid, BlockError> {
    if lines.len() != GRID_SIZE {
        return Err(BlockError::WrongLineCount {
            expected: GRID_SIZE,
            actual: lines.len(),
        });
    }

    let mut rows: ArrayVec<[String; GRID_SIZE], GRID_SIZE> = ArrayVec::new();
    for (i, line) in lines.iter().enumerate() {
        rows.push(parse_row(first_index + i, line.as_ref())?);
    }
    let rows = rows.into_inner().map_err(|partial| BlockError::WrongLineCount {
        expected: GRID_SIZE,
        actual: partial.len(),
    })?;
    Ok(Grid::from_rows(rows))
}

/// Parse exactly eight rows into a grid.
pub fn parse_grid<S: AsRef<str>>(lines: &[S]) -> Result<Grid, BlockError> {
    parse_rows(lines, 0)
}

/// Split a complete block into board, sides and highlights.
///
/// Rows are taken verbatim: tokens are whatever `split_whitespace` yields,
/// in order, with no interpretation.
pub fn parse_block<S: AsRef<str>>(lines: &[S]) -> Result<Snapshot, BlockError> {
    if lines.len() != BLOCK_LINES {
        return Err(BlockError::WrongLineCount {
            expected: BLOCK_LINES,
            actual: lines.len(),
        });
    }

    let board = parse_rows(&lines[..GRID_SIZE], 0)?;
    let sides = parse_rows(&lines[GRID_SIZE..2 * GRID_SIZE], GRID_SIZE)?;
    let highlights = parse_rows(&lines[2 * GRID_SIZE..], 2 * GRID_SIZE)?;

    Ok(Snapshot {
        board,
        sides,
        highlights,
    })
}
