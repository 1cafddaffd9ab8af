//! Scripted stand-in for a console chess engine.
//!
//! Speaks the same text protocol as the real engine but knows no chess: the
//! first coordinate pair selects a square, the next moves whatever is on it.
//! Flags reproduce the quirks the session has to cope with (a mode prompt,
//! column-first coordinates, a double block after selection, chatter between
//! rows, stalls and early exits).

use std::io::{BufRead, Write};
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Result};

use crate::protocol::is_board_line;
use crate::types::{CoordinateOrder, GRID_SIZE};

type Cells = [[String; GRID_SIZE]; GRID_SIZE];

const BACK_RANK: [&str; GRID_SIZE] = ["r", "n", "b", "q", "k", "b", "n", "r"];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MockConfig {
    /// Wait for this line before printing the first board.
    pub handshake: Option<String>,
    pub coordinate_order: CoordinateOrder,
    /// Print a highlighted block and then a cleared block after a selection.
    pub double_select: bool,
    /// Interleave non-board chatter with the rows.
    pub noise: bool,
    /// Go silent once this many board rows have been printed in total.
    pub stall_after: Option<usize>,
    /// With `stall_after`, pause this long and then carry on instead of
    /// going silent for good.
    pub resume_after_ms: Option<u64>,
    /// Exit once this many board rows have been printed in total.
    pub truncate_after: Option<usize>,
    /// Exit after handling this many commands.
    pub exit_after: Option<usize>,
}

fn parse_count(flag: &str, value: Option<&String>) -> Result<usize> {
    let v = value.ok_or_else(|| anyhow!("mock-engine: missing value for {}", flag))?;
    v.parse::<usize>()
        .map_err(|_| anyhow!("mock-engine: invalid {} value: {}", flag, v))
}

pub fn parse_mock_args(args: &[String]) -> Result<MockConfig> {
    let mut config = MockConfig::default();
    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--handshake" => {
                i += 1;
                let v = args
                    .get(i)
                    .ok_or_else(|| anyhow!("mock-engine: missing value for --handshake"))?;
                config.handshake = Some(v.clone());
            }
            "--column-row" => config.coordinate_order = CoordinateOrder::ColumnRow,
            "--double-select" => config.double_select = true,
            "--noise" => config.noise = true,
            "--stall-after" => {
                i += 1;
                config.stall_after = Some(parse_count("--stall-after", args.get(i))?);
            }
            "--resume-after-ms" => {
                i += 1;
                let ms = parse_count("--resume-after-ms", args.get(i))?;
                config.resume_after_ms = Some(ms as u64);
            }
            "--truncate-after" => {
                i += 1;
                config.truncate_after = Some(parse_count("--truncate-after", args.get(i))?);
            }
            "--exit-after" => {
                i += 1;
                config.exit_after = Some(parse_count("--exit-after", args.get(i))?);
            }
            other => {
                return Err(anyhow!("mock-engine: unknown argument: {}", other));
            }
        }
        i += 1;
    }
    Ok(config)
}

fn filled(value: &str) -> Cells {
    std::array::from_fn(|_| std::array::from_fn(|_| value.to_string()))
}

fn row_line(row: &[String; GRID_SIZE]) -> String {
    row.join(" ")
}

pub struct MockEngine {
    config: MockConfig,
    board: Cells,
    sides: Cells,
    highlights: Cells,
    selected: Option<(usize, usize)>,
}

impl MockEngine {
    pub fn new(config: MockConfig) -> Self {
        let mut board = filled(".");
        let mut sides = filled(".");
        for c in 0..GRID_SIZE {
            board[0][c] = BACK_RANK[c].to_string();
            board[1][c] = "p".to_string();
            board[6][c] = "P".to_string();
            board[7][c] = BACK_RANK[c].to_uppercase();
            for r in [0, 1] {
                sides[r][c] = "b".to_string();
            }
            for r in [6, 7] {
                sides[r][c] = "w".to_string();
            }
        }

        Self {
            config,
            board,
            sides,
            highlights: filled("0"),
            selected: None,
        }
    }

    /// The 24 grid rows of the current state, without chatter.
    pub fn block_rows(&self) -> Vec<String> {
        [&self.board, &self.sides, &self.highlights]
            .into_iter()
            .flat_map(|grid| grid.iter().map(row_line))
            .collect()
    }

    /// Grid rows plus chatter, as printed.
    fn block_output(&self) -> Vec<String> {
        let rows = self.block_rows();
        if !self.config.noise {
            return rows;
        }

        let mut out = Vec::with_capacity(rows.len() + 8);
        out.push("Current board:".to_string());
        for (i, row) in rows.into_iter().enumerate() {
            out.push(row);
            if i % 8 == 7 {
                out.push(format!("debug: grid {} done", i / 8));
            }
        }
        out.push("Enter the row and column:".to_string());
        out
    }

    fn parse_square(&self, line: &str) -> Option<(usize, usize)> {
        let mut parts = line.split_whitespace();
        let a: i64 = parts.next()?.parse().ok()?;
        let b: i64 = parts.next()?.parse().ok()?;
        if parts.next().is_some() {
            return None;
        }
        let (row, col) = match self.config.coordinate_order {
            CoordinateOrder::RowColumn => (a, b),
            CoordinateOrder::ColumnRow => (b, a),
        };
        let in_range = |v: i64| (0..GRID_SIZE as i64).contains(&v);
        if in_range(row) && in_range(col) {
            Some((row as usize, col as usize))
        } else {
            None
        }
    }

    /// React to one command line and return everything to print.
    pub fn handle_line(&mut self, line: &str) -> Vec<String> {
        let Some((row, col)) = self.parse_square(line) else {
            return vec![format!("Invalid input: {}", line.trim())];
        };

        match self.selected.take() {
            None => {
                self.selected = Some((row, col));
                self.highlights[row][col] = "1".to_string();

                let mut out = vec![format!("Selected {} {}", row, col)];
                out.extend(self.block_output());
                if self.config.double_select {
                    self.highlights = filled("0");
                    out.extend(self.block_output());
                }
                out
            }
            Some((from_row, from_col)) => {
                let piece = std::mem::replace(&mut self.board[from_row][from_col], ".".to_string());
                let side = std::mem::replace(&mut self.sides[from_row][from_col], ".".to_string());
                self.board[row][col] = piece;
                self.sides[row][col] = side;
                self.highlights = filled("0");

                let mut out = vec![format!("Moved to {} {}", row, col)];
                out.extend(self.block_output());
                out
            }
        }
    }

    pub fn run<R: BufRead, W: Write>(mut self, input: R, output: W) -> Result<()> {
        let mut lines = input.lines();
        let mut out = Printer::new(&self.config, output);

        if let Some(handshake) = self.config.handshake.clone() {
            out.print(vec!["Select mode (1 or 3):".to_string()])?;
            loop {
                let Some(line) = lines.next().transpose()? else {
                    return Ok(());
                };
                if line.trim() == handshake {
                    break;
                }
                out.print(vec![format!("Unknown mode {}", line.trim())])?;
            }
        }

        let mut flow = out.print(self.block_output())?;
        let mut handled = 0usize;
        if self.config.exit_after == Some(handled) {
            return Ok(());
        }

        while flow == Flow::Continue {
            let Some(line) = lines.next().transpose()? else {
                return Ok(());
            };
            flow = out.print(self.handle_line(&line))?;

            handled += 1;
            if self.config.exit_after == Some(handled) {
                return Ok(());
            }
        }

        if flow == Flow::Hang {
            // Swallow input until the session goes away.
            for line in lines {
                line?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
    Hang,
}

/// Writes output lines, counting board rows for the stall and truncate cuts.
struct Printer<W> {
    output: W,
    rows: usize,
    stall_after: Option<usize>,
    truncate_after: Option<usize>,
    resume_after: Option<Duration>,
}

impl<W: Write> Printer<W> {
    fn new(config: &MockConfig, output: W) -> Self {
        Self {
            output,
            rows: 0,
            stall_after: config.stall_after,
            truncate_after: config.truncate_after,
            resume_after: config.resume_after_ms.map(Duration::from_millis),
        }
    }

    fn print(&mut self, lines: Vec<String>) -> Result<Flow> {
        for line in lines {
            writeln!(self.output, "{}", line)?;
            if !is_board_line(&line) {
                continue;
            }

            self.rows += 1;
            if self.truncate_after == Some(self.rows) {
                self.output.flush()?;
                return Ok(Flow::Exit);
            }
            if self.stall_after == Some(self.rows) {
                self.output.flush()?;
                match self.resume_after {
                    Some(pause) => thread::sleep(pause),
                    None => return Ok(Flow::Hang),
                }
            }
        }
        self.output.flush()?;
        Ok(Flow::Continue)
    }
}
