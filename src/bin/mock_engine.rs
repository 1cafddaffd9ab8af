//! Scripted console engine for end-to-end tests.
//!
//! Usage: `mock-engine [--handshake <line>] [--column-row] [--double-select]
//! [--noise] [--stall-after <rows> [--resume-after-ms <ms>]] [--truncate-after <rows>]
//! [--exit-after <commands>]`
//!
//! Row counts for `--stall-after` and `--truncate-after` run across every block
//! printed, not just the first.

use std::io;

use anyhow::Result;

use chess_engine_adapter::mock::{parse_mock_args, MockEngine};

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = parse_mock_args(&args)?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    MockEngine::new(config).run(stdin.lock(), stdout.lock())
}
