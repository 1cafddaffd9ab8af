//! Engine session - drive a board engine subprocess over stdin/stdout
//!
//! This crate launches an engine executable, keeps its output drained in the
//! background, and turns request/response exchanges into
//! [`Snapshot`](types::Snapshot)s. The engine itself is opaque: it reads
//! coordinate pairs on stdin and prints board dumps, interleaved with
//! arbitrary noise, on stdout.
//!
//! # Exchange Overview
//!
//! 1. **Spawn**: [`EngineSession::open_with`] starts the process and the
//!    output reader, then writes the handshake literal if one is configured
//! 2. **Initial board**: [`EngineSession::get_initial_board`] reads the
//!    block the engine prints on startup
//! 3. **Select**: [`EngineSession::select_piece`] writes a coordinate pair
//!    and reads one block (or two, see
//!    [`SelectResponse`](types::SelectResponse))
//! 4. **Move**: [`EngineSession::move_piece`] writes a coordinate pair and
//!    reads one block
//! 5. **Close**: [`EngineSession::close`] kills the engine and reaps it
//!
//! # Failure Model
//!
//! Every exchange returns `Result<Snapshot, ExchangeError>`. Write failures,
//! per-line timeouts and a closed output stream all come back as `Err` and
//! are also reported to the session's [`DiagnosticSink`]. The session stays
//! usable afterwards; there is no internal retry.
//!
//! # Concurrency
//!
//! - One output reader task per session, started at spawn, sole producer of
//!   the [`LineQueue`]
//! - The caller's thread is the sole consumer; it blocks only while writing
//!   a command or waiting for the next line
//! - The only timeout is per line ([`SessionConfig::line_timeout_ms`]);
//!   there is no whole-exchange deadline
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use engine_adapter_session::{EngineSession, SessionConfig, TracingSink};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut session =
//!     EngineSession::open_with("./chess", SessionConfig::two_player(), Arc::new(TracingSink))?;
//!
//! let board = session.get_initial_board()?;
//! println!("{}", board.board);
//!
//! if let Ok(selected) = session.select_piece(6, 4) {
//!     println!("{}", selected.highlights);
//! }
//! let _ = session.move_piece(4, 4);
//!
//! session.close()?;
//! # Ok(())
//! # }
//! ```

pub mod assembler;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod queue;
pub mod reader;
pub mod session;

pub use engine_adapter_protocol as protocol;
pub use engine_adapter_types as types;

pub use assembler::{collect_block, CollectOutcome, Collected};
pub use config::{SessionConfig, StderrMode};
pub use diagnostics::{Diagnostic, DiagnosticSink, RecordingSink, TracingSink};
pub use error::ExchangeError;
pub use queue::{line_queue, LineQueue, LineSender, Popped};
pub use reader::{read_lines, spawn_output_reader};
pub use session::{EngineSession, SessionState};
