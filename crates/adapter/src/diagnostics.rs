//! Diagnostic events reported by a session.
//!
//! The session never prints. Everything worth telling the embedding
//! application goes through an injected [`DiagnosticSink`]; the default
//! [`TracingSink`] forwards events to `tracing`, and [`RecordingSink`] keeps
//! them in memory so tests can assert on what happened.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

/// Something the session observed while talking to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Child process started.
    Spawned { program: String, pid: Option<u32> },
    /// A command line was written and flushed.
    CommandSent { command: &'static str, line: String },
    /// The engine's input stream rejected a write.
    WriteFailed { line: String, error: String },
    /// An output line without exactly eight tokens was dropped.
    LineSkipped { line: String },
    /// The per-line wait expired before a block was complete.
    CollectTimedOut { received: usize, expected: usize },
    /// The engine's output reached end-of-stream before a block was complete.
    StreamClosed { received: usize, expected: usize },
    /// A complete block was read and thrown away (second half of a select pair).
    BlockDiscarded { operation: &'static str },
    /// An operation returned without a snapshot.
    Incomplete {
        operation: &'static str,
        reason: String,
    },
    /// The output reader finished; no more lines will be queued.
    ReaderStopped { lines: usize, error: Option<String> },
    /// The child process was reaped on close.
    Exited { code: Option<i32> },
}

/// Receiver for [`Diagnostic`] events.
///
/// Called from the caller's thread and from the reader task, so
/// implementations must be thread-safe and should return quickly.
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, event: &Diagnostic);
}

/// Forwards events to `tracing` under the `engine_adapter` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, event: &Diagnostic) {
        match event {
            Diagnostic::Spawned { program, pid } => {
                info!(target: "engine_adapter", program = %program, pid = ?pid, "engine spawned");
            }
            Diagnostic::CommandSent { command, line } => {
                debug!(target: "engine_adapter", command = *command, line = %line, "command sent");
            }
            Diagnostic::WriteFailed { line, error } => {
                warn!(target: "engine_adapter", line = %line, error = %error, "write to engine failed");
            }
            Diagnostic::LineSkipped { line } => {
                debug!(target: "engine_adapter", line = %line, "skipped non-board line");
            }
            Diagnostic::CollectTimedOut { received, expected } => {
                warn!(
                    target: "engine_adapter",
                    received = *received,
                    expected = *expected,
                    "timed out waiting for engine output"
                );
            }
            Diagnostic::StreamClosed { received, expected } => {
                warn!(
                    target: "engine_adapter",
                    received = *received,
                    expected = *expected,
                    "engine output closed mid-block"
                );
            }
            Diagnostic::BlockDiscarded { operation } => {
                debug!(target: "engine_adapter", operation = *operation, "discarded follow-up block");
            }
            Diagnostic::Incomplete { operation, reason } => {
                warn!(target: "engine_adapter", operation = *operation, reason = %reason, "incomplete board data");
            }
            Diagnostic::ReaderStopped { lines, error } => {
                info!(target: "engine_adapter", lines = *lines, error = ?error, "output reader stopped");
            }
            Diagnostic::Exited { code } => {
                info!(target: "engine_adapter", code = ?code, "engine exited");
            }
        }
    }
}

/// Keeps every event in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<Diagnostic>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Diagnostic> {
        self.events.lock().clone()
    }

    /// Remove and return everything recorded so far.
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn contains(&self, predicate: impl Fn(&Diagnostic) -> bool) -> bool {
        self.events.lock().iter().any(predicate)
    }
}

impl DiagnosticSink for RecordingSink {
    fn emit(&self, event: &Diagnostic) {
        self.events.lock().push(event.clone());
    }
}
