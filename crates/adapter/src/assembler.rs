//! Block assembly: pull board rows off the line queue until a block is full.

use std::time::Duration;

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::ExchangeError;
use crate::protocol::{is_board_line, parse_block};
use crate::queue::{LineQueue, Popped};
use crate::types::Snapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectOutcome {
    Complete,
    TimedOut,
    StreamClosed,
}

/// Board rows gathered by one [`collect_block`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collected {
    pub lines: Vec<String>,
    pub expected: usize,
    pub outcome: CollectOutcome,
}

impl Collected {
    pub fn is_complete(&self) -> bool {
        self.outcome == CollectOutcome::Complete
    }

    /// Parse a complete block, or explain why there is none.
    ///
    /// Partial rows are dropped here; they cannot be resumed by a later
    /// collect.
    pub fn into_snapshot(self) -> Result<Snapshot, ExchangeError> {
        let received = self.lines.len();
        match self.outcome {
            CollectOutcome::Complete => Ok(parse_block(&self.lines)?),
            CollectOutcome::TimedOut => Err(ExchangeError::Timeout {
                received,
                expected: self.expected,
            }),
            CollectOutcome::StreamClosed => Err(ExchangeError::StreamClosed {
                received,
                expected: self.expected,
            }),
        }
    }
}

/// Collect `expected` board rows, waiting at most `line_timeout` for each
/// line (board row or noise).
///
/// Noise is discarded as it is popped. There is no cap on the total time
/// spent: an engine that keeps printing is always waited for. Stops early,
/// with whatever rows it has, when a wait expires or the stream closes.
pub async fn collect_block(
    queue: &mut LineQueue,
    expected: usize,
    line_timeout: Duration,
    sink: &dyn DiagnosticSink,
) -> Collected {
    let mut lines = Vec::with_capacity(expected);

    while lines.len() < expected {
        match queue.pop(line_timeout).await {
            Popped::Line(line) => {
                if is_board_line(&line) {
                    lines.push(line);
                } else {
                    sink.emit(&Diagnostic::LineSkipped { line });
                }
            }
            Popped::TimedOut => {
                sink.emit(&Diagnostic::CollectTimedOut {
                    received: lines.len(),
                    expected,
                });
                return Collected {
                    lines,
                    expected,
                    outcome: CollectOutcome::TimedOut,
                };
            }
            Popped::Closed => {
                sink.emit(&Diagnostic::StreamClosed {
                    received: lines.len(),
                    expected,
                });
                return Collected {
                    lines,
                    expected,
                    outcome: CollectOutcome::StreamClosed,
                };
            }
        }
    }

    Collected {
        lines,
        expected,
        outcome: CollectOutcome::Complete,
    }
}
