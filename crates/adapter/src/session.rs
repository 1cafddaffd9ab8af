//! Engine session: one child process and the exchanges made with it.
//!
//! Bridges the caller's synchronous calls with the async process I/O. The
//! session owns a small tokio runtime; its single worker runs the output
//! reader for the whole life of the session, while the caller's thread
//! blocks on the runtime only to write a command or wait for output.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin, Command as ProcessCommand};
use tokio::runtime::{Builder, Runtime};
use tokio::task::JoinHandle;

use crate::assembler::{collect_block, Collected};
use crate::config::SessionConfig;
use crate::diagnostics::{Diagnostic, DiagnosticSink, TracingSink};
use crate::error::ExchangeError;
use crate::protocol::{Command, WireFormat};
use crate::queue::{line_queue, LineQueue};
use crate::reader::spawn_output_reader;
use crate::types::{Snapshot, BLOCK_LINES};

/// How long `close` waits for the reader to observe end-of-stream.
const READER_SHUTDOWN: Duration = Duration::from_secs(1);

/// How long `close` gives the engine to exit after SIGTERM before killing it.
const TERMINATE_GRACE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Spawned; handshake not yet written.
    Starting,
    Ready,
    /// A command is in flight.
    AwaitingResponse,
    Closed,
}

/// A running engine process.
///
/// Operations take `&mut self`: one caller at a time, one exchange at a
/// time. None of the methods may be called from inside another tokio
/// runtime, since they block on the session's own.
pub struct EngineSession {
    program: PathBuf,
    config: SessionConfig,
    wire: WireFormat,
    sink: Arc<dyn DiagnosticSink>,
    state: SessionState,
    child: Child,
    stdin: Option<ChildStdin>,
    queue: LineQueue,
    reader: Option<JoinHandle<usize>>,
    // Dropped last: the process handles above are registered with it.
    runtime: Runtime,
}

impl EngineSession {
    /// Spawn `program` with default settings, logging through `tracing`.
    pub fn open(program: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(program, SessionConfig::default(), Arc::new(TracingSink))
    }

    pub fn open_with(
        program: impl AsRef<Path>,
        config: SessionConfig,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Result<Self> {
        let program = program.as_ref().to_path_buf();

        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("engine-reader")
            .enable_all()
            .build()
            .context("failed to create engine runtime")?;

        let mut child = {
            let _guard = runtime.enter();
            ProcessCommand::new(&program)
                .args(&config.args)
                .stdin(Stdio::piped())
                .stdout(Stdio::piped())
                .stderr(config.stderr.stdio())
                .spawn()
                .with_context(|| format!("failed to spawn engine at {}", program.display()))?
        };
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("engine stdin was not captured"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("engine stdout was not captured"))?;

        sink.emit(&Diagnostic::Spawned {
            program: program.display().to_string(),
            pid: child.id(),
        });

        let (sender, queue) = line_queue();
        let reader = spawn_output_reader(runtime.handle(), stdout, sender, Arc::clone(&sink));

        let wire = config.wire_format();
        let mut session = Self {
            program,
            config,
            wire,
            sink,
            state: SessionState::Starting,
            child,
            stdin: Some(stdin),
            queue,
            reader: Some(reader),
            runtime,
        };

        // A failed handshake is reported like any other write failure; the
        // first exchange will then come back incomplete.
        if let Some(line) = Command::Initialize.encode(&session.wire) {
            let _ = session.write_line(Command::Initialize, &line);
        }
        session.state = SessionState::Ready;

        Ok(session)
    }

    /// Read the board the engine prints on startup. Writes nothing.
    pub fn get_initial_board(&mut self) -> Result<Snapshot, ExchangeError> {
        self.exchange(Command::Initialize)
    }

    /// Select the piece at `(row, col)`.
    ///
    /// With [`SelectResponse::HighlightThenClear`](crate::types::SelectResponse)
    /// the engine prints two blocks; the highlighted one is returned and the
    /// second is read and dropped.
    pub fn select_piece(&mut self, row: i32, col: i32) -> Result<Snapshot, ExchangeError> {
        self.exchange(Command::SelectPiece { row, col })
    }

    /// Move the selected piece to `(row, col)`.
    pub fn move_piece(&mut self, row: i32, col: i32) -> Result<Snapshot, ExchangeError> {
        self.exchange(Command::MovePiece { row, col })
    }

    /// Ask the engine to terminate, kill it if it lingers, and wait for it to
    /// exit. Calling again is a no-op.
    pub fn close(&mut self) -> Result<()> {
        if self.state == SessionState::Closed {
            return Ok(());
        }
        self.state = SessionState::Closed;

        {
            let _guard = self.runtime.enter();
            drop(self.stdin.take());
        }

        let status = self
            .runtime
            .block_on(terminate(&mut self.child))
            .with_context(|| format!("failed waiting for {} to exit", self.program.display()))?;

        if let Some(reader) = self.reader.take() {
            let _ = self
                .runtime
                .block_on(async { tokio::time::timeout(READER_SHUTDOWN, reader).await });
        }

        self.sink.emit(&Diagnostic::Exited {
            code: status.code(),
        });
        Ok(())
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// OS process id, while the process has not been reaped.
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Non-blocking check whether the engine process is still alive.
    pub fn is_running(&mut self) -> bool {
        let _guard = self.runtime.enter();
        matches!(self.child.try_wait(), Ok(None))
    }

    /// Drop output lines that are already queued, without waiting.
    ///
    /// Unsolicited engine output is otherwise attributed to the next
    /// exchange. Returns how many lines were dropped.
    pub fn discard_pending(&mut self) -> usize {
        self.queue.drain()
    }

    fn exchange(&mut self, command: Command) -> Result<Snapshot, ExchangeError> {
        let result = if self.state == SessionState::Closed {
            Err(ExchangeError::SessionClosed)
        } else {
            self.state = SessionState::AwaitingResponse;
            let result = self.run_exchange(command);
            self.state = SessionState::Ready;
            result
        };

        if let Err(e) = &result {
            self.sink.emit(&Diagnostic::Incomplete {
                operation: command.as_str(),
                reason: e.to_string(),
            });
        }
        result
    }

    fn run_exchange(&mut self, command: Command) -> Result<Snapshot, ExchangeError> {
        // The handshake for Initialize went out at spawn time.
        if !matches!(command, Command::Initialize) {
            if let Some(line) = command.encode(&self.wire) {
                self.write_line(command, &line)?;
            }
        }

        let blocks = match command {
            Command::SelectPiece { .. } => self.config.select_response.block_count(),
            _ => 1,
        };

        let snapshot = self.collect().into_snapshot()?;
        for _ in 1..blocks {
            self.collect().into_snapshot()?;
            self.sink.emit(&Diagnostic::BlockDiscarded {
                operation: command.as_str(),
            });
        }
        Ok(snapshot)
    }

    fn collect(&mut self) -> Collected {
        let timeout = self.config.line_timeout();
        self.runtime.block_on(collect_block(
            &mut self.queue,
            BLOCK_LINES,
            timeout,
            self.sink.as_ref(),
        ))
    }

    fn write_line(&mut self, command: Command, line: &str) -> Result<(), ExchangeError> {
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(ExchangeError::SessionClosed);
        };

        let mut bytes = Vec::with_capacity(line.len() + 1);
        bytes.extend_from_slice(line.as_bytes());
        bytes.push(b'\n');

        let written = self.runtime.block_on(async {
            stdin.write_all(&bytes).await?;
            stdin.flush().await
        });

        match written {
            Ok(()) => {
                self.sink.emit(&Diagnostic::CommandSent {
                    command: command.as_str(),
                    line: line.to_string(),
                });
                Ok(())
            }
            Err(source) => {
                self.sink.emit(&Diagnostic::WriteFailed {
                    line: line.to_string(),
                    error: source.to_string(),
                });
                Err(ExchangeError::WriteFailure {
                    line: line.to_string(),
                    source,
                })
            }
        }
    }
}

/// SIGTERM first on Unix, SIGKILL once `TERMINATE_GRACE` runs out.
async fn terminate(child: &mut Child) -> io::Result<ExitStatus> {
    if let Some(status) = child.try_wait()? {
        return Ok(status);
    }

    #[cfg(unix)]
    {
        if let Some(pid) = child.id() {
            // SAFETY: the child has not been reaped, so `pid` still names it.
            unsafe {
                libc::kill(pid as libc::pid_t, libc::SIGTERM);
            }
            if let Ok(status) = tokio::time::timeout(TERMINATE_GRACE, child.wait()).await {
                return status;
            }
        }
    }

    // Fails only when the child already exited; wait() still reports it.
    let _ = child.start_kill();
    child.wait().await
}

impl Drop for EngineSession {
    fn drop(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        {
            let _guard = self.runtime.enter();
            let _ = self.child.start_kill();
        }
        // Reap it here; the runtime goes away with the session.
        let _ = self.runtime.block_on(self.child.wait());
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::diagnostics::RecordingSink;
    use crate::types::CoordinateOrder;

    fn quick(order: CoordinateOrder) -> SessionConfig {
        SessionConfig {
            coordinate_order: order,
            line_timeout_ms: 200,
            ..SessionConfig::default()
        }
    }

    fn skipped_lines(sink: &RecordingSink) -> Vec<String> {
        sink.events()
            .into_iter()
            .filter_map(|e| match e {
                Diagnostic::LineSkipped { line } => Some(line),
                _ => None,
            })
            .collect()
    }

    // `cat` echoes each command back as a two-token line, which the
    // classifier drops and the sink records verbatim.
    #[test]
    fn coordinate_order_controls_wire_line() {
        for (order, expected) in [
            (CoordinateOrder::RowColumn, "5 1"),
            (CoordinateOrder::ColumnRow, "1 5"),
        ] {
            let sink = RecordingSink::new();
            let mut session =
                EngineSession::open_with("cat", quick(order), Arc::new(sink.clone())).unwrap();

            let result = session.move_piece(5, 1);
            assert!(matches!(
                result,
                Err(ExchangeError::Timeout { received: 0, .. })
            ));
            assert_eq!(skipped_lines(&sink), vec![expected.to_string()]);
            assert!(sink.contains(|e| *e
                == Diagnostic::CommandSent {
                    command: "move_piece",
                    line: expected.to_string()
                }));
            assert_eq!(session.state(), SessionState::Ready);

            session.close().unwrap();
        }
    }

    #[test]
    fn handshake_written_before_first_exchange() {
        let sink = RecordingSink::new();
        let config = SessionConfig {
            handshake: Some("3".to_string()),
            line_timeout_ms: 200,
            ..SessionConfig::default()
        };
        let mut session = EngineSession::open_with("cat", config, Arc::new(sink.clone())).unwrap();
        assert_eq!(session.state(), SessionState::Ready);

        assert!(session.get_initial_board().is_err());
        assert_eq!(skipped_lines(&sink), vec!["3".to_string()]);
        session.close().unwrap();
    }

    #[test]
    fn closed_session_rejects_operations() {
        let sink = RecordingSink::new();
        let mut session =
            EngineSession::open_with("cat", quick(CoordinateOrder::RowColumn), Arc::new(sink.clone()))
                .unwrap();
        assert!(session.is_running());
        assert!(session.id().is_some());

        session.close().unwrap();
        session.close().unwrap();
        assert_eq!(session.state(), SessionState::Closed);
        assert!(!session.is_running());

        assert!(matches!(
            session.select_piece(0, 0),
            Err(ExchangeError::SessionClosed)
        ));
        assert!(matches!(
            session.get_initial_board(),
            Err(ExchangeError::SessionClosed)
        ));
        assert_eq!(
            sink.events()
                .iter()
                .filter(|e| matches!(e, Diagnostic::Exited { .. }))
                .count(),
            1
        );
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn dropped_session_leaves_no_zombie() {
        let session = EngineSession::open_with(
            "cat",
            quick(CoordinateOrder::RowColumn),
            Arc::new(RecordingSink::new()),
        )
        .unwrap();
        let pid = session.id().unwrap();
        drop(session);

        let stat = std::fs::read_to_string(format!("/proc/{pid}/stat")).ok();
        let state = stat
            .as_deref()
            .and_then(|s| s.rsplit_once(')'))
            .and_then(|(_, rest)| rest.split_whitespace().next())
            .map(str::to_string);
        assert_ne!(state.as_deref(), Some("Z"), "engine {pid} left as a zombie");
    }

    fn sh(script: &str) -> SessionConfig {
        SessionConfig {
            args: vec!["-c".to_string(), script.to_string()],
            line_timeout_ms: 200,
            ..SessionConfig::default()
        }
    }

    #[test]
    fn close_lets_engine_handle_sigterm() {
        let sink = RecordingSink::new();
        let mut session = EngineSession::open_with(
            "sh",
            sh("trap 'exit 7' TERM; while :; do sleep 0.05; done"),
            Arc::new(sink.clone()),
        )
        .unwrap();
        // Give the shell time to install its trap.
        std::thread::sleep(Duration::from_millis(200));

        session.close().unwrap();
        assert!(sink.contains(|e| *e == Diagnostic::Exited { code: Some(7) }));
    }

    #[test]
    fn close_kills_engine_ignoring_sigterm() {
        let sink = RecordingSink::new();
        let mut session = EngineSession::open_with(
            "sh",
            sh("trap '' TERM; while :; do sleep 0.05; done"),
            Arc::new(sink.clone()),
        )
        .unwrap();
        std::thread::sleep(Duration::from_millis(200));

        let started = std::time::Instant::now();
        session.close().unwrap();
        assert!(started.elapsed() >= TERMINATE_GRACE);
        assert!(sink.contains(|e| *e == Diagnostic::Exited { code: None }));
        assert!(!session.is_running());
    }

    // `true` never reads stdin, so a handshake larger than the pipe buffer
    // can only finish with a broken pipe once it exits.
    #[test]
    fn failed_handshake_is_reported_not_fatal() {
        let sink = RecordingSink::new();
        let handshake = "x".repeat(1 << 20);
        let config = SessionConfig {
            handshake: Some(handshake.clone()),
            line_timeout_ms: 200,
            ..SessionConfig::default()
        };
        let mut session = EngineSession::open_with("true", config, Arc::new(sink.clone())).unwrap();
        assert_eq!(session.state(), SessionState::Ready);

        assert!(sink.contains(|e| matches!(e, Diagnostic::WriteFailed { line, .. } if *line == handshake)));
        assert!(!sink.contains(|e| matches!(e, Diagnostic::CommandSent { .. })));

        assert!(matches!(
            session.get_initial_board(),
            Err(ExchangeError::StreamClosed { received: 0, .. })
        ));
        session.close().unwrap();
    }

    #[test]
    fn missing_executable_fails_to_open() {
        let err = EngineSession::open("/nonexistent/engine-binary").err().unwrap();
        assert!(err.to_string().contains("failed to spawn engine"));
    }
}
