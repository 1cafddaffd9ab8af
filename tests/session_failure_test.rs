use std::sync::Arc;
use std::time::{Duration, Instant};

use chess_engine_adapter::{
    Diagnostic, EngineSession, ExchangeError, RecordingSink, SelectResponse, SessionConfig,
    SessionState,
};

const MOCK_ENGINE: &str = env!("CARGO_BIN_EXE_mock-engine");

fn open(args: &[&str], line_timeout_ms: u64) -> (EngineSession, RecordingSink) {
    let sink = RecordingSink::new();
    let config = SessionConfig {
        args: args.iter().map(|s| s.to_string()).collect(),
        line_timeout_ms,
        ..SessionConfig::default()
    };
    let session = EngineSession::open_with(MOCK_ENGINE, config, Arc::new(sink.clone()))
        .expect("spawn mock engine");
    (session, sink)
}

fn wait_for_exit(session: &mut EngineSession) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while session.is_running() {
        assert!(Instant::now() < deadline, "mock engine did not exit");
        std::thread::sleep(Duration::from_millis(20));
    }
}

#[test]
fn stalled_engine_times_out_with_partial_count() {
    let (mut session, sink) = open(&["--stall-after", "10"], 300);

    let err = session.get_initial_board().unwrap_err();
    assert!(matches!(
        err,
        ExchangeError::Timeout {
            received: 10,
            expected: 24
        }
    ));
    assert_eq!(session.state(), SessionState::Ready);
    assert!(sink.contains(|e| *e
        == Diagnostic::CollectTimedOut {
            received: 10,
            expected: 24
        }));
    assert!(sink.contains(|e| matches!(
        e,
        Diagnostic::Incomplete {
            operation: "initialize",
            ..
        }
    )));

    // Still usable: the next exchange is attempted and fails on its own terms.
    let err = session.select_piece(6, 4).unwrap_err();
    assert!(matches!(err, ExchangeError::Timeout { received: 0, .. }));

    session.close().unwrap();
}

#[test]
fn truncated_output_fails_without_waiting_for_timeout() {
    let (mut session, sink) = open(&["--truncate-after", "5"], 5_000);

    let started = Instant::now();
    let err = session.get_initial_board().unwrap_err();
    assert!(started.elapsed() < Duration::from_secs(4));
    assert!(matches!(
        err,
        ExchangeError::StreamClosed {
            received: 5,
            expected: 24
        }
    ));
    assert_eq!(err.code(), "stream_closed");
    assert!(sink.contains(|e| matches!(e, Diagnostic::ReaderStopped { lines: 5, .. })));

    session.close().unwrap();
}

#[test]
fn exited_engine_reports_write_failure_then_closed_stream() {
    let (mut session, sink) = open(&["--exit-after", "0"], 2_000);

    session.get_initial_board().unwrap();
    wait_for_exit(&mut session);

    let err = session.select_piece(6, 4).unwrap_err();
    assert!(matches!(err, ExchangeError::WriteFailure { ref line, .. } if line == "6 4"));
    assert!(sink.contains(|e| matches!(e, Diagnostic::WriteFailed { line, .. } if line == "6 4")));
    assert_eq!(session.state(), SessionState::Ready);

    let err = session.get_initial_board().unwrap_err();
    assert!(matches!(err, ExchangeError::StreamClosed { received: 0, .. }));

    session.close().unwrap();
}

#[test]
fn engine_exit_between_exchanges() {
    let (mut session, _sink) = open(&["--exit-after", "1"], 2_000);

    session.get_initial_board().unwrap();
    session.select_piece(6, 4).unwrap();
    wait_for_exit(&mut session);

    assert!(session.move_piece(4, 4).is_err());
    session.close().unwrap();
}

#[test]
fn missing_executable_is_a_spawn_error() {
    let err = EngineSession::open_with(
        "/definitely/not/an/engine",
        SessionConfig::default(),
        Arc::new(RecordingSink::new()),
    )
    .err()
    .expect("spawn should fail");
    assert!(format!("{err:#}").contains("/definitely/not/an/engine"));
}

#[test]
fn discard_pending_drops_unsolicited_output() {
    let (mut session, _sink) = open(&["--noise"], 2_000);

    session.get_initial_board().unwrap();
    // The trailing debug line and prompt are still queued.
    std::thread::sleep(Duration::from_millis(300));
    assert_eq!(session.discard_pending(), 2);
    assert_eq!(session.discard_pending(), 0);

    let selected = session.select_piece(6, 4).unwrap();
    assert_eq!(selected.highlights.cell(6, 4), Some("1"));

    session.close().unwrap();
}

#[test]
fn bad_coordinates_time_out_without_poisoning_session() {
    let (mut session, _sink) = open(&[], 300);
    session.get_initial_board().unwrap();

    // Engine answers out-of-range input with a single chatter line.
    let err = session.select_piece(9, 9).unwrap_err();
    assert_eq!(err.received(), 0);

    let selected = session.select_piece(7, 1).unwrap();
    assert_eq!(selected.highlights.cell(7, 1), Some("1"));

    session.close().unwrap();
}

#[test]
fn incomplete_highlight_block_skips_second_wait() {
    let sink = RecordingSink::new();
    let config = SessionConfig {
        args: ["--double-select", "--stall-after", "36", "--resume-after-ms", "800"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        select_response: SelectResponse::HighlightThenClear,
        line_timeout_ms: 200,
        ..SessionConfig::default()
    };
    let mut session = EngineSession::open_with(MOCK_ENGINE, config, Arc::new(sink.clone()))
        .expect("spawn mock engine");
    session.get_initial_board().unwrap();

    // The engine goes quiet halfway through the highlighted block.
    let started = Instant::now();
    let err = session.select_piece(6, 4).unwrap_err();
    assert!(matches!(
        err,
        ExchangeError::Timeout {
            received: 12,
            expected: 24
        }
    ));
    assert!(started.elapsed() < Duration::from_millis(700));
    assert!(!sink.contains(|e| matches!(e, Diagnostic::BlockDiscarded { .. })));

    // The rest of the highlighted block and the cleared block arrive late
    // and stay queued until discarded.
    std::thread::sleep(Duration::from_millis(1_200));
    assert_eq!(session.discard_pending(), 36);

    let moved = session.move_piece(4, 4).unwrap();
    assert_eq!(moved.board.cell(4, 4), Some("P"));
    assert_eq!(moved.board.cell(6, 4), Some("."));

    session.close().unwrap();
}
