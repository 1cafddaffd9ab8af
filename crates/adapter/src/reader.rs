//! Background reader for the engine's output stream.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::queue::LineSender;

/// Read `stream` line by line into `sender` until end-of-stream.
///
/// Lines are decoded lossily and stripped of trailing whitespace. A read
/// error ends the loop the same way end-of-stream does. Returns the number of
/// lines forwarded; the sender is dropped on return, which is how the
/// consumer learns the stream is gone.
pub async fn read_lines<R>(stream: R, sender: LineSender, sink: Arc<dyn DiagnosticSink>) -> usize
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stream);
    let mut buf: Vec<u8> = Vec::with_capacity(256);
    let mut forwarded = 0usize;

    let error = loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break None,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                sender.push(line.trim_end().to_owned());
                forwarded += 1;
            }
            Err(e) => break Some(e.to_string()),
        }
    };

    sink.emit(&Diagnostic::ReaderStopped {
        lines: forwarded,
        error,
    });
    forwarded
}

/// Run [`read_lines`] as a task on `handle`.
pub fn spawn_output_reader<R>(
    handle: &Handle,
    stream: R,
    sender: LineSender,
    sink: Arc<dyn DiagnosticSink>,
) -> JoinHandle<usize>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    handle.spawn(read_lines(stream, sender, sink))
}
