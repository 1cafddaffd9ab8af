//! Line queue between the output reader and the block assembler.
//!
//! Single producer, single consumer, unbounded. Pushing never blocks; popping
//! waits up to a caller-supplied timeout.

use std::time::Duration;

use tokio::sync::mpsc;

/// Result of one [`LineQueue::pop`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Popped {
    Line(String),
    /// Nothing arrived within the timeout.
    TimedOut,
    /// The producer is gone and every queued line has been consumed.
    Closed,
}

/// Producer half, owned by the output reader.
#[derive(Debug)]
pub struct LineSender {
    tx: mpsc::UnboundedSender<String>,
}

impl LineSender {
    /// Queue a line. Lines pushed after the consumer is dropped are discarded.
    pub fn push(&self, line: String) {
        let _ = self.tx.send(line);
    }
}

/// Consumer half, owned by the session.
#[derive(Debug)]
pub struct LineQueue {
    rx: mpsc::UnboundedReceiver<String>,
}

impl LineQueue {
    pub async fn pop(&mut self, timeout: Duration) -> Popped {
        match tokio::time::timeout(timeout, self.rx.recv()).await {
            Ok(Some(line)) => Popped::Line(line),
            Ok(None) => Popped::Closed,
            Err(_) => Popped::TimedOut,
        }
    }

    /// Discard everything already queued without waiting. Returns the count.
    pub fn drain(&mut self) -> usize {
        let mut discarded = 0;
        while self.rx.try_recv().is_ok() {
            discarded += 1;
        }
        discarded
    }
}

pub fn line_queue() -> (LineSender, LineQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    (LineSender { tx }, LineQueue { rx })
}
