//! Write side of a turn's output channel.

use crate::events::{Envelope, Event};
use scout_core::{AppError, AppResult};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;

/// Create a sink for `turn` and the receiver that drains it.
pub fn event_channel(turn: u64, capacity: usize) -> (EventSink, mpsc::Receiver<Envelope>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (EventSink::new(turn, tx), rx)
}

/// Ordered, turn-tagged event writer.
///
/// Events are delivered in the order they are emitted. Once the receiving
/// side is gone every further write is dropped and reported as
/// [`AppError::Cancelled`], so the producer can stop early.
#[derive(Debug)]
pub struct EventSink {
    turn: u64,
    tx: mpsc::Sender<Envelope>,
    closed: AtomicBool,
}

impl EventSink {
    pub fn new(turn: u64, tx: mpsc::Sender<Envelope>) -> Self {
        Self {
            turn,
            tx,
            closed: AtomicBool::new(false),
        }
    }

    pub fn turn(&self) -> u64 {
        self.turn
    }

    /// Whether the receiver has gone away.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Relaxed) || self.tx.is_closed()
    }

    /// Write one event.
    pub async fn emit(&self, event: Event) -> AppResult<()> {
        if self.is_closed() {
            return Err(AppError::Cancelled);
        }

        let kind = event.kind();
        let envelope = Envelope {
            turn: self.turn,
            event,
        };

        if self.tx.send(envelope).await.is_err() {
            self.closed.store(true, Ordering::Relaxed);
            tracing::debug!(turn = self.turn, event = kind, "Receiver dropped, discarding event");
            return Err(AppError::Cancelled);
        }

        Ok(())
    }

    /// Run `work` until it finishes or the receiver goes away, whichever
    /// comes first. `work` is dropped in the second case.
    pub async fn until_closed<F, T>(&self, work: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        if self.is_closed() {
            return Err(AppError::Cancelled);
        }

        tokio::select! {
            result = work => result,
            _ = self.tx.closed() => {
                self.closed.store(true, Ordering::Relaxed);
                Err(AppError::Cancelled)
            }
        }
    }
}
