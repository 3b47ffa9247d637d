//! The single live connection to a transport.

use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use super::{Transport, TransportEvent};
use crate::Puzzle;

/// A running transport task and the receiving end of its events.
///
/// Dropping the connection aborts the task and closes the channel, so
/// nothing the transport sends afterwards can be observed.
///
/// Every connection starts with the transport's health check and reports
/// it as [`TransportEvent::Reachable`] or [`TransportEvent::Unreachable`].
/// A failed check ends the connection. Otherwise a solving connection
/// goes on to end with [`TransportEvent::Closed`] or
/// [`TransportEvent::Failed`] unless it was dropped first.
#[derive(Debug)]
pub struct Connection {
    id: u64,
    task: JoinHandle<()>,
    events: UnboundedReceiver<TransportEvent>,
}

/// Runs the health check, reporting the result. True if it passed.
async fn probe(id: u64, transport: &dyn Transport, sink: &UnboundedSender<TransportEvent>) -> bool {
    let event = match transport.probe().await {
        Ok(()) => TransportEvent::Reachable,
        Err(e) => {
            warn!(id, error = %e, "Health check failed");
            TransportEvent::Unreachable(e.kind.to_string())
        }
    };
    let passed = event == TransportEvent::Reachable;
    // The receiver may already be gone.
    let _ = sink.send(event);
    passed
}

impl Connection {
    /// Spawns `transport` for `puzzle` on the current runtime.
    ///
    /// Nothing is requested for the puzzle unless the health check passes.
    #[instrument(skip(transport, puzzle), fields(source = %transport.describe(), puzzle = %puzzle))]
    pub fn open(id: u64, transport: Arc<dyn Transport>, puzzle: Puzzle) -> Self {
        info!(id, "Opening connection");
        let (sink, events) = mpsc::unbounded_channel();
        let task = tokio::spawn(async move {
            if !probe(id, transport.as_ref(), &sink).await {
                return;
            }
            let last = match transport.run(puzzle, sink.clone()).await {
                Ok(()) => TransportEvent::Closed,
                Err(e) if e.is_released() => {
                    debug!(id, "Transport stopped after release");
                    return;
                }
                Err(e) => {
                    warn!(id, error = %e, "Transport failed");
                    TransportEvent::Failed(e.kind.to_string())
                }
            };
            let _ = sink.send(last);
        });
        Self { id, task, events }
    }

    /// Spawns only the health check of `transport`.
    #[instrument(skip(transport), fields(source = %transport.describe()))]
    pub fn check(id: u64, transport: Arc<dyn Transport>) -> Self {
        info!(id, "Checking backend");
        let (sink, events) = mpsc::unbounded_channel();
        let task = tokio::spawn(async move {
            probe(id, transport.as_ref(), &sink).await;
        });
        Self { id, task, events }
    }

    /// Identifier given at open time.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Waits for the next event. `None` once the task is gone and every
    /// event has been read.
    pub async fn next_event(&mut self) -> Option<TransportEvent> {
        self.events.recv().await
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        debug!(id = self.id, "Releasing connection");
        self.events.close();
        if !self.task.is_finished() {
            self.task.abort();
        }
    }
}
