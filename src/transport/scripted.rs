//! In-memory transport for demos and tests.

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, instrument};

use super::{Transport, TransportError, TransportErrorKind, TransportEvent, emit};
use crate::Puzzle;

/// Sends a fixed list of events, whatever the puzzle.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
    events: Vec<TransportEvent>,
    delay: Option<Duration>,
    failure: Option<String>,
    probe_failure: Option<TransportErrorKind>,
    hold_open: bool,
}

impl ScriptedTransport {
    /// A stream of frames.
    pub fn frames<I, S>(frames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            events: frames
                .into_iter()
                .map(|f| TransportEvent::Frame(f.into()))
                .collect(),
            ..Self::default()
        }
    }

    /// A single batch document.
    pub fn document(document: impl Into<String>) -> Self {
        Self {
            events: vec![TransportEvent::Document(document.into())],
            ..Self::default()
        }
    }

    /// Waits `delay` before each event.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Fails with `message` after the last event.
    pub fn failing_with(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Fails the health check with `kind`, so no event is ever sent.
    pub fn unreachable(mut self, kind: TransportErrorKind) -> Self {
        self.probe_failure = Some(kind);
        self
    }

    /// Never finishes after the last event, like a stalled server.
    pub fn held_open(mut self) -> Self {
        self.hold_open = true;
        self
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    #[instrument(skip(self, puzzle, sink), fields(events = self.events.len()))]
    async fn run(
        &self,
        puzzle: Puzzle,
        sink: UnboundedSender<TransportEvent>,
    ) -> Result<(), TransportError> {
        debug!(%puzzle, "Playing script");
        for event in &self.events {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            emit(&sink, event.clone())?;
        }
        if let Some(message) = &self.failure {
            return Err(TransportError::new(TransportErrorKind::Request(message.clone())));
        }
        if self.hold_open {
            debug!("Holding scripted connection open");
            std::future::pending::<()>().await;
        }
        Ok(())
    }

    async fn probe(&self) -> Result<(), TransportError> {
        match &self.probe_failure {
            Some(kind) => Err(TransportError::new(kind.clone())),
            None => Ok(()),
        }
    }

    fn describe(&self) -> String {
        format!("script of {} events", self.events.len())
    }
}
