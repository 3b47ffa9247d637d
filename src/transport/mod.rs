//! Sources of solver output.
//!
//! A [`Transport`] knows how to fetch a trace for a puzzle and push raw
//! frames or documents into a channel. A [`Connection`] runs one transport
//! in a background task and is the only handle to it: dropping the
//! connection stops the task and discards anything it would still send.

mod batch;
mod connection;
mod file;
mod scripted;
mod sse;

pub use batch::BatchTransport;
pub use connection::Connection;
pub use file::FileTransport;
pub use scripted::ScriptedTransport;
pub use sse::{SseDecoder, SseTransport};

use async_trait::async_trait;
use derive_more::{Display, Error};
use reqwest::header::ACCEPT;
use serde::Serialize;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, instrument, warn};

use crate::Puzzle;

/// Longest server error body kept in an error message.
pub const ERROR_BODY_LIMIT: usize = 100;

/// How long the backend health check waits for an answer.
pub const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(3);

/// What the viewer last learned about the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    /// Not checked yet.
    #[default]
    Unknown,
    /// A health check is in flight.
    Checking,
    /// The last health check succeeded.
    Connected,
    /// The last health check failed.
    Disconnected,
}

/// Something a transport delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// One streaming message, undecoded.
    Frame(String),
    /// One complete batch document, undecoded.
    Document(String),
    /// The health check succeeded.
    Reachable,
    /// The health check failed; carries a user-facing message.
    Unreachable(String),
    /// The source finished normally.
    Closed,
    /// The source failed; carries a user-facing message.
    Failed(String),
}

/// A source of solver output for a puzzle.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// Fetches the trace for `puzzle`, sending frames or a document to
    /// `sink` in arrival order. Returning ends the source.
    async fn run(
        &self,
        puzzle: Puzzle,
        sink: UnboundedSender<TransportEvent>,
    ) -> Result<(), TransportError>;

    /// Checks that the source can serve a trace before one is requested.
    ///
    /// Local sources are always reachable.
    async fn probe(&self) -> Result<(), TransportError> {
        Ok(())
    }

    /// Short human-readable description of where traces come from.
    fn describe(&self) -> String;
}

/// Sends one event, failing once the receiving connection is gone.
pub(crate) fn emit(
    sink: &UnboundedSender<TransportEvent>,
    event: TransportEvent,
) -> Result<(), TransportError> {
    sink.send(event)
        .map_err(|_| TransportError::new(TransportErrorKind::Released))
}

/// `GET {api_url}` with [`HEALTH_CHECK_TIMEOUT`]; any success status
/// means the backend is up.
#[instrument(skip(client))]
pub(crate) async fn check_backend(
    client: &reqwest::Client,
    api_url: &str,
) -> Result<(), TransportError> {
    let response = client
        .get(api_url)
        .header(ACCEPT, "application/json")
        .timeout(HEALTH_CHECK_TIMEOUT)
        .send()
        .await
        .map_err(|e| health_error(e, api_url))?;

    let status = response.status();
    if status.is_success() {
        debug!(status = status.as_u16(), "Backend reachable");
        Ok(())
    } else {
        warn!(status = status.as_u16(), "Backend unhealthy");
        Err(TransportError::new(TransportErrorKind::Unhealthy(status.as_u16())))
    }
}

#[track_caller]
fn health_error(err: reqwest::Error, api_url: &str) -> TransportError {
    let kind = if err.is_timeout() {
        TransportErrorKind::TimedOut(api_url.to_string())
    } else if err.is_connect() {
        TransportErrorKind::Unreachable(api_url.to_string())
    } else {
        TransportErrorKind::Request(err.to_string())
    };
    TransportError::new(kind)
}

/// Builds `{base}/{path}?word1=..&word2=..&word3=..`.
pub(crate) fn solver_url(
    base: &str,
    path: &str,
    puzzle: &Puzzle,
) -> Result<reqwest::Url, TransportError> {
    let url = format!("{}/{}", base.trim_end_matches('/'), path);
    let [first, second, result] = puzzle.words();
    reqwest::Url::parse_with_params(&url, [("word1", first), ("word2", second), ("word3", result)])
        .map_err(|e| TransportError::new(TransportErrorKind::InvalidUrl(format!("{}: {}", url, e))))
}

/// Cuts a server error body down to [`ERROR_BODY_LIMIT`] characters.
pub(crate) fn truncate_body(body: &str) -> String {
    let body = body.trim();
    if body.chars().count() <= ERROR_BODY_LIMIT {
        body.to_string()
    } else {
        let cut: String = body.chars().take(ERROR_BODY_LIMIT).collect();
        format!("{}...", cut)
    }
}

/// Why a transport stopped.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum TransportErrorKind {
    /// The solver URL could not be built.
    #[display("Invalid solver URL {}", _0)]
    InvalidUrl(String),
    /// The HTTP request failed.
    #[display("Request failed: {}", _0)]
    Request(String),
    /// The server answered with an error status.
    #[display("Server error: {} - {}", code, body)]
    Status {
        /// HTTP status code.
        code: u16,
        /// Truncated response body.
        body: String,
    },
    /// Nothing answered at the backend address.
    #[display("Cannot connect to backend at {}. Make sure the server is running.", _0)]
    Unreachable(String),
    /// The backend did not answer the health check in time.
    #[display("Connection to {} timed out. Check if the server is running.", _0)]
    TimedOut(String),
    /// The backend answered the health check with an error status.
    #[display("Backend server returned status {}", _0)]
    Unhealthy(u16),
    /// Reading a local trace failed.
    #[display("I/O error: {}", _0)]
    Io(String),
    /// The connection was released while the transport was still sending.
    #[display("Connection released")]
    Released,
}

/// Transport error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Transport error: {} at {}:{}", kind, file, line)]
pub struct TransportError {
    /// What went wrong.
    pub kind: TransportErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl TransportError {
    /// Creates a new transport error with caller location tracking.
    #[track_caller]
    #[instrument(skip(kind))]
    pub fn new(kind: TransportErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// True if the transport stopped only because nobody was listening.
    pub fn is_released(&self) -> bool {
        self.kind == TransportErrorKind::Released
    }
}

impl From<reqwest::Error> for TransportError {
    #[track_caller]
    fn from(err: reqwest::Error) -> Self {
        Self::new(TransportErrorKind::Request(err.to_string()))
    }
}

impl From<std::io::Error> for TransportError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        Self::new(TransportErrorKind::Io(err.to_string()))
    }
}
