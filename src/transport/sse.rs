//! Server-sent event stream from the solver's `/solve` endpoint.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::ACCEPT;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, instrument, trace};

use super::{
    Transport, TransportError, TransportErrorKind, TransportEvent, check_backend, emit, solver_url,
    truncate_body,
};
use crate::Puzzle;

/// Incremental decoder for `text/event-stream` bodies.
///
/// Only `data:` fields are kept. Consecutive data lines are joined with a
/// newline and dispatched at the blank line that ends the event.
#[derive(Debug, Clone, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    data: Vec<String>,
}

impl SseDecoder {
    /// Creates an empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds raw bytes, returning every event payload they complete.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);
        let mut payloads = Vec::new();
        while let Some(end) = self.buffer.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=end).collect();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches(['\n', '\r']);
            if let Some(payload) = self.line(line) {
                payloads.push(payload);
            }
        }
        payloads
    }

    /// Flushes an event left open when the stream ended.
    pub fn finish(&mut self) -> Option<String> {
        if !self.buffer.is_empty() {
            let raw = std::mem::take(&mut self.buffer);
            let line = String::from_utf8_lossy(&raw).trim_end_matches('\r').to_string();
            if let Some(payload) = self.line(&line) {
                return Some(payload);
            }
        }
        self.dispatch()
    }

    fn line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            return self.dispatch();
        }
        if let Some(value) = line.strip_prefix("data:") {
            let value = value.strip_prefix(' ').unwrap_or(value);
            self.data.push(value.to_string());
        } else {
            trace!(line, "Skipping non-data line");
        }
        None
    }

    fn dispatch(&mut self) -> Option<String> {
        if self.data.is_empty() {
            return None;
        }
        let payload = self.data.join("\n");
        self.data.clear();
        Some(payload)
    }
}

/// Streams a trace from `GET {api_url}/solve`.
#[derive(Debug, Clone)]
pub struct SseTransport {
    api_url: String,
    client: reqwest::Client,
}

impl SseTransport {
    /// Creates a transport for the solver at `api_url`.
    #[instrument(skip(api_url), fields(api_url = %api_url.as_ref()))]
    pub fn new(api_url: impl AsRef<str>, connect_timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()?;
        Ok(Self {
            api_url: api_url.as_ref().to_string(),
            client,
        })
    }

    /// Stream URL for `puzzle`.
    pub fn endpoint(&self, puzzle: &Puzzle) -> Result<reqwest::Url, TransportError> {
        solver_url(&self.api_url, "solve", puzzle)
    }
}

#[async_trait]
impl Transport for SseTransport {
    #[instrument(skip(self, sink), fields(puzzle = %puzzle))]
    async fn run(
        &self,
        puzzle: Puzzle,
        sink: UnboundedSender<TransportEvent>,
    ) -> Result<(), TransportError> {
        let url = self.endpoint(&puzzle)?;
        info!(%url, "Opening event stream");

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "text/event-stream")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::new(TransportErrorKind::Status {
                code: status.as_u16(),
                body: truncate_body(&body),
            }));
        }

        let mut decoder = SseDecoder::new();
        let mut frames = 0usize;
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            for payload in decoder.push(&chunk) {
                frames += 1;
                emit(&sink, TransportEvent::Frame(payload))?;
            }
        }
        if let Some(payload) = decoder.finish() {
            frames += 1;
            emit(&sink, TransportEvent::Frame(payload))?;
        }

        debug!(frames, "Event stream ended");
        Ok(())
    }

    async fn probe(&self) -> Result<(), TransportError> {
        check_backend(&self.client, &self.api_url).await
    }

    fn describe(&self) -> String {
        format!("stream {}/solve", self.api_url.trim_end_matches('/'))
    }
}
