//! Whole-trace fetch from the solver's `/api/run-solver` endpoint.

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, instrument};

use super::{
    Transport, TransportError, TransportErrorKind, TransportEvent, check_backend, emit, solver_url,
    truncate_body,
};
use crate::Puzzle;

/// Fetches a complete trace as one JSON document.
#[derive(Debug, Clone)]
pub struct BatchTransport {
    api_url: String,
    client: reqwest::Client,
}

impl BatchTransport {
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

    /// Document URL for `puzzle`.
    pub fn endpoint(&self, puzzle: &Puzzle) -> Result<reqwest::Url, TransportError> {
        solver_url(&self.api_url, "api/run-solver", puzzle)
    }
}

/// Error message from a failed response body.
///
/// JSON bodies with an `error` string use it whole; anything else is
/// truncated.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| json.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| truncate_body(body))
}

#[async_trait]
impl Transport for BatchTransport {
    #[instrument(skip(self, sink), fields(puzzle = %puzzle))]
    async fn run(
        &self,
        puzzle: Puzzle,
        sink: UnboundedSender<TransportEvent>,
    ) -> Result<(), TransportError> {
        let url = self.endpoint(&puzzle)?;
        info!(%url, "Requesting trace document");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(TransportError::new(TransportErrorKind::Status {
                code: status.as_u16(),
                body: error_message(&body),
            }));
        }

        debug!(bytes = body.len(), "Trace document received");
        emit(&sink, TransportEvent::Document(body))
    }

    async fn probe(&self) -> Result<(), TransportError> {
        check_backend(&self.client, &self.api_url).await
    }

    fn describe(&self) -> String {
        format!("batch {}/api/run-solver", self.api_url.trim_end_matches('/'))
    }
}
