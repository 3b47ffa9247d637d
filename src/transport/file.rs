//! Recorded traces read from disk.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, instrument};

use super::{Transport, TransportError, TransportEvent, emit};
use crate::Puzzle;

/// Replays a trace file.
///
/// A `.json` file is one batch document. Any other file is read as one
/// streaming frame per non-blank line; a leading `data:` is stripped so
/// captured event streams can be used unchanged.
#[derive(Debug, Clone)]
pub struct FileTransport {
    path: PathBuf,
    delay: Option<Duration>,
}

impl FileTransport {
    /// Creates a transport for the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delay: None,
        }
    }

    /// Waits `delay` before each frame.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = (!delay.is_zero()).then_some(delay);
        self
    }

    /// The trace file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True if the file is read as a single document.
    pub fn is_document(&self) -> bool {
        self.path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
    }

    /// Reads the whole file into events, without delays.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read_events(&self) -> Result<Vec<TransportEvent>, TransportError> {
        let text = std::fs::read_to_string(&self.path)?;
        Ok(self.events_from(text))
    }

    fn events_from(&self, text: String) -> Vec<TransportEvent> {
        if self.is_document() {
            return vec![TransportEvent::Document(text)];
        }
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with(':'))
            .map(|line| line.strip_prefix("data:").map(str::trim).unwrap_or(line))
            .map(|frame| TransportEvent::Frame(frame.to_string()))
            .collect()
    }
}

#[async_trait]
impl Transport for FileTransport {
    #[instrument(skip(self, puzzle, sink), fields(path = %self.path.display()))]
    async fn run(
        &self,
        puzzle: Puzzle,
        sink: UnboundedSender<TransportEvent>,
    ) -> Result<(), TransportError> {
        let text = tokio::fs::read_to_string(&self.path).await?;
        let events = self.events_from(text);
        info!(events = events.len(), %puzzle, "Replaying trace file");

        for event in events {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            emit(&sink, event)?;
        }
        debug!("Trace file exhausted");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_lines_become_frames() {
        let mut file = tempfile::Builder::new()
            .suffix(".jsonl")
            .tempfile()
            .expect("temp file");
        writeln!(file, "{{\"equations\": []}}").expect("write");
        writeln!(file).expect("write");
        writeln!(file, ": comment").expect("write");
        writeln!(file, "data: {{\"done\": true}}").expect("write");

        let events = FileTransport::new(file.path()).read_events().expect("readable");
        assert_eq!(
            events,
            vec![
                TransportEvent::Frame(r#"{"equations": []}"#.to_string()),
                TransportEvent::Frame(r#"{"done": true}"#.to_string()),
            ]
        );
    }

    #[test]
    fn test_json_file_is_one_document() {
        let mut file = tempfile::Builder::new()
            .suffix(".json")
            .tempfile()
            .expect("temp file");
        write!(file, "{{\n  \"progressSteps\": []\n}}").expect("write");

        let transport = FileTransport::new(file.path());
        assert!(transport.is_document());
        let events = transport.read_events().expect("readable");
        assert!(matches!(events.as_slice(), [TransportEvent::Document(_)]));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = FileTransport::new("/nonexistent/trace.jsonl")
            .read_events()
            .unwrap_err();
        assert!(matches!(err.kind, super::super::TransportErrorKind::Io(_)));
    }
}
