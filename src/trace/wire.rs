//! JSON shapes emitted by the solver service.
//!
//! These types mirror the wire format loosely; every field is optional and
//! untyped where the service is inconsistent. Narrowing to [`StepRecord`]
//! happens in the ingestor.
//!
//! [`StepRecord`]: crate::StepRecord

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::trace;

use super::{IngestError, IngestErrorKind};

/// One progress event as sent by the solver.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireStep {
    /// Free text.
    #[serde(default)]
    pub message: String,
    /// Step type tag.
    pub step_type: Option<String>,
    /// Variable key of an explicit assignment.
    pub assign: Option<String>,
    /// Digit of an explicit assignment.
    pub value: Option<Value>,
    /// Cumulative variable-to-digit mapping.
    pub mapping: Option<BTreeMap<String, Value>>,
    /// Letter being considered.
    pub current_letter: Option<String>,
    /// Pre-extracted equation, present in batch documents.
    pub equation: Option<String>,
    /// Milliseconds since the Unix epoch.
    pub timestamp: Option<i64>,
}

/// One entry of a batch document's `assignments` array.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WireAssignment {
    /// Variable key.
    pub letter: String,
    /// Digit.
    pub value: Value,
}

/// A complete trace delivered in one response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireBatch {
    /// Column equations.
    pub equations: Option<Vec<String>>,
    /// Every step, in order.
    pub progress_steps: Option<Vec<WireStep>>,
    /// Explicit assignment list; overrides derivation when non-empty.
    pub assignments: Option<Vec<WireAssignment>>,
    /// Final answer.
    pub solution: Option<BTreeMap<String, Value>>,
}

impl WireBatch {
    /// Parses a batch document.
    pub fn decode(document: &str) -> Result<Self, IngestError> {
        serde_json::from_str(document).map_err(malformed)
    }
}

/// A single streaming frame, classified.
#[derive(Debug, Clone, PartialEq)]
pub enum WireMessage {
    /// The column equations.
    Equations(Vec<String>),
    /// End of stream with the final assignments.
    Done(BTreeMap<String, Value>),
    /// A progress step.
    Step(WireStep),
}

impl WireMessage {
    /// Decodes and classifies one frame.
    ///
    /// Classification checks `equations`, then `done`, then `message`, in
    /// that order; the first one present wins.
    pub fn decode(frame: &str) -> Result<Self, IngestError> {
        let value: Value = serde_json::from_str(frame).map_err(malformed)?;
        let Value::Object(mut object) = value else {
            return Err(IngestError::new(IngestErrorKind::UnknownShape));
        };

        if let Some(equations) = object.remove("equations").filter(|v| !v.is_null()) {
            trace!("Frame classified as equations");
            let equations = serde_json::from_value(equations).map_err(malformed)?;
            return Ok(Self::Equations(equations));
        }

        if object.get("done").and_then(Value::as_bool) == Some(true) {
            trace!("Frame classified as done");
            let assignments = match object.remove("assignments") {
                None | Some(Value::Null) => BTreeMap::new(),
                Some(assignments) => serde_json::from_value(assignments).map_err(malformed)?,
            };
            return Ok(Self::Done(assignments));
        }

        if object.get("message").is_some_and(|m| !m.is_null()) {
            trace!("Frame classified as step");
            let step = serde_json::from_value(Value::Object(object)).map_err(malformed)?;
            return Ok(Self::Step(step));
        }

        Err(IngestError::new(IngestErrorKind::UnknownShape))
    }
}

#[track_caller]
fn malformed(err: serde_json::Error) -> IngestError {
    IngestError::new(IngestErrorKind::MalformedJson(err.to_string()))
}
