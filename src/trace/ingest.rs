//! Event ingestion: raw solver output into an append-only trace.

use chrono::{DateTime, Utc};
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};

use super::wire::{WireAssignment, WireBatch, WireMessage, WireStep};
use super::{Assignment, Outcome, Solution, StepKind, StepLog, StepRecord};
use crate::Variable;

/// Everything known about one solve's trace.
#[derive(Debug, Clone, Default, Getters, Serialize)]
pub struct Trace {
    /// Ingested steps in arrival order.
    log: StepLog,
    /// Column equations, set at most once.
    equations: Option<Vec<String>>,
    /// Final answer, set at most once.
    solution: Option<Solution>,
    /// Assignment list supplied verbatim by a batch document.
    explicit_assignments: Option<Vec<Assignment>>,
    /// Terminal status.
    outcome: Outcome,
    /// True once the source signalled completion.
    complete: bool,
}

impl Trace {
    /// The ordered assignment list for the whole trace.
    ///
    /// An explicit list from a batch document wins; otherwise the list is
    /// derived from the steps exactly as replay derives it.
    pub fn assignments(&self) -> Vec<Assignment> {
        match &self.explicit_assignments {
            Some(explicit) => explicit.clone(),
            None => crate::replay::derive_assignments(&self.log),
        }
    }

    /// Equations as a slice, empty if none were received.
    pub fn equation_list(&self) -> &[String] {
        self.equations.as_deref().unwrap_or_default()
    }
}

/// What a single ingested input produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ingested {
    /// The equations were set.
    Equations,
    /// A step was appended at this index.
    Step(usize),
    /// The source signalled completion.
    Completed,
    /// Input arrived after the trace was closed and was dropped.
    Ignored,
}

/// Turns solver frames and documents into a [`Trace`].
///
/// The first malformed input terminates ingestion: the error is returned,
/// already-ingested steps are kept, and every later input is ignored.
#[derive(Debug, Clone, Default)]
pub struct EventIngestor {
    trace: Trace,
    terminated: bool,
}

impl EventIngestor {
    /// Creates an ingestor with an empty trace.
    pub fn new() -> Self {
        Self::default()
    }

    /// The trace so far.
    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    /// True once no further input will be accepted.
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Ingests one streaming frame.
    ///
    /// # Errors
    ///
    /// Returns an [`IngestError`] for malformed or unrecognized input, after
    /// which ingestion is terminated.
    #[instrument(skip(self, frame), fields(len = frame.len()))]
    pub fn ingest_frame(&mut self, frame: &str) -> Result<Ingested, IngestError> {
        if self.terminated {
            debug!("Ignoring frame after termination");
            return Ok(Ingested::Ignored);
        }
        let result = self.ingest_frame_inner(frame);
        if let Err(e) = &result {
            warn!(error = %e, "Terminating ingestion on bad frame");
            self.terminate();
        }
        result
    }

    fn ingest_frame_inner(&mut self, frame: &str) -> Result<Ingested, IngestError> {
        match WireMessage::decode(frame)? {
            WireMessage::Equations(equations) => {
                self.set_equations(equations);
                Ok(Ingested::Equations)
            }
            WireMessage::Done(assignments) => {
                let solution = solution_from_wire(&assignments)?;
                self.complete(solution);
                Ok(Ingested::Completed)
            }
            WireMessage::Step(step) => {
                let record = record_from_wire(step)?;
                Ok(Ingested::Step(self.append(record)))
            }
        }
    }

    /// Ingests a complete batch document.
    ///
    /// The document is validated in full before anything is appended.
    ///
    /// # Errors
    ///
    /// Returns an [`IngestError`] if the document or any step in it is
    /// invalid, after which ingestion is terminated.
    #[instrument(skip(self, document), fields(len = document.len()))]
    pub fn ingest_document(&mut self, document: &str) -> Result<Ingested, IngestError> {
        if self.terminated {
            debug!("Ignoring document after termination");
            return Ok(Ingested::Ignored);
        }
        let result = self.ingest_document_inner(document);
        if let Err(e) = &result {
            warn!(error = %e, "Terminating ingestion on bad document");
            self.terminate();
        }
        result
    }

    fn ingest_document_inner(&mut self, document: &str) -> Result<Ingested, IngestError> {
        let batch = WireBatch::decode(document)?;

        let records = batch
            .progress_steps
            .unwrap_or_default()
            .into_iter()
            .map(record_from_wire)
            .collect::<Result<Vec<_>, _>>()?;

        let explicit = batch
            .assignments
            .filter(|list| !list.is_empty())
            .map(|list| list.iter().map(assignment_from_wire).collect::<Result<Vec<_>, _>>())
            .transpose()?;

        let solution = match &batch.solution {
            Some(values) => solution_from_wire(values)?,
            None => None,
        };

        if let Some(equations) = batch.equations {
            self.set_equations(equations);
        }
        for record in records {
            self.append(record);
        }
        if let Some(explicit) = explicit {
            debug!(count = explicit.len(), "Using explicit assignment list");
            self.trace.explicit_assignments = Some(explicit);
        }
        self.complete(solution);
        Ok(Ingested::Completed)
    }

    /// Records that the source closed.
    ///
    /// A stream that closes without a completion message leaves the trace
    /// incomplete; it is still replayable.
    #[instrument(skip(self))]
    pub fn finish_stream(&mut self) {
        if !self.trace.complete {
            warn!(steps = self.trace.log.len(), "Source closed before completion");
        }
        self.terminated = true;
    }

    /// Stops accepting input.
    pub fn terminate(&mut self) {
        self.terminated = true;
    }

    /// Keeps the first non-empty equation list.
    fn set_equations(&mut self, equations: Vec<String>) {
        if equations.is_empty() {
            debug!("Empty equation list, waiting for another");
            return;
        }
        if self.trace.equations.is_some() {
            warn!("Equations already set, ignoring repeat");
            return;
        }
        debug!(count = equations.len(), "Equations received");
        self.trace.equations = Some(equations);
    }

    fn append(&mut self, record: StepRecord) -> usize {
        if *record.kind() == StepKind::NoSolution {
            info!("Solver reports no solution");
            self.trace.outcome = Outcome::NoSolution;
        }
        self.trace.log.append(record)
    }

    fn complete(&mut self, solution: Option<Solution>) {
        self.terminated = true;
        self.trace.complete = true;

        if self.trace.outcome == Outcome::NoSolution {
            if solution.is_some() {
                warn!("Ignoring answer delivered after no_solution");
            }
            return;
        }
        match solution {
            Some(solution) => {
                info!(%solution, "Solution received");
                self.trace.solution = Some(solution);
                self.trace.outcome = Outcome::Solved;
            }
            None => {
                info!("Trace completed without a solution");
                self.trace.outcome = Outcome::NoSolution;
            }
        }
    }
}

fn record_from_wire(step: WireStep) -> Result<StepRecord, IngestError> {
    let kind = match step.step_type.as_deref() {
        None => StepKind::Progress,
        Some(raw) => raw
            .parse::<StepKind>()
            .map_err(|_| IngestError::new(IngestErrorKind::UnknownStepKind(raw.to_string())))?,
    };

    let mut record = StepRecord::new(step.message, kind);

    if let Some(equation) = step.equation.filter(|e| !e.trim().is_empty()) {
        record = record.with_equation(equation.trim());
    }

    match (step.assign, step.value) {
        (Some(key), Some(value)) => {
            let variable = parse_variable(&key)?;
            let value = parse_digit(&key, &value)?;
            record = record.with_assignment(Assignment::new(variable, value));
        }
        (None, None) => {}
        (assign, value) => warn!(?assign, ?value, "Dropping half-specified assignment"),
    }

    if let Some(mapping) = step.mapping {
        let mut parsed = BTreeMap::new();
        for (key, value) in &mapping {
            let variable = parse_variable(key)?;
            let value = if value.is_null() {
                None
            } else {
                Some(parse_digit(key, value)?)
            };
            parsed.insert(variable, value);
        }
        record = record.with_mapping(parsed);
    }

    if let Some(letter) = step.current_letter.filter(|l| !l.trim().is_empty()) {
        record = record.with_current_letter(letter);
    }

    if let Some(at) = step.timestamp.and_then(DateTime::<Utc>::from_timestamp_millis) {
        record = record.received(at);
    }

    Ok(record)
}

fn assignment_from_wire(entry: &WireAssignment) -> Result<Assignment, IngestError> {
    let variable = parse_variable(&entry.letter)?;
    let value = parse_digit(&entry.letter, &entry.value)?;
    Ok(Assignment::new(variable, value))
}

/// Letter values of a final answer. Carries and unknown values are dropped.
fn solution_from_wire(values: &BTreeMap<String, Value>) -> Result<Option<Solution>, IngestError> {
    let mut letters = Vec::new();
    for (key, value) in values {
        let variable = parse_variable(key)?;
        let Some(letter) = variable.letter() else {
            continue;
        };
        if value.is_null() {
            continue;
        }
        letters.push((letter, parse_digit(key, value)?));
    }
    Ok(Solution::from_letters(letters))
}

fn parse_variable(key: &str) -> Result<Variable, IngestError> {
    key.parse::<Variable>()
        .map_err(|e| IngestError::new(IngestErrorKind::InvalidVariable(e.input)))
}

fn parse_digit(key: &str, value: &Value) -> Result<u8, IngestError> {
    value
        .as_u64()
        .filter(|d| *d <= 9)
        .and_then(|d| u8::try_from(d).ok())
        .ok_or_else(|| {
            IngestError::new(IngestErrorKind::InvalidValue {
                variable: key.to_string(),
                value: value.to_string(),
            })
        })
}

/// Why an input could not be ingested.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum IngestErrorKind {
    /// The input is not valid JSON of the expected shape.
    #[display("Malformed JSON: {}", _0)]
    MalformedJson(String),
    /// The input is JSON but matches no known message.
    #[display("Unrecognized message shape")]
    UnknownShape,
    /// The step type tag is not recognized.
    #[display("Unknown step type: {}", _0)]
    UnknownStepKind(String),
    /// A variable key is neither a letter nor a carry.
    #[display("Invalid variable: {:?}", _0)]
    InvalidVariable(String),
    /// A value is not a digit.
    #[display("Invalid value {} for {}", value, variable)]
    InvalidValue {
        /// The variable key.
        variable: String,
        /// The rejected value, as JSON.
        value: String,
    },
}

/// Ingestion error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Ingest error: {} at {}:{}", kind, file, line)]
pub struct IngestError {
    /// What went wrong.
    pub kind: IngestErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl IngestError {
    /// Creates a new ingest error with caller location tracking.
    #[track_caller]
    pub fn new(kind: IngestErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
