//! Solver traces: step records, the step log and event ingestion.

mod ingest;
mod log;
mod solution;
mod step;
mod wire;

pub use ingest::{EventIngestor, IngestError, IngestErrorKind, Ingested, Trace};
pub use log::StepLog;
pub use solution::{Outcome, Solution};
pub use step::{Assignment, EQUATION_MARKER, StepKind, StepRecord, equation_in};
pub use wire::{WireAssignment, WireBatch, WireMessage, WireStep};
