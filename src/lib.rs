//! crypta_trace - replay viewer for cryptarithmetic solver traces
//!
//! The solver runs elsewhere and reports what it does as a stream of
//! events. This library rebuilds, for any point in that stream, every
//! letter's and carry's candidate digits and the assignments made so far,
//! and drives playback over the trace.
//!
//! # Architecture
//!
//! - **Puzzle**: validated `FIRST + SECOND = RESULT` input
//! - **Domain**: variables, digit sets and the initial domains
//! - **Trace**: step records, the append-only log and ingestion
//! - **Replay**: deterministic replay of a log prefix and reconciliation
//! - **Playback**: the step-index state machine
//! - **Transport**: stream, batch, file and scripted trace sources
//! - **Session**: the single-writer engine behind the viewer
//!
//! # Example
//!
//! ```
//! use crypta_trace::{EventIngestor, DomainSnapshot, Puzzle, replay};
//!
//! let puzzle = Puzzle::new("TWO", "TWO", "FOUR").unwrap();
//! let mut ingestor = EventIngestor::new();
//! ingestor
//!     .ingest_frame(r#"{"message": "First assignment: O = 4", "assign": "O", "value": 4, "stepType": "first_assign"}"#)
//!     .unwrap();
//!
//! let state = replay(&DomainSnapshot::initial(&puzzle), ingestor.trace().log(), 1);
//! assert_eq!(state.assignments().len(), 1);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod domain;
mod playback;
mod puzzle;
mod trace;

pub mod replay;
pub mod session;
pub mod transport;

/// Log filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,crypta_trace=debug";

// Crate-level exports - Configuration
pub use config::{API_URL_ENV, ConfigError, DEFAULT_CONFIG_FILE, TransportMode, ViewerConfig};

// Crate-level exports - Puzzle input
pub use puzzle::{ExamplePuzzle, Puzzle, PuzzleError, PuzzleErrorKind, WordSlot};

// Crate-level exports - Domains
pub use domain::{Domain, DomainSnapshot, Variable, VariableParseError};

// Crate-level exports - Traces
pub use trace::{
    Assignment, EQUATION_MARKER, EventIngestor, IngestError, IngestErrorKind, Ingested, Outcome,
    Solution, StepKind, StepLog, StepRecord, Trace, WireAssignment, WireBatch, WireMessage,
    WireStep, equation_in,
};

// Crate-level exports - Replay
pub use replay::{ReplayState, Replayer, Reconciliation, derive_assignments, reconcile, replay};

// Crate-level exports - Playback
pub use playback::{
    DEFAULT_SPEED_PERCENT, FASTEST_PERIOD_MS, PlaybackController, PlaybackState,
    SLOWEST_PERIOD_MS, SPEED_STEP_PERCENT, Speed,
};

// Crate-level exports - Sessions
pub use session::{Command, Driver, DriverHandle, Engine, Flow, ViewState};

// Crate-level exports - Transports
pub use transport::{
    BatchTransport, Connection, ConnectionStatus, FileTransport, HEALTH_CHECK_TIMEOUT,
    ScriptedTransport, SseTransport, Transport, TransportError, TransportErrorKind,
    TransportEvent,
};
