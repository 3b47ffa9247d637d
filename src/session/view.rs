//! Read-only presentation snapshot.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::{
    Assignment, ConnectionStatus, DomainSnapshot, Outcome, PlaybackState, Puzzle, Solution,
    StepRecord, Variable,
};

/// Most recent steps kept in [`ViewState::history`].
pub const HISTORY_LIMIT: usize = 64;

/// Playback fields shown to the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlaybackView {
    /// Controller state.
    pub state: PlaybackState,
    /// True while auto-advancing.
    pub is_playing: bool,
    /// Index of the current step.
    pub current_index: usize,
    /// Steps available.
    pub total_steps: usize,
    /// Speed percentage.
    pub speed_percent: u8,
    /// Auto-advance period in milliseconds.
    pub period_ms: u64,
}

/// Everything the front end renders, derived for the current step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViewState {
    /// Puzzle being solved.
    pub puzzle: Option<Puzzle>,
    /// Playback position and speed.
    pub playback: PlaybackView,
    /// Domain of every variable at the current step.
    pub domains: DomainSnapshot,
    /// Resolved assignments at the current step.
    pub assignments: Vec<Assignment>,
    /// Variables whose display was corrected by the final answer.
    pub reconciled: BTreeSet<Variable>,
    /// Column equations.
    pub equations: Vec<String>,
    /// Most recent equation mentioned up to the current step.
    pub current_equation: Option<String>,
    /// The current step.
    pub current_step: Option<StepRecord>,
    /// Steps up to and including the current one, newest last.
    pub history: Vec<StepRecord>,
    /// Most recent letter under consideration.
    pub current_letter: Option<String>,
    /// The final answer, once known.
    pub solution: Option<Solution>,
    /// True when the answer panel should be drawn.
    pub answer_visible: bool,
    /// Terminal status of the trace.
    pub outcome: Outcome,
    /// Last error shown to the user.
    pub error: Option<String>,
    /// True while a connection is open.
    pub connected: bool,
    /// Result of the last backend health check.
    pub backend: ConnectionStatus,
    /// True when the current step is the last of a completed trace.
    pub at_final_step: bool,
}

impl ViewState {
    /// True if an equation is the one currently worked on.
    pub fn is_current_equation(&self, equation: &str) -> bool {
        self.current_equation
            .as_deref()
            .is_some_and(|current| equation.trim() == current || equation.contains(current))
    }
}
