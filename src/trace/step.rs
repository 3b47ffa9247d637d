//! Step records: one normalized solver-trace event each.

use chrono::{DateTime, Utc};
use derive_getters::Getters;
use derive_setters::Setters;
use serde::Serialize;
use std::collections::BTreeMap;
use strum::{Display, EnumString, IntoStaticStr};

use crate::Variable;

/// Marker the solver puts in front of the column equation it is working on.
pub const EQUATION_MARKER: &str = "equation:";

/// What kind of solver event a step records.
///
/// The solver service also emits `first_assign`, `equation` and `error`
/// step types; they are accepted as aliases of `assign` and `progress`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, IntoStaticStr, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// A variable was selected for branching.
    #[strum(serialize = "select")]
    Select,
    /// A value was assigned.
    #[strum(to_string = "assign", serialize = "first_assign")]
    Assign,
    /// The search undid a decision.
    #[strum(serialize = "backtrack")]
    Backtrack,
    /// The solver reports a solution.
    #[strum(serialize = "solution_found")]
    SolutionFound,
    /// The solver proved there is no solution.
    #[strum(serialize = "no_solution")]
    NoSolution,
    /// Any other progress line.
    #[default]
    #[strum(to_string = "progress", serialize = "equation", serialize = "error")]
    Progress,
}

/// A resolved decision: `variable = value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, derive_new::new)]
pub struct Assignment {
    /// The assigned variable.
    pub variable: Variable,
    /// Its digit.
    pub value: u8,
}

impl std::fmt::Display for Assignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.variable, self.value)
    }
}

/// One immutable solver event.
///
/// Built with [`StepRecord::new`] and the `with_*` setters; once appended
/// to a [`StepLog`](crate::StepLog) it is never changed.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize)]
#[setters(prefix = "with_", strip_option)]
pub struct StepRecord {
    /// Free-text message from the solver.
    #[setters(skip)]
    message: String,
    /// Event kind.
    #[setters(skip)]
    kind: StepKind,
    /// Explicit `assign` + `value` pair.
    assignment: Option<Assignment>,
    /// Bulk assignment payload; `None` values are unknown.
    mapping: Option<BTreeMap<Variable, Option<u8>>>,
    /// Column equation being worked on.
    #[setters(into)]
    equation: Option<String>,
    /// Letter under consideration, as reported (display only).
    #[setters(into)]
    current_letter: Option<String>,
    /// Arrival time.
    #[setters(skip)]
    received_at: DateTime<Utc>,
}

impl StepRecord {
    /// Creates a record stamped with the current time.
    ///
    /// The current equation is taken from the text following
    /// [`EQUATION_MARKER`], when present.
    pub fn new(message: impl Into<String>, kind: StepKind) -> Self {
        let message = message.into();
        let equation = equation_in(&message);
        Self {
            message,
            kind,
            assignment: None,
            mapping: None,
            equation,
            current_letter: None,
            received_at: Utc::now(),
        }
    }

    /// Overrides the arrival time.
    pub fn received(mut self, at: DateTime<Utc>) -> Self {
        self.received_at = at;
        self
    }
}

/// Extracts the trimmed text after [`EQUATION_MARKER`].
pub fn equation_in(message: &str) -> Option<String> {
    let start = message.find(EQUATION_MARKER)? + EQUATION_MARKER.len();
    let equation = message[start..].trim();
    (!equation.is_empty()).then(|| equation.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_aliases() {
        assert_eq!("first_assign".parse::<StepKind>(), Ok(StepKind::Assign));
        assert_eq!("equation".parse::<StepKind>(), Ok(StepKind::Progress));
        assert_eq!("no_solution".parse::<StepKind>(), Ok(StepKind::NoSolution));
        assert!("teleport".parse::<StepKind>().is_err());
    }

    #[test]
    fn test_kind_display_is_canonical() {
        assert_eq!(StepKind::Assign.to_string(), "assign");
        assert_eq!(StepKind::SolutionFound.to_string(), "solution_found");
    }

    #[test]
    fn test_equation_extracted_from_message() {
        let record = StepRecord::new("Processing equation: D + E = Y + 10*Carry1", StepKind::Progress);
        assert_eq!(record.equation().as_deref(), Some("D + E = Y + 10*Carry1"));
    }

    #[test]
    fn test_marker_is_case_sensitive() {
        assert_eq!(equation_in("Equation: A + B = C"), None);
        assert_eq!(equation_in("equation:   "), None);
    }

    #[test]
    fn test_null_mapping_values_kept_unknown() {
        let mut mapping = BTreeMap::new();
        mapping.insert(Variable::Letter('S'), None);
        let record = StepRecord::new("Updated", StepKind::Assign).with_mapping(mapping);
        let kept = record.mapping().as_ref().expect("mapping kept");
        assert_eq!(kept.get(&Variable::Letter('S')), Some(&None));
        assert!(record.assignment().is_none());
    }
}
