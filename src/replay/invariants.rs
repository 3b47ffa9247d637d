//! Properties every replay step must preserve.
//!
//! Invariants are checked over a [`ReplayTransition`]: the state before and
//! after replaying more records. The replayer checks them in debug builds.

use super::ReplayState;

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants that can be checked together.
pub trait InvariantSet<S> {
    /// Checks all invariants in the set.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

impl<S, I1, I2> InvariantSet<S> for (I1, I2)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = Vec::new();

        if !I1::holds(state) {
            violations.push(InvariantViolation::new(I1::description()));
        }

        if !I2::holds(state) {
            violations.push(InvariantViolation::new(I2::description()));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

/// Two states of the same replay, `before` at a shorter prefix.
#[derive(Debug, Clone, Copy, derive_new::new)]
pub struct ReplayTransition<'a> {
    /// Earlier state.
    pub before: &'a ReplayState,
    /// Later state.
    pub after: &'a ReplayState,
}

/// Invariant: domains only narrow.
///
/// Every variable tracked before is still tracked after, and its domain is
/// a subset of the earlier one unless it collapsed to a singleton through
/// an assignment.
pub struct MonotonicNarrowing;

impl<'a> Invariant<ReplayTransition<'a>> for MonotonicNarrowing {
    fn holds(t: &ReplayTransition<'a>) -> bool {
        t.before.snapshot().iter().all(|(variable, earlier)| {
            match t.after.snapshot().get(variable) {
                Some(later) => later.is_subset(earlier) || later.single_value().is_some(),
                None => false,
            }
        })
    }

    fn description() -> &'static str {
        "Domains only narrow between prefixes"
    }
}

/// Invariant: once listed, an assignment stays listed in the same position.
pub struct AssignmentStability;

impl<'a> Invariant<ReplayTransition<'a>> for AssignmentStability {
    fn holds(t: &ReplayTransition<'a>) -> bool {
        let earlier = t.before.assignments();
        let later = t.after.assignments();
        earlier.len() <= later.len()
            && earlier
                .iter()
                .zip(later.iter())
                .all(|(a, b)| a.variable == b.variable)
    }

    fn description() -> &'static str {
        "Assigned variables keep their place in the assignment list"
    }
}

/// All replay invariants as a composable set.
pub type ReplayInvariants = (MonotonicNarrowing, AssignmentStability);
