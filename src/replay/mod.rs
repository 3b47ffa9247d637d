//! Deterministic replay of a step log prefix.
//!
//! [`replay`] is the pure contract: the same initial snapshot, log and
//! prefix always yield the same [`ReplayState`]. [`Replayer`] produces the
//! same results incrementally for a log that only grows.

mod invariants;
mod reconcile;

pub use invariants::{
    AssignmentStability, Invariant, InvariantSet, InvariantViolation, MonotonicNarrowing,
    ReplayInvariants, ReplayTransition,
};
pub use reconcile::{Reconciliation, reconcile};

use derive_getters::Getters;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, instrument, trace, warn};

use crate::{Assignment, DomainSnapshot, StepLog, StepRecord, Variable};

/// Domains and assignments after replaying a prefix of the log.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize)]
pub struct ReplayState {
    /// Number of records replayed.
    prefix: usize,
    /// Domain of every tracked variable.
    snapshot: DomainSnapshot,
    /// Resolved letter assignments in first-seen order.
    assignments: Vec<Assignment>,
    /// Variables resolved so far, carries included.
    #[serde(skip)]
    #[getter(skip)]
    seen: BTreeSet<Variable>,
}

impl ReplayState {
    /// State at prefix 0.
    pub fn initial(snapshot: DomainSnapshot) -> Self {
        Self {
            prefix: 0,
            snapshot,
            assignments: Vec::new(),
            seen: BTreeSet::new(),
        }
    }

    /// Value recorded for `variable` in the assignment list.
    pub fn assignment_of(&self, variable: Variable) -> Option<u8> {
        self.assignments
            .iter()
            .find(|a| a.variable == variable)
            .map(|a| a.value)
    }

    /// True if `variable` has been resolved by any record so far.
    pub fn has_resolved(&self, variable: Variable) -> bool {
        self.seen.contains(&variable)
    }

    /// Replays one more record.
    ///
    /// The explicit `assign` field is applied first and always narrows.
    /// Mapping entries follow in key order; entries for variables already
    /// resolved, and entries with unknown values, are skipped.
    pub fn apply(&mut self, record: &StepRecord) {
        if let Some(assignment) = record.assignment() {
            self.resolve(assignment.variable, assignment.value);
        }
        if let Some(mapping) = record.mapping() {
            for (variable, value) in mapping {
                let Some(value) = value else {
                    continue;
                };
                if self.has_resolved(*variable) {
                    continue;
                }
                self.resolve(*variable, *value);
            }
        }
        self.prefix += 1;
    }

    fn resolve(&mut self, variable: Variable, value: u8) {
        trace!(%variable, value, "Resolving");
        self.snapshot.assign(variable, value);
        if self.seen.insert(variable) && !variable.is_carry() {
            self.assignments.push(Assignment::new(variable, value));
        }
    }
}

/// Replays the first `prefix` records of `log` on top of `initial`.
///
/// A prefix longer than the log is clamped to the log length.
#[instrument(skip(initial, log), fields(steps = log.len()))]
pub fn replay(initial: &DomainSnapshot, log: &StepLog, prefix: usize) -> ReplayState {
    let prefix = prefix.min(log.len());
    let mut state = ReplayState::initial(initial.clone());
    for record in &log.records()[..prefix] {
        state.apply(record);
    }
    state
}

/// Assignment list for the entire log, derived as replay derives it.
pub fn derive_assignments(log: &StepLog) -> Vec<Assignment> {
    replay(&DomainSnapshot::default(), log, log.len()).assignments
}

/// Incremental replayer for one solve.
///
/// Caches the latest state and continues forward from it while the
/// requested prefix only grows; a smaller prefix restarts from the initial
/// snapshot. The log passed in must be the same append-only log on every
/// call.
#[derive(Debug, Clone)]
pub struct Replayer {
    initial: DomainSnapshot,
    cached: ReplayState,
}

impl Replayer {
    /// Creates a replayer positioned at prefix 0.
    pub fn new(initial: DomainSnapshot) -> Self {
        let cached = ReplayState::initial(initial.clone());
        Self { initial, cached }
    }

    /// The snapshot at prefix 0.
    pub fn initial(&self) -> &DomainSnapshot {
        &self.initial
    }

    /// State after `prefix` records, clamped to the log length.
    #[instrument(skip(self, log), fields(cached = self.cached.prefix))]
    pub fn state_at(&mut self, log: &StepLog, prefix: usize) -> &ReplayState {
        let prefix = prefix.min(log.len());
        if prefix < self.cached.prefix {
            debug!("Rewinding replay cache");
            self.cached = ReplayState::initial(self.initial.clone());
        }

        let before = cfg!(debug_assertions).then(|| self.cached.clone());
        for record in &log.records()[self.cached.prefix..prefix] {
            self.cached.apply(record);
        }

        if let Some(before) = before {
            let transition = ReplayTransition::new(&before, &self.cached);
            if let Err(violations) = ReplayInvariants::check_all(&transition) {
                for violation in violations {
                    warn!(invariant = %violation.description, "Replay invariant violated");
                }
            }
        }

        &self.cached
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Domain, Puzzle, StepKind};
    use std::collections::BTreeMap;

    fn initial() -> DomainSnapshot {
        DomainSnapshot::initial(&Puzzle::new("TWO", "TWO", "FOUR").expect("valid"))
    }

    #[test]
    fn test_assign_field_precedes_mapping() {
        let mut mapping = BTreeMap::new();
        mapping.insert(Variable::Letter('O'), Some(4));
        mapping.insert(Variable::Letter('T'), Some(7));
        let record = StepRecord::new("x", StepKind::Assign)
            .with_assignment(Assignment::new(Variable::Letter('T'), 7))
            .with_mapping(mapping);

        let mut state = ReplayState::initial(initial());
        state.apply(&record);
        let order: Vec<Variable> = state.assignments().iter().map(|a| a.variable).collect();
        assert_eq!(order, vec![Variable::Letter('T'), Variable::Letter('O')]);
    }

    #[test]
    fn test_null_mapping_entries_skipped() {
        let mut mapping = BTreeMap::new();
        mapping.insert(Variable::Letter('R'), None);
        let record = StepRecord::new("x", StepKind::Assign).with_mapping(mapping);

        let mut state = ReplayState::initial(initial());
        state.apply(&record);
        assert!(state.assignments().is_empty());
        assert_eq!(state.snapshot().get(Variable::Letter('R')), Some(Domain::digits()));
        assert_eq!(*state.prefix(), 1);
    }

    #[test]
    fn test_carry_resolution_not_listed() {
        let record = StepRecord::new("x", StepKind::Assign)
            .with_assignment(Assignment::new(Variable::Carry(1), 1));
        let mut state = ReplayState::initial(initial());
        state.apply(&record);
        assert!(state.assignments().is_empty());
        assert!(state.has_resolved(Variable::Carry(1)));
        assert_eq!(state.snapshot().get(Variable::Carry(1)), Some(Domain::singleton(1)));
    }

    #[test]
    fn test_unknown_variable_inserted_as_singleton() {
        let record = StepRecord::new("x", StepKind::Assign)
            .with_assignment(Assignment::new(Variable::Carry(9), 0));
        let mut state = ReplayState::initial(initial());
        state.apply(&record);
        assert_eq!(state.snapshot().get(Variable::Carry(9)), Some(Domain::singleton(0)));
    }
}
