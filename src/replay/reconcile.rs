//! Final-prefix correction against the solver's answer.

use derive_getters::Getters;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, instrument};

use crate::{Assignment, Domain, DomainSnapshot, Solution, Variable};

/// Domains and assignments as displayed once the answer is known.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize)]
pub struct Reconciliation {
    /// Corrected domains.
    snapshot: DomainSnapshot,
    /// Corrected assignment list.
    assignments: Vec<Assignment>,
    /// Variables whose displayed value was changed or added.
    corrected: BTreeSet<Variable>,
}

impl Reconciliation {
    /// Consumes the reconciliation.
    pub fn into_parts(self) -> (DomainSnapshot, Vec<Assignment>, BTreeSet<Variable>) {
        (self.snapshot, self.assignments, self.corrected)
    }
}

/// Makes the final displayed state agree with `solution`.
///
/// Assignments whose value disagrees take the answer's value. Every answer
/// letter whose domain is not exactly its answer digit is collapsed to it,
/// and answer letters absent from the list are appended in letter order.
/// Carries are left untouched. Inputs are not modified.
#[instrument(skip_all, fields(letters = solution.len()))]
pub fn reconcile(
    snapshot: &DomainSnapshot,
    assignments: &[Assignment],
    solution: &Solution,
) -> Reconciliation {
    let mut snapshot = snapshot.clone();
    let mut assignments = assignments.to_vec();
    let mut corrected = BTreeSet::new();

    for assignment in assignments.iter_mut() {
        let Some(value) = solution.value_of(assignment.variable) else {
            continue;
        };
        if value != assignment.value {
            debug!(variable = %assignment.variable, from = assignment.value, to = value, "Correcting assignment");
            assignment.value = value;
            corrected.insert(assignment.variable);
        }
    }

    for (letter, value) in solution.iter() {
        let variable = Variable::Letter(letter);
        let expected = Domain::singleton(value);
        if snapshot.get(variable) != Some(expected) {
            debug!(%variable, value, "Collapsing domain to answer");
            snapshot.set(variable, expected);
            corrected.insert(variable);
        }
        if !assignments.iter().any(|a| a.variable == variable) {
            assignments.push(Assignment::new(variable, value));
            corrected.insert(variable);
        }
    }

    Reconciliation {
        snapshot,
        assignments,
        corrected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Puzzle;

    #[test]
    fn test_carries_untouched() {
        let puzzle = Puzzle::new("TWO", "TWO", "FOUR").expect("valid");
        let snapshot = DomainSnapshot::initial(&puzzle);
        let solution = Solution::from_letters([('T', 7), ('W', 3), ('O', 4), ('F', 1), ('U', 6), ('R', 8)])
            .expect("non-empty");
        let result = reconcile(&snapshot, &[], &solution);
        assert_eq!(result.snapshot().get(Variable::Carry(1)), Some(Domain::binary()));
        assert_eq!(result.assignments().len(), 6);
    }
}
