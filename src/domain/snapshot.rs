//! Domain snapshots and the initial-domain computation.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

use super::{Domain, Variable};
use crate::Puzzle;

/// Every tracked variable's domain at one point of a trace.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct DomainSnapshot {
    domains: BTreeMap<Variable, Domain>,
}

impl DomainSnapshot {
    /// Computes the starting domains for a puzzle.
    ///
    /// Leading letters get 1-9, every other letter 0-9, and each carry
    /// column `1..max_len` gets `{0, 1}`.
    #[instrument(skip(puzzle), fields(puzzle = %puzzle))]
    pub fn initial(puzzle: &Puzzle) -> Self {
        let leading = puzzle.leading_letters();
        let mut domains = BTreeMap::new();

        for letter in puzzle.letters() {
            let domain = if leading.contains(&letter) {
                Domain::nonzero()
            } else {
                Domain::digits()
            };
            domains.insert(Variable::Letter(letter), domain);
        }

        for column in 1..=puzzle.carry_count() {
            // Columns beyond u8 are not meaningful puzzles.
            if let Ok(column) = u8::try_from(column) {
                domains.insert(Variable::Carry(column), Domain::binary());
            }
        }

        debug!(variables = domains.len(), "Initial domains computed");
        Self { domains }
    }

    /// Domain of `variable`, if tracked.
    pub fn get(&self, variable: Variable) -> Option<Domain> {
        self.domains.get(&variable).copied()
    }

    /// Iterates variables in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Variable, Domain)> + '_ {
        self.domains.iter().map(|(v, d)| (*v, *d))
    }

    /// Number of tracked variables.
    pub fn len(&self) -> usize {
        self.domains.len()
    }

    /// True if no variable is tracked.
    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Letter variables only.
    pub fn letters(&self) -> impl Iterator<Item = (Variable, Domain)> + '_ {
        self.iter().filter(|(v, _)| !v.is_carry())
    }

    /// Carry variables only.
    pub fn carries(&self) -> impl Iterator<Item = (Variable, Domain)> + '_ {
        self.iter().filter(|(v, _)| v.is_carry())
    }

    /// Replaces one variable's domain.
    pub(crate) fn set(&mut self, variable: Variable, domain: Domain) {
        self.domains.insert(variable, domain);
    }

    /// Applies a resolved assignment.
    ///
    /// The variable collapses to `{value}`. For a letter, `value` is then
    /// removed from every other letter; carries are never pruned by an
    /// unrelated assignment, and a carry's own value prunes nothing.
    pub(crate) fn assign(&mut self, variable: Variable, value: u8) {
        self.domains.insert(variable, Domain::singleton(value));
        if variable.is_carry() {
            return;
        }
        for (other, domain) in self.domains.iter_mut() {
            if *other != variable && !other.is_carry() {
                domain.remove(value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> DomainSnapshot {
        DomainSnapshot::initial(&Puzzle::new("TWO", "TWO", "FOUR").expect("valid"))
    }

    #[test]
    fn test_leading_letters_exclude_zero() {
        let snap = snapshot();
        assert_eq!(snap.get(Variable::Letter('T')), Some(Domain::nonzero()));
        assert_eq!(snap.get(Variable::Letter('F')), Some(Domain::nonzero()));
        assert_eq!(snap.get(Variable::Letter('W')), Some(Domain::digits()));
    }

    #[test]
    fn test_assign_prunes_other_letters_only() {
        let mut snap = snapshot();
        snap.assign(Variable::Letter('O'), 1);
        assert_eq!(snap.get(Variable::Letter('O')), Some(Domain::singleton(1)));
        assert!(!snap.get(Variable::Letter('T')).expect("tracked").contains(1));
        assert_eq!(snap.get(Variable::Carry(1)), Some(Domain::binary()));
    }

    #[test]
    fn test_carry_assignment_prunes_nothing() {
        let mut snap = snapshot();
        snap.assign(Variable::Carry(2), 0);
        assert_eq!(snap.get(Variable::Carry(2)), Some(Domain::singleton(0)));
        assert!(snap.get(Variable::Letter('W')).expect("tracked").contains(0));
    }
}
