//! Final solver answers.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::Variable;

/// The solver's final letter-to-digit answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Solution {
    values: BTreeMap<char, u8>,
}

impl Solution {
    /// Builds a solution from letter values.
    ///
    /// Returns `None` when no letter is given: an empty answer is not a
    /// solution.
    pub fn from_letters(values: impl IntoIterator<Item = (char, u8)>) -> Option<Self> {
        let values: BTreeMap<char, u8> = values.into_iter().collect();
        (!values.is_empty()).then_some(Self { values })
    }

    /// Digit assigned to `letter`.
    pub fn get(&self, letter: char) -> Option<u8> {
        self.values.get(&letter).copied()
    }

    /// Digit for a variable; carries are never part of an answer.
    pub fn value_of(&self, variable: Variable) -> Option<u8> {
        variable.letter().and_then(|c| self.get(c))
    }

    /// Iterates `(letter, digit)` in letter order.
    pub fn iter(&self) -> impl Iterator<Item = (char, u8)> + '_ {
        self.values.iter().map(|(c, d)| (*c, *d))
    }

    /// Number of letters.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false for a constructed solution.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Renders a word with each letter replaced by its digit.
    ///
    /// Letters missing from the answer render as `?`.
    pub fn spell(&self, word: &str) -> String {
        word.chars()
            .map(|c| match self.get(c) {
                Some(d) => char::from(b'0' + d),
                None => '?',
            })
            .collect()
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(c, d)| format!("{}={}", c, d)).collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// How a trace ended, as far as is known.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Outcome {
    /// No terminal event yet.
    #[default]
    Pending,
    /// A solution was delivered.
    Solved,
    /// The solver reported that no solution exists.
    NoSolution,
}
