//! Candidate digit sets stored as a 10-bit bitset.

use serde::{Serialize, Serializer};
use std::fmt;

const ALL_DIGITS: u16 = 0b11_1111_1111;

/// The set of digits still possible for a variable.
///
/// Bit `d` is set if digit `d` (0-9) is a candidate. Digits above 9 are
/// never stored.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Domain(u16);

impl Domain {
    /// The empty domain.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// All ten digits, for ordinary letters.
    pub const fn digits() -> Self {
        Self(ALL_DIGITS)
    }

    /// Digits 1-9, for letters that lead a word.
    pub const fn nonzero() -> Self {
        Self(ALL_DIGITS & !1)
    }

    /// `{0, 1}`, for carry variables.
    pub const fn binary() -> Self {
        Self(0b11)
    }

    /// A domain holding exactly one digit.
    pub fn singleton(digit: u8) -> Self {
        let mut domain = Self::empty();
        domain.insert(digit);
        domain
    }

    /// Checks whether `digit` is a candidate.
    pub fn contains(self, digit: u8) -> bool {
        digit <= 9 && (self.0 >> digit) & 1 != 0
    }

    /// Adds a digit.
    pub fn insert(&mut self, digit: u8) {
        if digit <= 9 {
            self.0 |= 1 << digit;
        }
    }

    /// Removes a digit.
    pub fn remove(&mut self, digit: u8) {
        if digit <= 9 {
            self.0 &= !(1 << digit);
        }
    }

    /// Returns a copy with `digit` removed.
    pub fn without(mut self, digit: u8) -> Self {
        self.remove(digit);
        self
    }

    /// Number of candidates.
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// True if no candidate remains.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// The only candidate, if exactly one remains.
    pub fn single_value(self) -> Option<u8> {
        (self.len() == 1).then(|| self.0.trailing_zeros() as u8)
    }

    /// True if every candidate here is also in `other`.
    pub fn is_subset(self, other: Self) -> bool {
        self.0 & !other.0 == 0
    }

    /// Iterates candidates in ascending order.
    pub fn iter(self) -> impl Iterator<Item = u8> {
        (0..=9u8).filter(move |d| self.contains(*d))
    }
}

impl fmt::Debug for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits: Vec<String> = self.iter().map(|d| d.to_string()).collect();
        write!(f, "{{{}}}", digits.join(","))
    }
}

impl Serialize for Domain {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}
