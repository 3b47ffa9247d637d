//! Puzzle variables: letters and column carries.

use derive_more::{Display, Error};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const CARRY_PREFIX: &str = "Carry";

/// A variable whose domain the replay tracks.
///
/// Ordering puts letters first (alphabetically) and carries after them
/// (by column), which is also the display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Variable {
    /// An uppercase puzzle letter.
    Letter(char),
    /// Carry into column `n`, counted from the least-significant column.
    Carry(u8),
}

impl Variable {
    /// True for carry variables.
    pub fn is_carry(self) -> bool {
        matches!(self, Self::Carry(_))
    }

    /// The letter, if this is a letter variable.
    pub fn letter(self) -> Option<char> {
        match self {
            Self::Letter(c) => Some(c),
            Self::Carry(_) => None,
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Letter(c) => write!(f, "{}", c),
            Self::Carry(n) => write!(f, "{}{}", CARRY_PREFIX, n),
        }
    }
}

impl FromStr for Variable {
    type Err = VariableParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let key = raw.trim();
        if let Some(index) = key.strip_prefix(CARRY_PREFIX) {
            return index
                .parse::<u8>()
                .map(Self::Carry)
                .map_err(|_| VariableParseError::new(raw));
        }

        let mut chars = key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_alphabetic() => Ok(Self::Letter(c.to_ascii_uppercase())),
            _ => Err(VariableParseError::new(raw)),
        }
    }
}

impl Serialize for Variable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A variable key that is neither a single letter nor `Carry<n>`.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("Not a puzzle variable: {:?}", input)]
pub struct VariableParseError {
    /// The rejected key.
    pub input: String,
}

impl VariableParseError {
    fn new(input: &str) -> Self {
        Self {
            input: input.to_string(),
        }
    }
}
