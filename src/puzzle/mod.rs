//! Puzzle input: the three words of `FIRST + SECOND = RESULT`.
//!
//! Words are normalized (trimmed, uppercased) and validated here, before a
//! solve begins. An invalid puzzle never reaches the replay engine.

mod examples;

pub use examples::ExamplePuzzle;

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

/// Which of the three words a validation problem refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum WordSlot {
    /// The first addend.
    #[display("first word")]
    First,
    /// The second addend.
    #[display("second word")]
    Second,
    /// The sum.
    #[display("result word")]
    Result,
}

/// A validated cryptarithmetic puzzle.
///
/// All three words are non-empty and consist of uppercase ASCII letters.
/// Deserializing goes through [`Puzzle::new`], so the same holds for
/// puzzles read from files.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Getters, Serialize, Deserialize)]
#[serde(try_from = "RawPuzzle")]
pub struct Puzzle {
    /// First addend.
    first: String,
    /// Second addend.
    second: String,
    /// Sum.
    result: String,
}

/// Unvalidated words as they appear on the wire.
#[derive(Debug, Deserialize)]
struct RawPuzzle {
    first: String,
    second: String,
    result: String,
}

impl TryFrom<RawPuzzle> for Puzzle {
    type Error = PuzzleError;

    fn try_from(raw: RawPuzzle) -> Result<Self, Self::Error> {
        Self::new(raw.first, raw.second, raw.result)
    }
}

impl Puzzle {
    /// Creates a puzzle from raw user input.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleErrorKind::Incomplete`] if any word is empty after
    /// trimming, or [`PuzzleErrorKind::NonAlphabetic`] if a word contains
    /// anything other than ASCII letters.
    #[instrument(skip_all, fields(first = %first.as_ref(), second = %second.as_ref(), result = %result.as_ref()))]
    pub fn new(
        first: impl AsRef<str>,
        second: impl AsRef<str>,
        result: impl AsRef<str>,
    ) -> Result<Self, PuzzleError> {
        let words = [
            (WordSlot::First, normalize(first.as_ref())),
            (WordSlot::Second, normalize(second.as_ref())),
            (WordSlot::Result, normalize(result.as_ref())),
        ];

        let missing: Vec<WordSlot> = words
            .iter()
            .filter(|(_, word)| word.is_empty())
            .map(|(slot, _)| *slot)
            .collect();
        if !missing.is_empty() {
            warn!(?missing, "Rejecting incomplete puzzle");
            return Err(PuzzleError::new(PuzzleErrorKind::Incomplete(missing)));
        }

        for (slot, word) in &words {
            if let Some(bad) = word.chars().find(|c| !c.is_ascii_uppercase()) {
                warn!(%slot, character = ?bad, "Rejecting non-alphabetic word");
                return Err(PuzzleError::new(PuzzleErrorKind::NonAlphabetic(*slot, bad)));
            }
        }

        let [(_, first), (_, second), (_, result)] = words;
        debug!(%first, %second, %result, "Puzzle accepted");
        Ok(Self {
            first,
            second,
            result,
        })
    }

    /// Builds a puzzle from words already known to be valid.
    pub(crate) fn from_trusted(first: &str, second: &str, result: &str) -> Self {
        Self {
            first: first.to_string(),
            second: second.to_string(),
            result: result.to_string(),
        }
    }

    /// Returns the three words in order.
    pub fn words(&self) -> [&str; 3] {
        [&self.first, &self.second, &self.result]
    }

    /// Returns the first letter of each word.
    pub fn leading_letters(&self) -> Vec<char> {
        self.words()
            .iter()
            .filter_map(|word| word.chars().next())
            .collect()
    }

    /// Returns every distinct letter in order of first appearance.
    pub fn letters(&self) -> Vec<char> {
        let mut seen = Vec::new();
        for c in self.words().iter().flat_map(|w| w.chars()) {
            if !seen.contains(&c) {
                seen.push(c);
            }
        }
        seen
    }

    /// Length of the longest word.
    pub fn max_len(&self) -> usize {
        self.words().iter().map(|w| w.len()).max().unwrap_or(0)
    }

    /// Number of carry columns (`max_len - 1`).
    pub fn carry_count(&self) -> usize {
        self.max_len().saturating_sub(1)
    }
}

impl std::fmt::Display for Puzzle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} + {} = {}", self.first, self.second, self.result)
    }
}

fn normalize(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

/// What was wrong with the puzzle input.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum PuzzleErrorKind {
    /// One or more of the three words is missing.
    #[display("Please enter all three words ({} missing)", _0.len())]
    Incomplete(Vec<WordSlot>),
    /// A word contains a character that is not a letter.
    #[display("The {} contains {:?}, which is not a letter", _0, _1)]
    NonAlphabetic(WordSlot, char),
}

/// Puzzle validation error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Puzzle error: {} at {}:{}", kind, file, line)]
pub struct PuzzleError {
    /// What went wrong.
    pub kind: PuzzleErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl PuzzleError {
    /// Creates a new puzzle error with caller location tracking.
    #[track_caller]
    #[instrument(skip(kind))]
    pub fn new(kind: PuzzleErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Returns true if the input was rejected because a word was missing.
    pub fn is_incomplete(&self) -> bool {
        matches!(self.kind, PuzzleErrorKind::Incomplete(_))
    }
}
