//! Built-in example puzzles.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

use super::Puzzle;

/// Well-known puzzles offered by the `examples` command and `--example` flag.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize, clap::ValueEnum,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ExamplePuzzle {
    /// SEND + MORE = MONEY
    SendMoreMoney,
    /// BASE + BALL = GAMES
    BaseBallGames,
    /// ODD + ODD = EVEN
    OddOddEven,
    /// SATURN + URANUS = PLANETS
    SaturnUranusPlanets,
    /// CROSS + ROADS = DANGER
    CrossRoadsDanger,
    /// TWO + TWO = FOUR
    TwoTwoFour,
}

impl ExamplePuzzle {
    /// Returns the three words of this example.
    pub fn words(self) -> (&'static str, &'static str, &'static str) {
        match self {
            Self::SendMoreMoney => ("SEND", "MORE", "MONEY"),
            Self::BaseBallGames => ("BASE", "BALL", "GAMES"),
            Self::OddOddEven => ("ODD", "ODD", "EVEN"),
            Self::SaturnUranusPlanets => ("SATURN", "URANUS", "PLANETS"),
            Self::CrossRoadsDanger => ("CROSS", "ROADS", "DANGER"),
            Self::TwoTwoFour => ("TWO", "TWO", "FOUR"),
        }
    }

    /// Builds the puzzle for this example.
    pub fn puzzle(self) -> Puzzle {
        let (first, second, result) = self.words();
        Puzzle::from_trusted(first, second, result)
    }

    /// Lists every example in display order.
    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_examples_are_valid_puzzles() {
        for example in ExamplePuzzle::all() {
            let (first, second, result) = example.words();
            let checked = Puzzle::new(first, second, result).expect("example should validate");
            assert_eq!(checked, example.puzzle());
        }
    }

    #[test]
    fn test_example_names_are_kebab_case() {
        assert_eq!(ExamplePuzzle::SendMoreMoney.to_string(), "send-more-money");
    }
}
