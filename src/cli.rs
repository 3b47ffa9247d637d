//! Command-line interface for crypta_trace.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crypta_trace::{ExamplePuzzle, Puzzle, PuzzleError, TransportMode};

/// Crypta Trace - step through a cryptarithmetic solver's trace
#[derive(Parser, Debug)]
#[command(name = "crypta_trace")]
#[command(about = "Replay viewer for cryptarithmetic solver traces", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to ./crypta_trace.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// The puzzle to solve, as three words or a built-in example.
#[derive(Args, Debug, Clone)]
pub struct PuzzleArgs {
    /// First addend
    #[arg(required_unless_present = "example")]
    pub word1: Option<String>,

    /// Second addend
    #[arg(required_unless_present = "example")]
    pub word2: Option<String>,

    /// Sum
    #[arg(required_unless_present = "example")]
    pub word3: Option<String>,

    /// Use a built-in example instead of three words
    #[arg(long, value_enum, conflicts_with_all = ["word1", "word2", "word3"])]
    pub example: Option<ExamplePuzzle>,
}

impl PuzzleArgs {
    /// Validates the arguments into a puzzle.
    pub fn puzzle(&self) -> Result<Puzzle, PuzzleError> {
        if let Some(example) = self.example {
            return Ok(example.puzzle());
        }
        Puzzle::new(
            self.word1.as_deref().unwrap_or_default(),
            self.word2.as_deref().unwrap_or_default(),
            self.word3.as_deref().unwrap_or_default(),
        )
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Solve a puzzle on the solver service and watch the trace live
    Watch {
        #[command(flatten)]
        puzzle: PuzzleArgs,

        /// Solver service base URL
        #[arg(long)]
        api_url: Option<String>,

        /// Stream events or fetch one document
        #[arg(long, value_enum)]
        mode: Option<TransportMode>,

        /// Initial playback speed, 0-100
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
        speed: Option<u8>,
    },

    /// Replay a recorded trace file in the viewer
    Replay {
        /// Trace file: .json for one document, anything else for JSON lines
        file: PathBuf,

        #[command(flatten)]
        puzzle: PuzzleArgs,

        /// Delay between frames, to simulate arrival
        #[arg(long, default_value = "0")]
        delay_ms: u64,

        /// Initial playback speed, 0-100
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
        speed: Option<u8>,
    },

    /// Print the replayed state of a trace file at one step
    Inspect {
        /// Trace file: .json for one document, anything else for JSON lines
        file: PathBuf,

        #[command(flatten)]
        puzzle: PuzzleArgs,

        /// Step index to show (defaults to the last step)
        #[arg(long)]
        step: Option<usize>,

        /// Print the view as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the built-in example puzzles
    Examples,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_example_flag() {
        let cli = Cli::parse_from(["crypta_trace", "watch", "--example", "two-two-four"]);
        let Command::Watch { puzzle, .. } = cli.command else {
            panic!("expected watch");
        };
        assert_eq!(puzzle.puzzle().expect("valid").to_string(), "TWO + TWO = FOUR");
    }

    #[test]
    fn test_positional_words() {
        let cli = Cli::parse_from(["crypta_trace", "inspect", "trace.jsonl", "odd", "odd", "even", "--step", "3"]);
        let Command::Inspect { puzzle, step, .. } = cli.command else {
            panic!("expected inspect");
        };
        assert_eq!(step, Some(3));
        assert_eq!(puzzle.puzzle().expect("valid").words(), ["ODD", "ODD", "EVEN"]);
    }
}
