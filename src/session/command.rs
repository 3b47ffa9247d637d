//! Commands accepted by the session engine.

use strum::Display;

use crate::Puzzle;

/// One request to change session state.
///
/// Every mutation of a session goes through a command, applied in the
/// order received.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum Command {
    /// Release any connection and start solving this puzzle.
    Solve(Puzzle),
    /// Check whether the backend is up.
    CheckBackend,
    /// Start auto-advance.
    Play,
    /// Stop auto-advance.
    Pause,
    /// Play or pause.
    TogglePlay,
    /// Advance one step.
    Step,
    /// Go back one step.
    StepBack,
    /// Jump to a step index.
    Seek(usize),
    /// Jump to the first step.
    SeekStart,
    /// Jump to the last step.
    SeekEnd,
    /// Set the speed percentage.
    SetSpeed(u8),
    /// Increase speed by one notch.
    Faster,
    /// Decrease speed by one notch.
    Slower,
    /// Show or hide the answer panel.
    ToggleAnswer,
    /// Release everything and return to idle.
    Reset,
    /// Stop the driver.
    Shutdown,
}

/// Whether the driver keeps running after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep going.
    Continue,
    /// Stop the driver loop.
    Shutdown,
}
