//! Playback controller: which prefix of the trace is current, over time.
//!
//! The controller is a plain state machine. It never owns a timer; the
//! session driver calls [`PlaybackController::tick`] once per
//! [`Speed::period`] while [`PlaybackController::is_playing`] is true.

use serde::Serialize;
use std::time::Duration;
use strum::Display;
use tracing::{debug, info, instrument};

/// Slowest auto-advance period, at 0 %.
pub const SLOWEST_PERIOD_MS: u64 = 2000;
/// Fastest auto-advance period, at 100 %.
pub const FASTEST_PERIOD_MS: u64 = 50;
/// Speed used until the user picks one.
pub const DEFAULT_SPEED_PERCENT: u8 = 80;
/// Percent change per faster/slower command.
pub const SPEED_STEP_PERCENT: u8 = 10;

/// Playback lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    /// No solve in progress.
    #[default]
    Idle,
    /// A solve was requested and steps may still be arriving.
    Loading,
    /// Auto-advancing.
    Playing,
    /// Holding the current index.
    Paused,
    /// The answer is known and playback is not running.
    Finished,
}

/// Playback speed as a percentage, 0 (slowest) to 100 (fastest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Speed(u8);

impl Speed {
    /// Creates a speed, clamping to 100.
    pub fn new(percent: u8) -> Self {
        Self(percent.min(100))
    }

    /// The percentage.
    pub fn percent(self) -> u8 {
        self.0
    }

    /// Auto-advance period: 2000 ms at 0 % down to 50 ms at 100 %, rounded
    /// to the nearest millisecond.
    pub fn period(self) -> Duration {
        let span = SLOWEST_PERIOD_MS - FASTEST_PERIOD_MS;
        let reduction = (u64::from(self.0) * span + 50) / 100;
        Duration::from_millis(SLOWEST_PERIOD_MS - reduction)
    }

    /// One step faster.
    pub fn faster(self) -> Self {
        Self::new(self.0.saturating_add(SPEED_STEP_PERCENT))
    }

    /// One step slower.
    pub fn slower(self) -> Self {
        Self::new(self.0.saturating_sub(SPEED_STEP_PERCENT))
    }
}

impl Default for Speed {
    fn default() -> Self {
        Self(DEFAULT_SPEED_PERCENT)
    }
}

/// Owns the current step index and the playback state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlaybackController {
    state: PlaybackState,
    current_index: usize,
    total_steps: usize,
    speed: Speed,
    solution_known: bool,
}

impl PlaybackController {
    /// Creates an idle controller at the given speed.
    pub fn new(speed: Speed) -> Self {
        Self {
            speed,
            ..Self::default()
        }
    }

    /// Current state.
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Index of the current step.
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Number of steps available.
    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    /// Current speed.
    pub fn speed(&self) -> Speed {
        self.speed
    }

    /// True while auto-advancing.
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Index of the last step, or 0 for an empty log.
    pub fn last_index(&self) -> usize {
        self.total_steps.saturating_sub(1)
    }

    /// True when the current index is the last one.
    pub fn is_at_end(&self) -> bool {
        self.total_steps > 0 && self.current_index == self.last_index()
    }

    /// Number of records to replay for the current index.
    pub fn prefix_len(&self) -> usize {
        if self.total_steps == 0 {
            0
        } else {
            self.current_index + 1
        }
    }

    /// Starts a new solve: index 0, nothing loaded, answer unknown.
    #[instrument(skip(self))]
    pub fn begin_loading(&mut self) {
        info!(from = %self.state, "Playback loading");
        self.state = PlaybackState::Loading;
        self.current_index = 0;
        self.total_steps = 0;
        self.solution_known = false;
    }

    /// Records how many steps exist now.
    pub fn set_total(&mut self, total: usize) {
        if self.state == PlaybackState::Idle {
            return;
        }
        self.total_steps = total;
        self.current_index = self.current_index.min(self.last_index());
    }

    /// The answer arrived.
    #[instrument(skip(self))]
    pub fn mark_solution_known(&mut self) {
        if self.state == PlaybackState::Idle {
            return;
        }
        self.solution_known = true;
        if matches!(self.state, PlaybackState::Loading | PlaybackState::Paused) {
            self.transition(PlaybackState::Finished);
        }
    }

    /// The source closed, with or without an answer.
    #[instrument(skip(self))]
    pub fn mark_stream_closed(&mut self) {
        if self.state == PlaybackState::Loading {
            self.transition(self.resting_state());
        }
    }

    /// Starts auto-advance. No-op when there is nothing left to play.
    #[instrument(skip(self))]
    pub fn play(&mut self) {
        if self.state == PlaybackState::Idle || self.total_steps == 0 || self.is_at_end() {
            debug!(state = %self.state, "Nothing to play");
            return;
        }
        self.transition(PlaybackState::Playing);
    }

    /// Stops auto-advance.
    #[instrument(skip(self))]
    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.transition(self.resting_state());
        }
    }

    /// Play if paused, pause if playing.
    pub fn toggle(&mut self) {
        if self.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Advances one step without changing Playing or Paused.
    pub fn step(&mut self) {
        if self.state == PlaybackState::Idle || self.total_steps == 0 {
            return;
        }
        if self.current_index < self.last_index() {
            self.current_index += 1;
        }
    }

    /// Moves back one step.
    pub fn step_back(&mut self) {
        if self.state == PlaybackState::Idle {
            return;
        }
        self.current_index = self.current_index.saturating_sub(1);
    }

    /// Jumps to `index`, clamped to the last step.
    pub fn seek(&mut self, index: usize) {
        if self.state == PlaybackState::Idle {
            return;
        }
        self.current_index = index.min(self.last_index());
    }

    /// Jumps to the first step.
    pub fn seek_start(&mut self) {
        self.seek(0);
    }

    /// Jumps to the last step.
    pub fn seek_end(&mut self) {
        self.seek(self.last_index());
    }

    /// Changes speed; the new period applies from the next tick.
    pub fn set_speed(&mut self, speed: Speed) {
        debug!(percent = speed.percent(), "Speed changed");
        self.speed = speed;
    }

    /// One timer period elapsed.
    ///
    /// Advances by one while playing; on reaching the last step playback
    /// stops, resting in Finished when the answer is known and Paused
    /// otherwise. Returns true if the index moved.
    pub fn tick(&mut self) -> bool {
        if !self.is_playing() {
            return false;
        }
        let moved = self.current_index < self.last_index();
        if moved {
            self.current_index += 1;
        }
        if self.is_at_end() {
            self.transition(self.resting_state());
        }
        moved
    }

    /// Back to Idle with no steps. Speed is kept.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        if self.state != PlaybackState::Idle {
            info!(from = %self.state, "Playback reset");
        }
        *self = Self::new(self.speed);
    }

    fn resting_state(&self) -> PlaybackState {
        if self.solution_known {
            PlaybackState::Finished
        } else {
            PlaybackState::Paused
        }
    }

    fn transition(&mut self, to: PlaybackState) {
        if self.state != to {
            debug!(from = %self.state, %to, "Playback transition");
            self.state = to;
        }
    }
}
