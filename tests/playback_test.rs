//! Playback controller state machine.

use crypta_trace::{
    DEFAULT_SPEED_PERCENT, FASTEST_PERIOD_MS, PlaybackController, PlaybackState,
    SLOWEST_PERIOD_MS, Speed,
};
use std::time::Duration;

fn loaded(total: usize) -> PlaybackController {
    let mut controller = PlaybackController::new(Speed::default());
    controller.begin_loading();
    controller.set_total(total);
    controller
}

#[test]
fn test_speed_endpoints() {
    assert_eq!(Speed::new(0).period(), Duration::from_millis(SLOWEST_PERIOD_MS));
    assert_eq!(Speed::new(100).period(), Duration::from_millis(FASTEST_PERIOD_MS));
    assert_eq!(Speed::new(250).percent(), 100);
    assert_eq!(Speed::default().percent(), DEFAULT_SPEED_PERCENT);

    // Faster speeds never have longer periods
    let periods: Vec<Duration> = (0..=100).map(|p| Speed::new(p).period()).collect();
    assert!(periods.windows(2).all(|w| w[1] <= w[0]));
}

#[test]
fn test_play_to_end_pauses_without_answer() {
    let mut controller = loaded(3);
    controller.mark_stream_closed();
    assert_eq!(controller.state(), PlaybackState::Paused);

    controller.play();
    assert!(controller.is_playing());
    assert!(controller.tick());
    assert!(controller.tick());
    assert_eq!(controller.current_index(), 2);
    assert_eq!(controller.state(), PlaybackState::Paused);
    assert!(!controller.tick());
}

#[test]
fn test_play_to_end_finishes_with_answer() {
    let mut controller = loaded(2);
    controller.play();
    controller.mark_solution_known();
    assert!(controller.is_playing());

    controller.tick();
    assert!(controller.is_at_end());
    assert_eq!(controller.state(), PlaybackState::Finished);
}

#[test]
fn test_play_at_end_is_noop() {
    let mut controller = loaded(2);
    controller.seek_end();
    controller.play();
    assert!(!controller.is_playing());
}

#[test]
fn test_manual_navigation_is_clamped() {
    let mut controller = loaded(5);
    controller.step_back();
    assert_eq!(controller.current_index(), 0);

    controller.seek(99);
    assert_eq!(controller.current_index(), 4);
    controller.step();
    assert_eq!(controller.current_index(), 4);

    controller.seek_start();
    controller.step();
    assert_eq!(controller.current_index(), 1);
    assert_eq!(controller.prefix_len(), 2);
}

#[test]
fn test_steps_arriving_while_playing_extend_playback() {
    let mut controller = loaded(2);
    controller.play();
    controller.tick();
    assert_eq!(controller.state(), PlaybackState::Paused);

    controller.set_total(4);
    controller.play();
    controller.tick();
    assert_eq!(controller.current_index(), 2);
    assert!(controller.is_playing());
}

#[test]
fn test_idle_ignores_navigation() {
    let mut controller = PlaybackController::new(Speed::default());
    controller.play();
    controller.step();
    controller.seek(3);
    controller.set_total(10);
    assert_eq!(controller.state(), PlaybackState::Idle);
    assert_eq!(controller.current_index(), 0);
    assert_eq!(controller.total_steps(), 0);
}

#[test]
fn test_reset_is_idempotent_and_keeps_speed() {
    let mut controller = loaded(4);
    controller.set_speed(Speed::new(30));
    controller.play();

    controller.reset();
    let once = controller.clone();
    controller.reset();
    assert_eq!(controller, once);
    assert_eq!(controller.state(), PlaybackState::Idle);
    assert_eq!(controller.speed(), Speed::new(30));
}

#[test]
fn test_prefix_of_empty_trace_is_zero() {
    let mut controller = loaded(0);
    controller.mark_stream_closed();
    assert_eq!(controller.prefix_len(), 0);
    controller.step();
    assert_eq!(controller.current_index(), 0);
}
