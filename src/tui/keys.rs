//! Key bindings.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crypta_trace::{Command, Puzzle};

/// What a key press asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    /// Send a command to the session.
    Send(Command),
    /// Leave the viewer.
    Quit,
}

/// Help text listing the bindings.
pub const HELP: &str =
    "space play/pause  → step  ← back  g/G start/end  +/- speed  a answer  s solve  c check  r reset  q quit";

/// Maps a key press to an action. `puzzle` is re-solved by `s`.
pub fn map_key(key: KeyEvent, puzzle: &Puzzle) -> Option<KeyAction> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(KeyAction::Quit);
    }

    let command = match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return Some(KeyAction::Quit),
        KeyCode::Char(' ') | KeyCode::Char('p') => Command::TogglePlay,
        KeyCode::Right | KeyCode::Char('n') | KeyCode::Char('l') => Command::Step,
        KeyCode::Left | KeyCode::Char('b') | KeyCode::Char('h') => Command::StepBack,
        KeyCode::Home | KeyCode::Char('g') => Command::SeekStart,
        KeyCode::End | KeyCode::Char('G') => Command::SeekEnd,
        KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Up => Command::Faster,
        KeyCode::Char('-') | KeyCode::Down => Command::Slower,
        KeyCode::Char('a') => Command::ToggleAnswer,
        KeyCode::Char('r') => Command::Reset,
        KeyCode::Char('s') => Command::Solve(puzzle.clone()),
        KeyCode::Char('c') => Command::CheckBackend,
        KeyCode::Char(c) if c.is_ascii_digit() => Command::SetSpeed(speed_for_digit(c)),
        _ => return None,
    };
    Some(KeyAction::Send(command))
}

/// `1`-`9` select 10-90 %, `0` selects 100 %.
fn speed_for_digit(c: char) -> u8 {
    match c.to_digit(10) {
        Some(0) | None => 100,
        Some(d) => (d * 10) as u8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn puzzle() -> Puzzle {
        Puzzle::new("SEND", "MORE", "MONEY").expect("valid")
    }

    #[test]
    fn test_playback_keys() {
        assert_eq!(
            map_key(press(KeyCode::Char(' ')), &puzzle()),
            Some(KeyAction::Send(Command::TogglePlay))
        );
        assert_eq!(
            map_key(press(KeyCode::Right), &puzzle()),
            Some(KeyAction::Send(Command::Step))
        );
        assert_eq!(
            map_key(press(KeyCode::End), &puzzle()),
            Some(KeyAction::Send(Command::SeekEnd))
        );
    }

    #[test]
    fn test_digit_keys_set_speed() {
        assert_eq!(
            map_key(press(KeyCode::Char('3')), &puzzle()),
            Some(KeyAction::Send(Command::SetSpeed(30)))
        );
        assert_eq!(
            map_key(press(KeyCode::Char('0')), &puzzle()),
            Some(KeyAction::Send(Command::SetSpeed(100)))
        );
    }

    #[test]
    fn test_quit_keys() {
        assert_eq!(map_key(press(KeyCode::Esc), &puzzle()), Some(KeyAction::Quit));
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(ctrl_c, &puzzle()), Some(KeyAction::Quit));
        assert_eq!(map_key(press(KeyCode::Char('z')), &puzzle()), None);
    }

    #[test]
    fn test_check_key() {
        assert_eq!(
            map_key(press(KeyCode::Char('c')), &puzzle()),
            Some(KeyAction::Send(Command::CheckBackend))
        );
    }

    #[test]
    fn test_solve_key_resolves_same_puzzle() {
        assert_eq!(
            map_key(press(KeyCode::Char('s')), &puzzle()),
            Some(KeyAction::Send(Command::Solve(puzzle())))
        );
    }
}
