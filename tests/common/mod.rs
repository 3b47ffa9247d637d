//! Shared fixtures: a recorded SEND + MORE = MONEY solve.

#![allow(dead_code)]

use crypta_trace::{EventIngestor, Puzzle, Solution};

/// The unique answer to SEND + MORE = MONEY.
pub const SEND_MORE_MONEY: [(char, u8); 8] = [
    ('S', 9),
    ('E', 5),
    ('N', 6),
    ('D', 7),
    ('M', 1),
    ('O', 0),
    ('R', 8),
    ('Y', 2),
];

pub fn send_more_money() -> Puzzle {
    Puzzle::new("SEND", "MORE", "MONEY").expect("valid puzzle")
}

pub fn send_more_money_solution() -> Solution {
    Solution::from_letters(SEND_MORE_MONEY).expect("non-empty answer")
}

/// Streaming frames as the solver service emits them, answer included.
pub fn send_more_money_frames() -> Vec<String> {
    [
        r#"{"equations": ["D + E = Y + 10*Carry1", "N + R + Carry1 = E + 10*Carry2", "E + O + Carry2 = N + 10*Carry3", "S + M + Carry3 = O + 10*Carry4", "Carry4 = M"]}"#,
        r#"{"message": "Processing equation: Carry4 = M", "stepType": "equation"}"#,
        r#"{"message": "Selecting variable M", "currentLetter": "M", "stepType": "select"}"#,
        r#"{"message": "First assignment: M = 1", "assign": "M", "value": 1, "stepType": "first_assign"}"#,
        r#"{"message": "Assigned Carry4 = 1", "mapping": {"M": 1, "Carry4": 1}, "stepType": "assign"}"#,
        r#"{"message": "Processing equation: S + M + Carry3 = O + 10*Carry4", "stepType": "equation"}"#,
        r#"{"message": "Selecting variable S", "currentLetter": "S", "stepType": "select"}"#,
        r#"{"message": "First assignment: S = 9", "assign": "S", "value": 9, "stepType": "first_assign"}"#,
        r#"{"message": "Assigned O = 0", "mapping": {"M": 1, "S": 9, "O": 0, "Carry3": 0, "Carry4": 1}, "stepType": "assign"}"#,
        r#"{"message": "Processing equation: E + O + Carry2 = N + 10*Carry3", "stepType": "equation"}"#,
        r#"{"message": "Selecting variable E", "currentLetter": "E", "stepType": "select"}"#,
        r#"{"message": "Backtracking from E = 4", "stepType": "backtrack"}"#,
        r#"{"message": "First assignment: E = 5", "assign": "E", "value": 5, "stepType": "first_assign"}"#,
        r#"{"message": "Assigned N = 6", "mapping": {"E": 5, "N": 6, "Carry2": 1}, "stepType": "assign"}"#,
        r#"{"message": "Processing equation: N + R + Carry1 = E + 10*Carry2", "stepType": "equation"}"#,
        r#"{"message": "Selecting variable R", "currentLetter": "R", "stepType": "select"}"#,
        r#"{"message": "First assignment: R = 8", "assign": "R", "value": 8, "stepType": "first_assign"}"#,
        r#"{"message": "Processing equation: D + E = Y + 10*Carry1", "stepType": "equation"}"#,
        r#"{"message": "Selecting variable D", "currentLetter": "D", "stepType": "select"}"#,
        r#"{"message": "Assigned D = 7, Y = 2", "mapping": {"D": 7, "Y": 2, "Carry1": 1, "R": null}, "stepType": "assign"}"#,
        r#"{"message": "Solution found!", "stepType": "solution_found"}"#,
        r#"{"done": true, "assignments": {"S": 9, "E": 5, "N": 6, "D": 7, "M": 1, "O": 0, "R": 8, "Y": 2, "Carry1": 1}}"#,
    ]
    .iter()
    .map(|frame| frame.to_string())
    .collect()
}

/// Number of step records in [`send_more_money_frames`].
pub const SEND_MORE_MONEY_STEPS: usize = 20;

/// ONE + ONE = ONE has no answer: O would have to be zero.
pub fn one_one_one() -> Puzzle {
    Puzzle::new("ONE", "ONE", "ONE").expect("valid puzzle")
}

/// Frames of a solve that finds nothing.
pub fn no_solution_frames() -> Vec<String> {
    [
        r#"{"equations": ["E + E = E + 10*Carry1", "N + N + Carry1 = N + 10*Carry2", "O + O + Carry2 = O"]}"#,
        r#"{"message": "Processing equation: E + E = E + 10*Carry1", "stepType": "equation"}"#,
        r#"{"message": "Selecting variable E", "currentLetter": "E", "stepType": "select"}"#,
        r#"{"message": "First assignment: E = 0", "assign": "E", "value": 0, "stepType": "first_assign"}"#,
        r#"{"message": "Assigned N = 0", "mapping": {"E": 0, "N": 0, "Carry1": 0}, "stepType": "assign"}"#,
        r#"{"message": "Backtracking from N = 0", "stepType": "backtrack"}"#,
        r#"{"message": "No solution exists", "stepType": "no_solution"}"#,
        r#"{"done": true, "assignments": {}}"#,
    ]
    .iter()
    .map(|frame| frame.to_string())
    .collect()
}

/// Ingests every frame, panicking on the first error.
pub fn ingest_all(frames: &[String]) -> EventIngestor {
    let mut ingestor = EventIngestor::new();
    for frame in frames {
        ingestor.ingest_frame(frame).expect("frame should ingest");
    }
    ingestor
}

/// A SEND + MORE = MONEY trace that tries S twice and then names S a
/// third time in a cumulative mapping.
pub fn reassignment_frames() -> Vec<String> {
    [
        r#"{"message": "First assignment: S = 9", "assign": "S", "value": 9, "stepType": "first_assign"}"#,
        r#"{"message": "Backtracking from S = 9", "stepType": "backtrack"}"#,
        r#"{"message": "Trying S = 8", "assign": "S", "value": 8, "stepType": "assign"}"#,
        r#"{"message": "Assigned E = 5", "mapping": {"S": 7, "E": 5}, "stepType": "assign"}"#,
        r#"{"done": true, "assignments": {"S": 9, "E": 5, "N": 6, "D": 7, "M": 1, "O": 0, "R": 8, "Y": 2}}"#,
    ]
    .iter()
    .map(|frame| frame.to_string())
    .collect()
}
