//! Reconciliation of the final displayed state with the solver's answer.

mod common;

use crypta_trace::{
    Assignment, Command, Domain, DomainSnapshot, Engine, Puzzle, ScriptedTransport, Solution,
    Speed, TransportEvent, Variable, reconcile, replay,
};
use std::sync::Arc;

#[test]
fn test_reconciled_state_matches_answer() {
    let ingestor = common::ingest_all(&common::send_more_money_frames());
    let trace = ingestor.trace();
    let solution = trace.solution().as_ref().expect("answer received");
    let state = replay(
        &DomainSnapshot::initial(&common::send_more_money()),
        trace.log(),
        trace.log().len(),
    );

    let result = reconcile(state.snapshot(), state.assignments(), solution);
    for (letter, value) in solution.iter() {
        let variable = Variable::Letter(letter);
        assert_eq!(result.snapshot().get(variable), Some(Domain::singleton(value)));
        assert!(result.assignments().iter().any(|a| *a == Assignment::new(variable, value)));
    }
    // The replay already agreed, so nothing needed correcting
    assert!(result.corrected().is_empty());
}

#[test]
fn test_disagreeing_assignment_corrected_in_place() {
    let puzzle = common::send_more_money();
    let solution = common::send_more_money_solution();
    let snapshot = DomainSnapshot::initial(&puzzle);
    let assignments = vec![
        Assignment::new(Variable::Letter('M'), 1),
        Assignment::new(Variable::Letter('S'), 8),
    ];

    let result = reconcile(&snapshot, &assignments, &solution);
    assert_eq!(result.assignments()[0], Assignment::new(Variable::Letter('M'), 1));
    assert_eq!(result.assignments()[1], Assignment::new(Variable::Letter('S'), 9));
    assert_eq!(result.assignments().len(), 8);
    assert!(result.corrected().contains(&Variable::Letter('S')));

    // Inputs are untouched
    assert_eq!(assignments[1].value, 8);
    assert_eq!(snapshot.get(Variable::Letter('S')), Some(Domain::nonzero()));
}

#[test]
fn test_missing_letters_appended_in_letter_order() {
    let puzzle = Puzzle::new("TWO", "TWO", "FOUR").expect("valid puzzle");
    let solution = Solution::from_letters([
        ('T', 7),
        ('W', 3),
        ('O', 4),
        ('F', 1),
        ('U', 6),
        ('R', 8),
    ])
    .expect("non-empty answer");
    let assignments = vec![Assignment::new(Variable::Letter('O'), 4)];

    let result = reconcile(&DomainSnapshot::initial(&puzzle), &assignments, &solution);
    let order: Vec<String> = result
        .assignments()
        .iter()
        .map(|a| a.variable.to_string())
        .collect();
    assert_eq!(order, ["O", "F", "R", "T", "U", "W"]);
    // O was listed with the right value but its domain was still open
    assert!(result.corrected().contains(&Variable::Letter('O')));
    assert_eq!(result.snapshot().get(Variable::Letter('O')), Some(Domain::singleton(4)));
}

#[test]
fn test_final_step_corrects_reassigned_letter() {
    let mut engine = Engine::new(Arc::new(ScriptedTransport::default()), Speed::default());
    engine.begin(common::send_more_money());
    for frame in common::reassignment_frames() {
        engine.handle_transport(TransportEvent::Frame(frame));
    }
    let s = Variable::Letter('S');

    // One step before the end, replay shows the solver's last decision
    engine.apply(Command::Seek(2));
    let view = engine.view();
    assert!(!view.at_final_step);
    assert_eq!(view.domains.get(s), Some(Domain::singleton(8)));

    engine.apply(Command::SeekEnd);
    let view = engine.view();
    assert!(view.at_final_step);
    assert_eq!(view.domains.get(s), Some(Domain::singleton(9)));
    assert!(view.reconciled.contains(&s));
    assert_eq!(view.assignments[0], Assignment::new(s, 9));
    assert_eq!(view.assignments.len(), 8);
}
