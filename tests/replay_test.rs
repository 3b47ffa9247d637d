//! Replay determinism and the properties every replay step preserves.

mod common;

use crypta_trace::replay::{
    AssignmentStability, Invariant, InvariantSet, MonotonicNarrowing, ReplayInvariants,
    ReplayTransition,
};
use crypta_trace::{
    Assignment, Domain, DomainSnapshot, Replayer, Variable, derive_assignments, replay,
};

#[test]
fn test_replay_is_deterministic_for_every_prefix() {
    let ingestor = common::ingest_all(&common::send_more_money_frames());
    let log = ingestor.trace().log();
    let initial = DomainSnapshot::initial(&common::send_more_money());

    for prefix in 0..=log.len() {
        let first = replay(&initial, log, prefix);
        let second = replay(&initial, log, prefix);
        assert_eq!(first, second, "prefix {}", prefix);
        assert_eq!(*first.prefix(), prefix);
    }
}

#[test]
fn test_first_seen_value_stands_in_plain_replay() {
    let ingestor = common::ingest_all(&common::reassignment_frames());
    let log = ingestor.trace().log();
    assert_eq!(log.len(), 4);
    let state = replay(&DomainSnapshot::initial(&common::send_more_money()), log, 4);

    // The list keeps the first value; the domain follows the latest decision
    assert_eq!(
        state.assignments(),
        &vec![
            Assignment::new(Variable::Letter('S'), 9),
            Assignment::new(Variable::Letter('E'), 5)
        ]
    );
    assert_eq!(state.assignment_of(Variable::Letter('S')), Some(9));
    assert_eq!(state.snapshot().get(Variable::Letter('S')), Some(Domain::singleton(8)));
    assert_eq!(state.snapshot().get(Variable::Letter('E')), Some(Domain::singleton(5)));

    // 9 and 8 were pruned by the explicit decisions, 5 by the mapping; 7 was skipped
    let m = state.snapshot().get(Variable::Letter('M')).expect("M tracked");
    assert_eq!(m.iter().collect::<Vec<_>>(), vec![1, 2, 3, 4, 6, 7]);
}

#[test]
fn test_prefix_zero_is_initial_snapshot() {
    let ingestor = common::ingest_all(&common::send_more_money_frames());
    let initial = DomainSnapshot::initial(&common::send_more_money());
    let state = replay(&initial, ingestor.trace().log(), 0);
    assert_eq!(state.snapshot(), &initial);
    assert!(state.assignments().is_empty());
}

#[test]
fn test_prefix_past_end_is_clamped() {
    let ingestor = common::ingest_all(&common::send_more_money_frames());
    let log = ingestor.trace().log();
    let initial = DomainSnapshot::initial(&common::send_more_money());
    assert_eq!(replay(&initial, log, log.len() + 10), replay(&initial, log, log.len()));
}

#[test]
fn test_every_step_narrows_and_keeps_assignments() {
    let ingestor = common::ingest_all(&common::send_more_money_frames());
    let log = ingestor.trace().log();
    let initial = DomainSnapshot::initial(&common::send_more_money());

    for prefix in 0..log.len() {
        let before = replay(&initial, log, prefix);
        for later in prefix + 1..=log.len() {
            let after = replay(&initial, log, later);
            let transition = ReplayTransition::new(&before, &after);
            assert!(
                ReplayInvariants::check_all(&transition).is_ok(),
                "prefix {} -> {}",
                prefix,
                later
            );
        }
    }
}

#[test]
fn test_narrowing_detects_widened_domain() {
    let puzzle = common::send_more_money();
    let ingestor = common::ingest_all(&common::send_more_money_frames());
    let initial = DomainSnapshot::initial(&puzzle);

    // Running a transition backwards widens M again
    let narrowed = replay(&initial, ingestor.trace().log(), 4);
    let fresh = replay(&initial, ingestor.trace().log(), 0);
    let transition = ReplayTransition::new(&narrowed, &fresh);
    assert!(!MonotonicNarrowing::holds(&transition));
    assert!(!AssignmentStability::holds(&transition));
}

#[test]
fn test_final_replay_resolves_every_letter() {
    let ingestor = common::ingest_all(&common::send_more_money_frames());
    let log = ingestor.trace().log();
    let state = replay(
        &DomainSnapshot::initial(&common::send_more_money()),
        log,
        log.len(),
    );

    assert_eq!(state.assignments().len(), 8);
    for (letter, value) in common::SEND_MORE_MONEY {
        let variable = Variable::Letter(letter);
        assert_eq!(state.assignment_of(variable), Some(value), "{}", letter);
        assert_eq!(state.snapshot().get(variable), Some(Domain::singleton(value)));
    }
    assert_eq!(state.snapshot().get(Variable::Carry(4)), Some(Domain::singleton(1)));
    assert_eq!(state.snapshot().get(Variable::Carry(3)), Some(Domain::singleton(0)));
}

#[test]
fn test_assignments_in_first_seen_order() {
    let ingestor = common::ingest_all(&common::send_more_money_frames());
    let order: Vec<String> = derive_assignments(ingestor.trace().log())
        .iter()
        .map(|a| a.to_string())
        .collect();
    assert_eq!(
        order,
        ["M = 1", "S = 9", "O = 0", "E = 5", "N = 6", "R = 8", "D = 7", "Y = 2"]
    );
}

#[test]
fn test_assignment_prunes_value_from_other_letters() {
    let ingestor = common::ingest_all(&common::send_more_money_frames());
    let initial = DomainSnapshot::initial(&common::send_more_money());

    // After "First assignment: M = 1"
    let state = replay(&initial, ingestor.trace().log(), 3);
    assert_eq!(state.snapshot().get(Variable::Letter('M')), Some(Domain::singleton(1)));
    assert_eq!(
        state.snapshot().get(Variable::Letter('S')),
        Some(Domain::nonzero().without(1))
    );
    assert_eq!(
        state.snapshot().get(Variable::Letter('E')),
        Some(Domain::digits().without(1))
    );
    // Carries are not pruned by letter assignments
    assert_eq!(state.snapshot().get(Variable::Carry(1)), Some(Domain::binary()));
}

#[test]
fn test_replayer_matches_replay_forward_and_back() {
    let ingestor = common::ingest_all(&common::send_more_money_frames());
    let log = ingestor.trace().log();
    let initial = DomainSnapshot::initial(&common::send_more_money());
    let mut replayer = Replayer::new(initial.clone());

    let order = [0, 3, 4, 12, 20, 7, 7, 0, 19, 2, 25];
    for prefix in order {
        let expected = replay(&initial, log, prefix);
        assert_eq!(replayer.state_at(log, prefix), &expected, "prefix {}", prefix);
    }
}

#[test]
fn test_replayer_follows_growing_log() {
    let frames = common::send_more_money_frames();
    let initial = DomainSnapshot::initial(&common::send_more_money());
    let mut ingestor = crypta_trace::EventIngestor::new();
    let mut replayer = Replayer::new(initial.clone());

    for frame in &frames {
        ingestor.ingest_frame(frame).expect("frame should ingest");
        let log = ingestor.trace().log();
        let expected = replay(&initial, log, log.len());
        assert_eq!(replayer.state_at(log, log.len()), &expected);
    }
}
