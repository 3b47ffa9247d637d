//! The recorded traces under `demos/` replay to their expected answers.

use crypta_trace::{
    Command, Engine, ExamplePuzzle, FileTransport, Outcome, PlaybackState, Speed, ViewState,
};
use std::path::PathBuf;
use std::sync::Arc;

fn demo(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos").join(name)
}

fn final_view(name: &str, example: ExamplePuzzle) -> ViewState {
    let source = FileTransport::new(demo(name));
    let events = source.read_events().expect("demo file readable");
    let mut engine = Engine::new(Arc::new(source), Speed::default());
    engine.begin(example.puzzle());
    for event in events {
        engine.handle_transport(event);
    }
    engine.apply(Command::SeekEnd);
    engine.view()
}

#[test]
fn test_stream_and_batch_demos_agree() {
    let streamed = final_view("send_more_money.jsonl", ExamplePuzzle::SendMoreMoney);
    let batched = final_view("send_more_money.json", ExamplePuzzle::SendMoreMoney);

    for view in [&streamed, &batched] {
        assert_eq!(view.outcome, Outcome::Solved);
        assert_eq!(view.playback.state, PlaybackState::Finished);
        assert!(view.at_final_step);
        assert!(view.error.is_none());
    }
    assert_eq!(streamed.domains, batched.domains);
    assert_eq!(streamed.assignments, batched.assignments);
    assert_eq!(streamed.solution, batched.solution);

    let solution = streamed.solution.expect("answer");
    assert_eq!(solution.spell("MONEY"), "10652");
}

#[tokio::test(start_paused = true)]
async fn test_file_transport_replays_through_connection() {
    let transport: Arc<dyn crypta_trace::Transport> =
        Arc::new(FileTransport::new(demo("one_one_one.jsonl")));
    let puzzle = crypta_trace::Puzzle::new("ONE", "ONE", "ONE").expect("valid puzzle");
    let mut connection = crypta_trace::Connection::open(1, transport, puzzle);

    assert_eq!(
        connection.next_event().await,
        Some(crypta_trace::TransportEvent::Reachable)
    );
    let mut frames = 0;
    while let Some(event) = connection.next_event().await {
        match event {
            crypta_trace::TransportEvent::Frame(_) => frames += 1,
            crypta_trace::TransportEvent::Closed => break,
            other => panic!("unexpected event {:?}", other),
        }
    }
    assert_eq!(frames, 8);
}
