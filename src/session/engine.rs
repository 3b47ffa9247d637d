//! The single state container for a viewer session.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

use super::view::{HISTORY_LIMIT, PlaybackView, ViewState};
use super::{Command, Flow};
use crate::replay::{Replayer, reconcile};
use crate::transport::{Connection, ConnectionStatus, Transport, TransportEvent};
use crate::{
    DomainSnapshot, EventIngestor, Ingested, PlaybackController, Puzzle, Speed, Trace,
};

/// Raw solver output waiting to be ingested.
enum Input {
    Frame(String),
    Document(String),
}

/// State owned by one solve; replaced wholesale by the next.
#[derive(Debug)]
struct SolveSession {
    puzzle: Puzzle,
    ingestor: EventIngestor,
    replayer: Replayer,
}

impl SolveSession {
    fn new(puzzle: Puzzle) -> Self {
        let replayer = Replayer::new(DomainSnapshot::initial(&puzzle));
        Self {
            puzzle,
            ingestor: EventIngestor::new(),
            replayer,
        }
    }
}

/// Session state: the current solve, its playback and its connection.
///
/// All methods take `&mut self`; the engine is meant to be owned by a
/// single task (see [`Driver`](super::Driver)). At most one
/// [`Connection`] is alive at a time, and every path that ends a solve
/// drops it.
#[derive(Debug)]
pub struct Engine {
    transport: Arc<dyn Transport>,
    session: Option<SolveSession>,
    controller: PlaybackController,
    connection: Option<Connection>,
    opened: u64,
    status: ConnectionStatus,
    show_answer: bool,
    error: Option<String>,
}

impl Engine {
    /// Creates an idle engine that fetches traces from `transport`.
    pub fn new(transport: Arc<dyn Transport>, speed: Speed) -> Self {
        Self {
            transport,
            session: None,
            controller: PlaybackController::new(speed),
            connection: None,
            opened: 0,
            status: ConnectionStatus::default(),
            show_answer: false,
            error: None,
        }
    }

    /// Playback controller.
    pub fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    /// Trace of the current solve.
    pub fn trace(&self) -> Option<&Trace> {
        self.session.as_ref().map(|s| s.ingestor.trace())
    }

    /// Puzzle of the current solve.
    pub fn puzzle(&self) -> Option<&Puzzle> {
        self.session.as_ref().map(|s| &s.puzzle)
    }

    /// True while a connection is open.
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Result of the last backend health check.
    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// Last user-facing error.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True while auto-advancing.
    pub fn is_playing(&self) -> bool {
        self.controller.is_playing()
    }

    /// Current auto-advance period.
    pub fn period(&self) -> Duration {
        self.controller.speed().period()
    }

    /// Starts a fresh solve for `puzzle` without connecting.
    ///
    /// Any previous connection is released first. Transport events are
    /// then fed in with [`Engine::handle_transport`].
    #[instrument(skip(self), fields(puzzle = %puzzle))]
    pub fn begin(&mut self, puzzle: Puzzle) {
        self.release("new solve");
        info!("Beginning solve");
        self.session = Some(SolveSession::new(puzzle));
        self.controller.begin_loading();
        self.show_answer = false;
        self.error = None;
    }

    /// Starts a fresh solve and connects the transport.
    ///
    /// The connection checks the backend first; if the check fails the
    /// solve stops with an empty trace and the error is shown. Must be
    /// called from within a Tokio runtime.
    #[instrument(skip(self), fields(puzzle = %puzzle))]
    pub fn solve(&mut self, puzzle: Puzzle) {
        self.begin(puzzle.clone());
        self.opened += 1;
        self.status = ConnectionStatus::Checking;
        self.connection = Some(Connection::open(
            self.opened,
            Arc::clone(&self.transport),
            puzzle,
        ));
    }

    /// Checks whether the backend is up without starting a solve.
    ///
    /// Skipped while a connection is open, since that connection already
    /// checked. Must be called from within a Tokio runtime.
    #[instrument(skip(self))]
    pub fn check_backend(&mut self) {
        if self.connection.is_some() {
            debug!("Connection open, skipping health check");
            return;
        }
        self.opened += 1;
        self.status = ConnectionStatus::Checking;
        self.error = None;
        self.connection = Some(Connection::check(self.opened, Arc::clone(&self.transport)));
    }

    /// Releases everything and returns to idle.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        self.release("reset");
        self.session = None;
        self.controller.reset();
        self.show_answer = false;
        self.error = None;
    }

    fn release(&mut self, reason: &str) {
        if let Some(connection) = self.connection.take() {
            debug!(id = connection.id(), reason, "Dropping connection");
            if self.status == ConnectionStatus::Checking {
                self.status = ConnectionStatus::Unknown;
            }
        }
    }

    /// Waits for the current connection's next event.
    ///
    /// Never resolves while no connection is open. `None` means the
    /// connection's task ended without a final event.
    pub async fn next_transport_event(&mut self) -> Option<TransportEvent> {
        match self.connection.as_mut() {
            Some(connection) => connection.next_event().await,
            None => std::future::pending().await,
        }
    }

    /// Feeds one transport event into the current solve.
    ///
    /// Health check results are recorded even with no solve active.
    #[instrument(skip(self, event))]
    pub fn handle_transport(&mut self, event: TransportEvent) {
        let input = match event {
            TransportEvent::Reachable => {
                info!("Backend connected");
                self.status = ConnectionStatus::Connected;
                if self.session.is_none() {
                    self.release("health check done");
                }
                return;
            }
            TransportEvent::Unreachable(message) => {
                warn!(%message, "Backend disconnected");
                self.status = ConnectionStatus::Disconnected;
                self.stop_solve(message, "backend unreachable");
                return;
            }
            TransportEvent::Failed(message) => {
                error!(%message, "Transport failed");
                self.stop_solve(message, "source failed");
                return;
            }
            TransportEvent::Closed => {
                if let Some(session) = self.session.as_mut() {
                    session.ingestor.finish_stream();
                    self.controller.mark_stream_closed();
                }
                self.release("source closed");
                return;
            }
            TransportEvent::Frame(frame) => Input::Frame(frame),
            TransportEvent::Document(document) => Input::Document(document),
        };

        let Some(session) = self.session.as_mut() else {
            debug!("Dropping transport event with no active solve");
            self.release("no active solve");
            return;
        };

        let result = match &input {
            Input::Frame(frame) => session.ingestor.ingest_frame(frame),
            Input::Document(document) => session.ingestor.ingest_document(document),
        };

        let trace = session.ingestor.trace();
        match result {
            Ok(Ingested::Step(_)) => self.controller.set_total(trace.log().len()),
            Ok(Ingested::Completed) => {
                self.controller.set_total(trace.log().len());
                if trace.solution().is_some() {
                    self.controller.mark_solution_known();
                }
                self.release("trace complete");
                self.controller.mark_stream_closed();
            }
            Ok(Ingested::Equations) | Ok(Ingested::Ignored) => {}
            Err(e) => {
                error!(error = %e, "Ingestion failed");
                self.error = Some(format!("Error parsing server response: {}", e.kind));
                self.release("ingest error");
                self.controller.mark_stream_closed();
            }
        }
    }

    /// Ends the current solve's input with a user-facing error.
    fn stop_solve(&mut self, message: String, reason: &str) {
        self.error = Some(message);
        self.release(reason);
        if let Some(session) = self.session.as_mut() {
            session.ingestor.finish_stream();
            self.controller.mark_stream_closed();
        }
    }

    /// Applies one command.
    #[instrument(skip(self), fields(command = %command))]
    pub fn apply(&mut self, command: Command) -> Flow {
        match command {
            Command::Solve(puzzle) => self.solve(puzzle),
            Command::CheckBackend => self.check_backend(),
            Command::Play => self.controller.play(),
            Command::Pause => self.controller.pause(),
            Command::TogglePlay => self.controller.toggle(),
            Command::Step => self.controller.step(),
            Command::StepBack => self.controller.step_back(),
            Command::Seek(index) => self.controller.seek(index),
            Command::SeekStart => self.controller.seek_start(),
            Command::SeekEnd => self.controller.seek_end(),
            Command::SetSpeed(percent) => self.controller.set_speed(Speed::new(percent)),
            Command::Faster => self.controller.set_speed(self.controller.speed().faster()),
            Command::Slower => self.controller.set_speed(self.controller.speed().slower()),
            Command::ToggleAnswer => {
                if self.trace().is_some_and(|t| t.solution().is_some()) {
                    self.show_answer = !self.show_answer;
                } else {
                    debug!("No answer to show");
                }
            }
            Command::Reset => self.reset(),
            Command::Shutdown => {
                self.release("shutdown");
                return Flow::Shutdown;
            }
        }
        Flow::Continue
    }

    /// Advances playback by one timer period. Returns true if the step
    /// changed.
    pub fn tick(&mut self) -> bool {
        self.controller.tick()
    }

    fn playback_view(&self) -> PlaybackView {
        let speed = self.controller.speed();
        PlaybackView {
            state: self.controller.state(),
            is_playing: self.controller.is_playing(),
            current_index: self.controller.current_index(),
            total_steps: self.controller.total_steps(),
            speed_percent: speed.percent(),
            period_ms: u64::try_from(speed.period().as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Derives the presentation snapshot for the current step.
    ///
    /// At the last step of a completed trace, an explicit assignment list
    /// replaces the replayed one and the answer, if any, is reconciled in.
    pub fn view(&mut self) -> ViewState {
        let playback = self.playback_view();
        let connected = self.is_connected();
        let prefix = self.controller.prefix_len();

        let Some(session) = self.session.as_mut() else {
            return ViewState {
                playback,
                backend: self.status,
                connected,
                error: self.error.clone(),
                ..ViewState::default()
            };
        };

        let trace = session.ingestor.trace();
        let state = session.replayer.state_at(trace.log(), prefix);
        let mut domains = state.snapshot().clone();
        let mut assignments = state.assignments().clone();
        let mut reconciled = BTreeSet::new();

        let at_final_step = *trace.complete() && prefix == trace.log().len();
        if at_final_step {
            if let Some(explicit) = trace.explicit_assignments() {
                assignments = explicit.clone();
            }
            if let Some(solution) = trace.solution() {
                (domains, assignments, reconciled) =
                    reconcile(&domains, &assignments, solution).into_parts();
            }
        }

        let records = &trace.log().records()[..prefix.min(trace.log().len())];
        let current_equation = records.iter().rev().find_map(|r| r.equation().clone());
        let current_letter = records.iter().rev().find_map(|r| r.current_letter().clone());
        let history = records[records.len().saturating_sub(HISTORY_LIMIT)..].to_vec();

        ViewState {
            puzzle: Some(session.puzzle.clone()),
            playback,
            domains,
            assignments,
            reconciled,
            equations: trace.equation_list().to_vec(),
            current_equation,
            current_step: records.last().cloned(),
            history,
            current_letter,
            solution: trace.solution().clone(),
            answer_visible: trace.solution().is_some() && (self.show_answer || at_final_step),
            outcome: *trace.outcome(),
            error: self.error.clone(),
            connected,
            backend: self.status,
            at_final_step,
        }
    }
}
