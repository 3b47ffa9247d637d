//! The single writer: one task that owns the engine.

use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::watch;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};
use tracing::{debug, info, instrument};

use super::{Command, Engine, Flow, ViewState};
use crate::transport::TransportEvent;

/// Why the loop woke up.
enum Wake {
    Command(Option<Command>),
    Transport(Option<TransportEvent>),
    Tick,
}

/// Playback timer, armed only while playing.
struct Ticker {
    period: Duration,
    interval: Interval,
}

impl Ticker {
    fn new(period: Duration) -> Self {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { period, interval }
    }
}

async fn next_tick(ticker: &mut Option<Ticker>) {
    match ticker {
        Some(ticker) => {
            ticker.interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// Client side of a running [`Driver`].
#[derive(Debug, Clone)]
pub struct DriverHandle {
    commands: UnboundedSender<Command>,
    views: watch::Receiver<ViewState>,
}

impl DriverHandle {
    /// Queues a command. Returns false once the driver has stopped.
    pub fn send(&self, command: Command) -> bool {
        self.commands.send(command).is_ok()
    }

    /// The most recently published view.
    pub fn latest(&self) -> ViewState {
        self.views.borrow().clone()
    }

    /// A receiver that is notified on every published view.
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.views.clone()
    }
}

/// Owns an [`Engine`] and serializes every mutation of it.
///
/// Commands, transport events and playback ticks are handled one at a
/// time in a single loop, and a fresh [`ViewState`] is published after
/// each.
pub struct Driver {
    engine: Engine,
    commands: UnboundedReceiver<Command>,
    views: watch::Sender<ViewState>,
}

impl Driver {
    /// Wraps `engine`, returning the driver and a handle to it.
    pub fn new(mut engine: Engine) -> (Self, DriverHandle) {
        let (command_tx, commands) = mpsc::unbounded_channel();
        let (views, view_rx) = watch::channel(engine.view());
        (
            Self {
                engine,
                commands,
                views,
            },
            DriverHandle {
                commands: command_tx,
                views: view_rx,
            },
        )
    }

    /// Runs until [`Command::Shutdown`] or until every handle is dropped,
    /// then returns the engine.
    #[instrument(skip(self))]
    pub async fn run(mut self) -> Engine {
        info!("Driver started");
        let mut ticker: Option<Ticker> = None;

        loop {
            self.sync_ticker(&mut ticker);

            let wake = tokio::select! {
                command = self.commands.recv() => Wake::Command(command),
                event = self.engine.next_transport_event() => Wake::Transport(event),
                _ = next_tick(&mut ticker) => Wake::Tick,
            };

            match wake {
                Wake::Command(None) => {
                    debug!("All handles dropped");
                    break;
                }
                Wake::Command(Some(command)) => {
                    if self.engine.apply(command) == Flow::Shutdown {
                        break;
                    }
                }
                Wake::Transport(Some(event)) => self.engine.handle_transport(event),
                Wake::Transport(None) => self.engine.handle_transport(TransportEvent::Closed),
                Wake::Tick => {
                    self.engine.tick();
                }
            }

            self.publish();
        }

        self.engine.reset();
        self.publish();
        info!("Driver stopped");
        self.engine
    }

    fn sync_ticker(&self, ticker: &mut Option<Ticker>) {
        if !self.engine.is_playing() {
            if ticker.take().is_some() {
                debug!("Playback timer disarmed");
            }
            return;
        }
        let period = self.engine.period();
        if ticker.as_ref().is_some_and(|t| t.period == period) {
            return;
        }
        debug!(period_ms = period.as_millis() as u64, "Playback timer armed");
        *ticker = Some(Ticker::new(period));
    }

    fn publish(&mut self) {
        self.views.send_replace(self.engine.view());
    }
}
