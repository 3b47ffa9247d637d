//! Terminal viewer.

mod keys;
mod ui;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, Stdout};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::EnvFilter;

use crypta_trace::{Command, DEFAULT_LOG_FILTER, Driver, DriverHandle, Engine, Puzzle};

use keys::{KeyAction, map_key};

/// How long to wait for a key before redrawing.
const INPUT_POLL: Duration = Duration::from_millis(50);

/// Sends logs to `path` so they do not draw over the terminal.
pub fn init_file_logging(path: &Path) -> Result<()> {
    let log_file = std::fs::File::create(path)?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::sync::Arc::new(log_file))
        .with_ansi(false)
        .try_init(); // Don't panic if already initialized
    Ok(())
}

/// Raw-mode alternate screen, restored on drop.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        debug!("Restoring terminal");
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Runs the viewer until the user quits.
///
/// The engine is moved into a driver task; `puzzle` is solved right away.
#[instrument(skip(engine), fields(puzzle = %puzzle))]
pub async fn run_viewer(engine: Engine, puzzle: Puzzle) -> Result<()> {
    info!("Starting viewer");

    let (driver, handle) = Driver::new(engine);
    let driver_task = tokio::spawn(driver.run());
    handle.send(Command::Solve(puzzle.clone()));

    let result = {
        let mut guard = TerminalGuard::enter()?;
        event_loop(&mut guard.terminal, &handle, &puzzle).await
    };

    handle.send(Command::Shutdown);
    if let Err(e) = driver_task.await {
        error!(error = %e, "Driver task failed");
    }

    if let Err(e) = &result {
        error!(error = ?e, "Viewer loop error");
    }
    info!("Viewer stopped");
    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    handle: &DriverHandle,
    puzzle: &Puzzle,
) -> Result<()> {
    loop {
        let view = handle.latest();
        terminal.draw(|frame| ui::draw(frame, &view))?;

        if event::poll(INPUT_POLL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match map_key(key, puzzle) {
                    Some(KeyAction::Quit) => {
                        info!("Quit requested");
                        break;
                    }
                    Some(KeyAction::Send(command)) => {
                        debug!(%command, "Key command");
                        if !handle.send(command) {
                            break;
                        }
                    }
                    None => {}
                }
            }
        }

        tokio::task::yield_now().await;
    }
    Ok(())
}
