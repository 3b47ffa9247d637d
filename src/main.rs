//! Crypta Trace - unified CLI
//!
//! Watches a solver service live, replays recorded traces in the terminal
//! viewer, or prints the replayed state at a single step.

#![warn(missing_docs)]

mod cli;
mod tui;

use anyhow::{Result, bail};
use clap::Parser;
use cli::{Cli, Command, PuzzleArgs};
use crypta_trace::{
    Command as SessionCommand, Engine, ExamplePuzzle, FileTransport, Speed, TransportEvent,
    TransportMode, ViewState, ViewerConfig,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = ViewerConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Watch {
            puzzle,
            api_url,
            mode,
            speed,
        } => run_watch(config, puzzle, api_url, mode, speed).await,
        Command::Replay {
            file,
            puzzle,
            delay_ms,
            speed,
        } => run_replay(config, file, puzzle, delay_ms, speed).await,
        Command::Inspect {
            file,
            puzzle,
            step,
            json,
        } => run_inspect(file, puzzle, step, json),
        Command::Examples => {
            list_examples();
            Ok(())
        }
    }
}

/// Solve on the service and open the viewer.
async fn run_watch(
    mut config: ViewerConfig,
    puzzle: PuzzleArgs,
    api_url: Option<String>,
    mode: Option<TransportMode>,
    speed: Option<u8>,
) -> Result<()> {
    let puzzle = puzzle.puzzle()?;

    if let Some(api_url) = api_url {
        config = config.with_api_url(api_url);
    }
    if let Some(mode) = mode {
        config = config.with_mode(mode);
    }
    if let Some(speed) = speed {
        config = config.with_speed_percent(speed);
    }

    tui::init_file_logging(config.log_file())?;
    info!(api_url = %config.api_url(), mode = %config.mode(), "Starting watch");

    let transport = config.build_transport()?;
    let engine = Engine::new(transport, config.speed());
    tui::run_viewer(engine, puzzle).await
}

/// Replay a trace file in the viewer.
async fn run_replay(
    config: ViewerConfig,
    file: PathBuf,
    puzzle: PuzzleArgs,
    delay_ms: u64,
    speed: Option<u8>,
) -> Result<()> {
    let puzzle = puzzle.puzzle()?;
    if !file.is_file() {
        bail!("Trace file not found: {}", file.display());
    }

    tui::init_file_logging(config.log_file())?;
    info!(file = %file.display(), delay_ms, "Starting replay");

    let transport = FileTransport::new(file).with_delay(Duration::from_millis(delay_ms));
    let speed = speed.map(Speed::new).unwrap_or_else(|| config.speed());
    let engine = Engine::new(Arc::new(transport), speed);
    tui::run_viewer(engine, puzzle).await
}

/// Print the state at one step of a trace file.
#[instrument(skip(puzzle))]
fn run_inspect(file: PathBuf, puzzle: PuzzleArgs, step: Option<usize>, json: bool) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let puzzle = puzzle.puzzle()?;
    let source = FileTransport::new(&file);
    let events = source.read_events()?;

    let mut engine = Engine::new(Arc::new(source), Speed::default());
    engine.begin(puzzle);
    for event in events {
        engine.handle_transport(event);
    }
    engine.handle_transport(TransportEvent::Closed);

    let last = engine.controller().last_index();
    let index = step.unwrap_or(last);
    if index > last {
        warn!(index, last, "Step past the end, showing the last step");
    }
    engine.apply(SessionCommand::Seek(index));

    let view = engine.view();
    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print_view(&view);
    }
    Ok(())
}

fn print_view(view: &ViewState) {
    if let Some(puzzle) = &view.puzzle {
        println!("{}", puzzle);
    }
    let playback = &view.playback;
    if playback.total_steps == 0 {
        println!("step -/0  outcome {}", view.outcome);
    } else {
        println!(
            "step {}/{}  outcome {}",
            playback.current_index + 1,
            playback.total_steps,
            view.outcome
        );
    }
    if let Some(step) = &view.current_step {
        println!("  [{}] {}", step.kind(), step.message());
    }
    if let Some(equation) = &view.current_equation {
        println!("  equation: {}", equation);
    }

    println!();
    println!("Domains:");
    for (variable, domain) in view.domains.iter() {
        let marker = if view.reconciled.contains(&variable) { " *" } else { "" };
        println!("  {:>7} {}{}", variable.to_string(), domain, marker);
    }

    println!();
    println!("Assignments:");
    for assignment in &view.assignments {
        println!("  {}", assignment);
    }

    if let Some(solution) = &view.solution {
        println!();
        println!("Answer: {}", solution);
    }
    if let Some(error) = &view.error {
        println!();
        println!("Error: {}", error);
    }
}

fn list_examples() {
    println!("Built-in examples (use with --example):");
    for example in ExamplePuzzle::all() {
        println!("  {:<24} {}", example.to_string(), example.puzzle());
    }
}
