// SPDX-License-Identifier: MIT OR Apache-2.0
//! Rubik player
//!
//! Plays a move sequence (or a random scramble) on a simulated cube one
//! rotation at a time, then asks the external solver for a solution and
//! plays that back.
//!
//! Usage: `rubik [MOVES]` or `rubik --save-settings`
//!
//! Settings are read from `rubik.ron` in the working directory.

use rubik_app::{
    Action, ActionOutcome, Session, SessionError, Settings, SettingsError, SETTINGS_FILE_NAME,
};
use rubik_sequencer::{format_sequence, parse_sequence, Scrambler, ValidationError};
use rubik_solver::{ensure_solver_built, BuildOutcome, SolverClient};
use std::path::Path;
use std::thread;
use std::time::Instant;
use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("Invalid move sequence: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,rubik_app=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting rubik v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(std::env::args().nth(1)) {
        match e {
            AppError::Validation(_) => eprintln!("{e}"),
            _ => tracing::error!("{e}"),
        }
        std::process::exit(1);
    }
}

fn run(arg: Option<String>) -> Result<(), AppError> {
    let path = Path::new(SETTINGS_FILE_NAME);

    if arg.as_deref() == Some("--save-settings") {
        Settings::default().save(path)?;
        tracing::info!("Wrote default settings to {path:?}");
        return Ok(());
    }

    let settings = Settings::load(path)?;

    // Validate before starting anything
    let typed = arg
        .map(|text| parse_sequence(&text, settings.puzzle))
        .transpose()?;

    let solver = start_solver(&settings);
    let initial_scramble = settings.initial_scramble;
    let seed = settings.seed;
    let mut session = Session::new(settings);
    if let Some(seed) = seed {
        session = session.with_scrambler(Scrambler::seeded(seed));
    }
    if let Some(solver) = solver {
        session = session.with_solver(solver);
    }

    let action = match typed {
        Some(moves) => {
            tracing::info!("Applying {}", format_sequence(&moves));
            Action::Apply(moves)
        }
        None => Action::Scramble(initial_scramble),
    };
    if session.handle(action)?.is_started() {
        play_until_idle(&mut session);
    } else {
        tracing::info!("Nothing to play");
    }

    if session.has_solver() {
        match session.handle(Action::Solve) {
            Ok(ActionOutcome::Started(batch)) => {
                tracing::debug!("Playing solution batch {:?}", batch.0);
                play_until_idle(&mut session);
            }
            Ok(ActionOutcome::Ignored(_)) => tracing::info!("Nothing to solve"),
            Err(e) => tracing::warn!("Could not solve: {e}"),
        }
    }

    tracing::info!(
        "Finished with {} moves in the timeline, cube {}",
        session.timeline().len(),
        if session.cube().is_solved() { "solved" } else { "scrambled" }
    );
    session.shutdown();
    Ok(())
}

/// Build and start the solver if one is configured
fn start_solver(settings: &Settings) -> Option<SolverClient> {
    let config = settings.solver.as_ref()?;

    if let Some(build) = &settings.solver_build {
        match ensure_solver_built(build) {
            Ok(BuildOutcome::UpToDate) => {}
            Ok(BuildOutcome::Built { elapsed }) => {
                tracing::info!("Solver rebuilt in {:.2}s", elapsed.as_secs_f64());
            }
            Err(e) => {
                tracing::warn!("Solver build failed, continuing without solver: {e}");
                return None;
            }
        }
    }

    match SolverClient::spawn(config) {
        Ok(client) => Some(client),
        Err(e) => {
            tracing::warn!("Continuing without solver: {e}");
            None
        }
    }
}

/// Drive the session on the frame tick until the current batch is done
fn play_until_idle(session: &mut Session) {
    let tick = session.settings().tick();
    let mut last = Instant::now();
    while !session.is_idle() {
        thread::sleep(tick);
        let now = Instant::now();
        session.update(now - last);
        last = now;
    }
}
