// SPDX-License-Identifier: MIT OR Apache-2.0
//! Interactive session.
//!
//! Ties the move timeline, the animation scheduler and the cube state
//! together and turns user actions into played batches.

use crate::settings::Settings;
use rubik_sequencer::{
    format_sequence, AnimationScheduler, BatchId, CubeState, Move, MoveBatch, SchedulerEvent,
    Scrambler, Timeline,
};
use rubik_solver::{SolverClient, SolverError};
use std::time::Duration;
use thiserror::Error;

/// Something the user asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Single face turn from direct input
    Turn(Move),
    /// Play a whole sequence
    Apply(MoveBatch),
    /// Redo the next move in the timeline
    StepForward,
    /// Undo the last applied move
    StepBackward,
    /// Scramble with this many random moves
    Scramble(usize),
    /// Ask the solver for a solution and play it
    Solve,
}

/// Why an action did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// A batch is still playing
    Busy,
    /// Cursor is at the end of the timeline
    NothingToRedo,
    /// Cursor is before the first move
    NothingToUndo,
    /// There were no moves to play
    EmptyBatch,
}

/// Result of handling an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// A batch started playing
    Started(BatchId),
    /// Nothing happened
    Ignored(IgnoreReason),
}

impl ActionOutcome {
    /// Whether a batch started
    pub fn is_started(&self) -> bool {
        matches!(self, Self::Started(_))
    }
}

/// Session errors
#[derive(Debug, Error)]
pub enum SessionError {
    /// `Solve` without a solver process
    #[error("No solver configured")]
    NoSolver,

    /// The solver failed
    #[error(transparent)]
    Solver(#[from] SolverError),
}

/// One player session
pub struct Session {
    settings: Settings,
    timeline: Timeline,
    scheduler: AnimationScheduler,
    cube: CubeState,
    scrambler: Scrambler,
    solver: Option<SolverClient>,
}

impl Session {
    /// Create a session on a solved cube
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            timeline: Timeline::new(),
            scheduler: AnimationScheduler::new(),
            cube: CubeState::solved(),
            scrambler: Scrambler::new(),
            solver: None,
        }
    }

    /// Attach a running solver
    pub fn with_solver(mut self, solver: SolverClient) -> Self {
        self.solver = Some(solver);
        self
    }

    /// Use a specific scrambler
    pub fn with_scrambler(mut self, scrambler: Scrambler) -> Self {
        self.scrambler = scrambler;
        self
    }

    /// Handle a user action
    pub fn handle(&mut self, action: Action) -> Result<ActionOutcome, SessionError> {
        if self.scheduler.is_busy() {
            tracing::debug!("Ignoring {action:?} while a batch is playing");
            return Ok(ActionOutcome::Ignored(IgnoreReason::Busy));
        }

        let outcome = match action {
            Action::Turn(m) => self.record_and_play(vec![m]),
            Action::Apply(batch) => self.record_and_play(batch),
            Action::StepForward => match self.timeline.step_forward() {
                Some(m) => self.play(vec![m]),
                None => ActionOutcome::Ignored(IgnoreReason::NothingToRedo),
            },
            Action::StepBackward => match self.timeline.step_backward() {
                Some(m) => self.play(vec![m]),
                None => ActionOutcome::Ignored(IgnoreReason::NothingToUndo),
            },
            Action::Scramble(len) => {
                let batch = self.scrambler.generate(len, self.settings.puzzle);
                tracing::info!("Scramble: {}", format_sequence(&batch));
                self.record_and_play(batch)
            }
            Action::Solve => {
                let solution = self.request_solution()?;
                self.record_and_play(solution)
            }
        };

        if let ActionOutcome::Ignored(reason) = outcome {
            tracing::debug!("Action ignored: {reason:?}");
        }
        Ok(outcome)
    }

    fn request_solution(&mut self) -> Result<MoveBatch, SessionError> {
        let applied = self.timeline.applied().to_vec();
        let solver = self.solver.as_mut().ok_or(SessionError::NoSolver)?;
        match solver.solve_moves(&applied) {
            Ok(solution) => {
                tracing::info!("Solution: {}", format_sequence(&solution));
                Ok(solution)
            }
            Err(e) => {
                tracing::warn!("Solver failed: {e}");
                if e.is_fatal() {
                    self.solver = None;
                }
                Err(e.into())
            }
        }
    }

    fn record_and_play(&mut self, batch: MoveBatch) -> ActionOutcome {
        if batch.is_empty() {
            return ActionOutcome::Ignored(IgnoreReason::EmptyBatch);
        }
        self.timeline.append_or_insert(&batch);
        self.play(batch)
    }

    fn play(&mut self, batch: MoveBatch) -> ActionOutcome {
        match self
            .scheduler
            .submit(batch, self.settings.step_duration())
        {
            Some(id) => ActionOutcome::Started(id),
            None => ActionOutcome::Ignored(IgnoreReason::EmptyBatch),
        }
    }

    /// Advance playback by `delta`, returning the scheduler events
    pub fn update(&mut self, delta: Duration) -> Vec<SchedulerEvent> {
        self.scheduler.advance(delta);
        let events = self.scheduler.take_events();

        for event in &events {
            match event {
                SchedulerEvent::StepBegin(step) => {
                    tracing::debug!("Turning {} ({}/{})", step.mv, step.index + 1, step.total);
                }
                SchedulerEvent::StepEnd(step) => self.cube.apply(step.mv),
                SchedulerEvent::BatchComplete { steps, .. } => {
                    tracing::info!("Played {steps} moves");
                    if self.cube.is_solved() {
                        tracing::info!("Cube solved");
                    }
                }
            }
        }

        events
    }

    /// Nothing is playing
    pub fn is_idle(&self) -> bool {
        !self.scheduler.is_busy()
    }

    /// Cube state after every finished step
    pub fn cube(&self) -> &CubeState {
        &self.cube
    }

    /// Move history
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Settings in use
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Whether a solver is attached
    pub fn has_solver(&self) -> bool {
        self.solver.is_some()
    }

    /// Stop the solver process, if any
    pub fn shutdown(&mut self) {
        if let Some(mut solver) = self.solver.take() {
            solver.close();
        }
    }
}
