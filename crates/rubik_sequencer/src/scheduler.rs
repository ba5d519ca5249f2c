// SPDX-License-Identifier: MIT OR Apache-2.0
//! Animation scheduler for move batches.
//!
//! Plays a batch one move at a time. Each step announces its rotation,
//! then waits `D + D/2` (the animation plus a settle margin) before the
//! next step may begin. The scheduler never blocks: the host drives it by
//! calling [`AnimationScheduler::advance`] from its frame or timer loop and
//! drains [`SchedulerEvent`]s with [`AnimationScheduler::take_events`].

use crate::rotation::Rotation;
use crate::token::{Move, MoveBatch};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Default rotation duration
pub const DEFAULT_STEP_DURATION: Duration = Duration::from_millis(300);

/// Unique identifier for a submitted batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchId(pub Uuid);

impl BatchId {
    /// Create a new random batch ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BatchId {
    fn default() -> Self {
        Self::new()
    }
}

/// Scheduler state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulerState {
    /// No batch in flight
    #[default]
    Idle,
    /// Step `index` is animating or settling
    Running {
        /// Index of the current step in the batch
        index: usize,
        /// Time left before the step is complete
        remaining: Duration,
    },
}

/// One move being played
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationStep {
    /// Batch this step belongs to
    pub batch: BatchId,
    /// Position in the batch
    pub index: usize,
    /// Batch length
    pub total: usize,
    /// Move being played
    pub mv: Move,
    /// Rotation the renderer should animate
    pub rotation: Rotation,
    /// Nominal rotation duration
    pub duration: Duration,
}

impl AnimationStep {
    /// Whether this is the last step of its batch
    pub fn is_last(&self) -> bool {
        self.index + 1 == self.total
    }
}

/// Events emitted while playing
#[derive(Debug, Clone, PartialEq)]
pub enum SchedulerEvent {
    /// Regroup pieces and start rotating
    StepBegin(AnimationStep),
    /// The step's rotation and settle time are over
    StepEnd(AnimationStep),
    /// All steps of a batch finished
    BatchComplete {
        /// Finished batch
        batch: BatchId,
        /// Number of steps played
        steps: usize,
    },
}

/// Batch currently being played
#[derive(Debug, Clone)]
struct ActiveBatch {
    id: BatchId,
    moves: MoveBatch,
    duration: Duration,
}

/// Time a step occupies: rotation plus half again to settle
pub fn step_period(duration: Duration) -> Duration {
    duration.saturating_add(duration / 2)
}

/// Serializes move playback so only one rotation is in flight
#[derive(Debug, Default)]
pub struct AnimationScheduler {
    state: SchedulerState,
    batch: Option<ActiveBatch>,
    /// Events produced since the last `take_events`
    pending_events: Vec<SchedulerEvent>,
}

impl AnimationScheduler {
    /// Create an idle scheduler
    pub fn new() -> Self {
        Self::default()
    }

    /// Start playing a batch.
    ///
    /// Returns `None` without side effects while another batch is running
    /// or when the batch is empty.
    pub fn submit(&mut self, batch: MoveBatch, duration: Duration) -> Option<BatchId> {
        if self.is_busy() {
            tracing::debug!("Scheduler busy, rejecting {} move batch", batch.len());
            return None;
        }
        if batch.is_empty() {
            return None;
        }

        let id = BatchId::new();
        tracing::debug!("Playing batch {:?} ({} moves)", id.0, batch.len());
        self.batch = Some(ActiveBatch {
            id,
            moves: batch,
            duration,
        });
        self.begin_step(0);
        Some(id)
    }

    /// Play one move from direct input; ignored while busy
    pub fn submit_single(&mut self, mv: Move, duration: Duration) -> Option<BatchId> {
        self.submit(vec![mv], duration)
    }

    /// Advance playback by `delta`.
    ///
    /// Completes as many steps as the elapsed time covers, in order.
    pub fn advance(&mut self, delta: Duration) {
        let mut budget = delta;

        while let SchedulerState::Running { index, remaining } = self.state {
            if budget < remaining {
                self.state = SchedulerState::Running {
                    index,
                    remaining: remaining - budget,
                };
                break;
            }
            budget -= remaining;
            self.finish_step(index);
        }
    }

    fn begin_step(&mut self, index: usize) {
        let Some(step) = self.step_at(index) else {
            self.state = SchedulerState::Idle;
            return;
        };
        self.state = SchedulerState::Running {
            index,
            remaining: step_period(step.duration),
        };
        self.pending_events.push(SchedulerEvent::StepBegin(step));
    }

    fn finish_step(&mut self, index: usize) {
        if let Some(step) = self.step_at(index) {
            self.pending_events.push(SchedulerEvent::StepEnd(step));
            if !step.is_last() {
                self.begin_step(index + 1);
                return;
            }
        }

        self.state = SchedulerState::Idle;
        if let Some(batch) = self.batch.take() {
            tracing::debug!("Batch {:?} complete", batch.id.0);
            self.pending_events.push(SchedulerEvent::BatchComplete {
                batch: batch.id,
                steps: batch.moves.len(),
            });
        }
    }

    fn step_at(&self, index: usize) -> Option<AnimationStep> {
        let batch = self.batch.as_ref()?;
        let mv = *batch.moves.get(index)?;
        Some(AnimationStep {
            batch: batch.id,
            index,
            total: batch.moves.len(),
            mv,
            rotation: mv.rotation(),
            duration: batch.duration,
        })
    }

    /// Get pending events and clear them
    pub fn take_events(&mut self) -> Vec<SchedulerEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Is a batch in flight
    pub fn is_busy(&self) -> bool {
        matches!(self.state, SchedulerState::Running { .. })
    }

    /// Current state
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Step currently animating or settling
    pub fn current_step(&self) -> Option<AnimationStep> {
        match self.state {
            SchedulerState::Running { index, .. } => self.step_at(index),
            SchedulerState::Idle => None,
        }
    }

    /// Moves left in the current batch, including the current one
    pub fn remaining_moves(&self) -> usize {
        match (self.state, &self.batch) {
            (SchedulerState::Running { index, .. }, Some(batch)) => batch.moves.len() - index,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{parse_sequence, Face, Puzzle};

    const D: Duration = Duration::from_millis(200);

    fn moves(text: &str) -> MoveBatch {
        parse_sequence(text, Puzzle::Standard).unwrap()
    }

    #[test]
    fn test_submit_begins_first_step() {
        let mut scheduler = AnimationScheduler::new();
        let id = scheduler.submit(moves("R U"), D).unwrap();
        assert!(scheduler.is_busy());

        let events = scheduler.take_events();
        assert_eq!(events.len(), 1);
        match &events[0] {
            SchedulerEvent::StepBegin(step) => {
                assert_eq!(step.batch, id);
                assert_eq!(step.index, 0);
                assert_eq!(step.mv, Move::clockwise(Face::R));
                assert_eq!(step.rotation, Move::clockwise(Face::R).rotation());
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_busy_rejects_submissions() {
        let mut scheduler = AnimationScheduler::new();
        assert!(scheduler.submit(moves("R U"), D).is_some());
        assert!(scheduler.submit(moves("F"), D).is_none());
        assert!(scheduler
            .submit_single(Move::clockwise(Face::L), D)
            .is_none());
        assert_eq!(scheduler.remaining_moves(), 2);
    }

    #[test]
    fn test_empty_batch_rejected() {
        let mut scheduler = AnimationScheduler::new();
        assert!(scheduler.submit(Vec::new(), D).is_none());
        assert!(!scheduler.is_busy());
    }

    #[test]
    fn test_step_waits_for_settle_margin() {
        let mut scheduler = AnimationScheduler::new();
        scheduler.submit(moves("R U"), D);
        scheduler.take_events();

        // The nominal duration alone is not enough
        scheduler.advance(D);
        assert!(scheduler.take_events().is_empty());
        assert_eq!(scheduler.current_step().map(|s| s.index), Some(0));

        scheduler.advance(D / 2);
        let events = scheduler.take_events();
        assert!(matches!(events[0], SchedulerEvent::StepEnd(s) if s.index == 0));
        assert!(matches!(events[1], SchedulerEvent::StepBegin(s) if s.index == 1));
    }

    #[test]
    fn test_steps_never_overlap() {
        let mut scheduler = AnimationScheduler::new();
        let batch = moves("U R B L D2 F U' R' B' L' D' F'");
        let n = batch.len();
        let id = scheduler.submit(batch, D).unwrap();

        let mut events = scheduler.take_events();
        while scheduler.is_busy() {
            scheduler.advance(Duration::from_millis(16));
            events.extend(scheduler.take_events());
        }

        let mut in_flight: Option<usize> = None;
        let mut begins = 0;
        for event in &events {
            match event {
                SchedulerEvent::StepBegin(step) => {
                    assert!(in_flight.is_none(), "step {} began while another was running", step.index);
                    assert_eq!(step.index, begins);
                    in_flight = Some(step.index);
                    begins += 1;
                }
                SchedulerEvent::StepEnd(step) => {
                    assert_eq!(in_flight, Some(step.index));
                    in_flight = None;
                }
                SchedulerEvent::BatchComplete { batch, steps } => {
                    assert_eq!(*batch, id);
                    assert_eq!(*steps, n);
                }
            }
        }
        assert_eq!(begins, n);
        assert!(matches!(events.last(), Some(SchedulerEvent::BatchComplete { .. })));
    }

    #[test]
    fn test_large_delta_finishes_in_order() {
        let mut scheduler = AnimationScheduler::new();
        scheduler.submit(moves("R U F"), D);
        scheduler.advance(Duration::from_secs(10));

        let kinds: Vec<&str> = scheduler
            .take_events()
            .iter()
            .map(|e| match e {
                SchedulerEvent::StepBegin(_) => "begin",
                SchedulerEvent::StepEnd(_) => "end",
                SchedulerEvent::BatchComplete { .. } => "complete",
            })
            .collect();
        assert_eq!(
            kinds,
            ["begin", "end", "begin", "end", "begin", "end", "complete"]
        );
        assert!(!scheduler.is_busy());
    }

    #[test]
    fn test_accepts_new_batch_when_idle() {
        let mut scheduler = AnimationScheduler::new();
        scheduler.submit(moves("R"), D);
        scheduler.advance(step_period(D));
        assert!(!scheduler.is_busy());
        assert!(scheduler.submit(moves("U"), D).is_some());
    }

    #[test]
    fn test_double_move_is_one_step() {
        let mut scheduler = AnimationScheduler::new();
        scheduler.submit(moves("R2"), D);
        scheduler.advance(step_period(D));
        let begins = scheduler
            .take_events()
            .iter()
            .filter(|e| matches!(e, SchedulerEvent::StepBegin(_)))
            .count();
        assert_eq!(begins, 1);
    }

    #[test]
    fn test_huge_durations_saturate() {
        assert_eq!(step_period(Duration::MAX), Duration::MAX);

        let mut scheduler = AnimationScheduler::new();
        assert!(scheduler
            .submit_single(Move::clockwise(Face::R), Duration::MAX)
            .is_some());
        scheduler.advance(Duration::MAX);
        assert!(!scheduler.is_busy());
        scheduler.advance(Duration::MAX);
        assert!(matches!(
            scheduler.take_events().last(),
            Some(SchedulerEvent::BatchComplete { steps: 1, .. })
        ));
    }
}
