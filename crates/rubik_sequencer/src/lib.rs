// SPDX-License-Identifier: MIT OR Apache-2.0
//! Move sequencing for the Rubik player.
//!
//! This crate provides:
//! - Move tokens and move-string validation
//! - Per-move slab rotations for the renderer
//! - Random scrambles
//! - Bit-packed cube state
//! - An undo/redo move timeline
//! - A paced animation scheduler
//!
//! ## Architecture
//!
//! Input produces move batches, the [`Timeline`] records them at its
//! cursor and the [`AnimationScheduler`] plays them one rotation at a
//! time. Both are single-threaded and driven by the host's frame loop.

pub mod cube;
pub mod rotation;
pub mod scheduler;
pub mod scramble;
pub mod timeline;
pub mod token;

pub use cube::{CubeState, Cubie, CORNER_COUNT, EDGE_COUNT};
pub use rotation::{Axis, Rotation};
pub use scheduler::{
    step_period, AnimationScheduler, AnimationStep, BatchId, SchedulerEvent, SchedulerState,
    DEFAULT_STEP_DURATION,
};
pub use scramble::{Scrambler, MAX_SCRAMBLE_LEN};
pub use timeline::{Timeline, TimelineError};
pub use token::{
    format_sequence, parse_sequence, reverse_sequence, Face, Move, MoveBatch, Puzzle, Turn,
    ValidationError,
};
