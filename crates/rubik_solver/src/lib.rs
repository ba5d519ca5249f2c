// SPDX-License-Identifier: MIT OR Apache-2.0
//! Client for the external cube solver.
//!
//! The solver is a separate executable speaking a line protocol over
//! stdin/stdout. This crate provides:
//! - [`SolverClient`]: process lifecycle and bounded request/response
//! - [`protocol`]: request encoding and response decoding
//! - [`ensure_solver_built`]: rebuilding the executable with `make`

pub mod build;
pub mod client;
pub mod error;
pub mod protocol;

pub use build::{ensure_solver_built, BuildOutcome, SolverBuild};
pub use client::{SolverClient, SolverConfig, DEFAULT_TIMEOUT_MS};
pub use error::{BuildError, SolverError};
pub use protocol::Response;
