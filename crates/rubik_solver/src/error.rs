// SPDX-License-Identifier: MIT OR Apache-2.0
//! Solver client errors.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors from talking to the solver process
#[derive(Debug, Error)]
pub enum SolverError {
    /// No response within the timeout; the process is left running
    #[error("Solver timed out after {0:?}")]
    Timeout(Duration),

    /// The solver answered with an `ERROR:` line
    #[error("Solver rejected request: {0}")]
    Rejected(String),

    /// The solution contained a token that is not a move
    #[error("Solver returned malformed move \"{0}\"")]
    Malformed(String),

    /// The process could not be started
    #[error("Failed to spawn solver {program:?}: {source}")]
    Spawn {
        /// Program that was launched
        program: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The process is gone (output closed or input broken)
    #[error("Solver process exited{}", format_stderr(.stderr))]
    Exited {
        /// Last lines the process wrote to stderr
        stderr: Vec<String>,
    },

    /// I/O failure while talking to the process
    #[error("Solver I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_stderr(stderr: &[String]) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {}", stderr.join(" | "))
    }
}

impl SolverError {
    /// Whether the client must be recreated after this error
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Spawn { .. } | Self::Exited { .. } | Self::Io(_))
    }
}

/// Errors from building the solver executable
#[derive(Debug, Error)]
pub enum BuildError {
    /// `make` is not on `PATH`
    #[error("Could not find `make` on PATH")]
    MakeNotFound,

    /// `make` did not finish in time
    #[error("Solver build timed out after {0:?}")]
    TimedOut(Duration),

    /// `make` failed or produced no executable
    #[error("Solver build failed (exit {code:?}). {output}")]
    Failed {
        /// Exit code, if the process exited normally
        code: Option<i32>,
        /// Captured build output
        output: String,
    },

    /// I/O failure while running `make`
    #[error("Solver build I/O error: {0}")]
    Io(#[from] std::io::Error),
}
