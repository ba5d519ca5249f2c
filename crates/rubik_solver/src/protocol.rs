// SPDX-License-Identifier: MIT OR Apache-2.0
//! Line protocol spoken with the solver process.
//!
//! One request line in, one response line out:
//! - request: space-separated moves
//! - response: `SOLVED`, `ERROR: <message>`, or space-separated moves
//! - shutdown: `QUIT`

use crate::error::SolverError;
use rubik_sequencer::{format_sequence, Move, MoveBatch};

/// Response for an already solved cube
pub const SOLVED: &str = "SOLVED";

/// Prefix of an error response
pub const ERROR_PREFIX: &str = "ERROR: ";

/// Shutdown request
pub const QUIT: &str = "QUIT";

/// A decoded response line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Nothing to do
    Solved,
    /// The solver rejected the request
    Error(String),
    /// Solution tokens, unvalidated
    Solution(Vec<String>),
}

impl Response {
    /// Decode one response line (terminator already stripped)
    pub fn parse(line: &str) -> Self {
        if line == SOLVED {
            Self::Solved
        } else if let Some(message) = line.strip_prefix(ERROR_PREFIX) {
            Self::Error(message.to_string())
        } else {
            Self::Solution(line.split_whitespace().map(str::to_string).collect())
        }
    }

    /// Turn the response into a move batch
    pub fn into_moves(self) -> Result<MoveBatch, SolverError> {
        match self {
            Self::Solved => Ok(Vec::new()),
            Self::Error(message) => Err(SolverError::Rejected(message)),
            Self::Solution(tokens) => tokens
                .iter()
                .map(|t| {
                    t.parse::<Move>()
                        .map_err(|_| SolverError::Malformed(t.clone()))
                })
                .collect(),
        }
    }
}

/// Encode a request line for a move batch
pub fn encode_request(moves: &[Move]) -> String {
    encode_raw(&format_sequence(moves))
}

/// Encode a request line from raw text
pub fn encode_raw(moves: &str) -> String {
    let mut line = moves.trim_end_matches(['\r', '\n']).to_string();
    line.push('\n');
    line
}

/// Strip a trailing line terminator
pub fn strip_terminator(line: &str) -> &str {
    line.trim_end_matches(['\r', '\n'])
}
