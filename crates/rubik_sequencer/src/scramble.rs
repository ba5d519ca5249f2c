// SPDX-License-Identifier: MIT OR Apache-2.0
//! Random scramble generation.

use crate::token::{Move, MoveBatch, Puzzle, Turn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Longest scramble that will be generated
pub const MAX_SCRAMBLE_LEN: usize = 1000;

/// Random move generator
pub struct Scrambler {
    rng: StdRng,
}

impl Scrambler {
    /// Create a scrambler seeded from the OS
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a reproducible scrambler
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generate `len` random moves for a puzzle.
    ///
    /// The same face never appears twice in a row.
    pub fn generate(&mut self, len: usize, puzzle: Puzzle) -> MoveBatch {
        let len = if len > MAX_SCRAMBLE_LEN {
            tracing::warn!("Scramble length {len} clamped to {MAX_SCRAMBLE_LEN}");
            MAX_SCRAMBLE_LEN
        } else {
            len
        };

        let faces = puzzle.faces();
        let mut moves: MoveBatch = Vec::with_capacity(len);
        while moves.len() < len {
            let Some(&face) = faces.choose(&mut self.rng) else {
                break;
            };
            if moves.last().is_some_and(|prev| prev.face == face) {
                continue;
            }
            let Some(&turn) = Turn::ALL.choose(&mut self.rng) else {
                break;
            };
            moves.push(Move::new(face, turn));
        }

        tracing::debug!("Generated {} move scramble", moves.len());
        moves
    }
}

impl Default for Scrambler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scramble_length() {
        let mut scrambler = Scrambler::seeded(1);
        assert_eq!(scrambler.generate(25, Puzzle::Standard).len(), 25);
        assert!(scrambler.generate(0, Puzzle::Standard).is_empty());
    }

    #[test]
    fn test_scramble_clamped() {
        let mut scrambler = Scrambler::seeded(2);
        assert_eq!(
            scrambler.generate(MAX_SCRAMBLE_LEN + 5, Puzzle::Pocket).len(),
            MAX_SCRAMBLE_LEN
        );
    }

    #[test]
    fn test_no_repeated_faces() {
        let mut scrambler = Scrambler::seeded(3);
        let moves = scrambler.generate(200, Puzzle::Standard);
        for pair in moves.windows(2) {
            assert_ne!(pair[0].face, pair[1].face);
        }
    }

    #[test]
    fn test_pocket_has_no_slices() {
        let mut scrambler = Scrambler::seeded(4);
        let moves = scrambler.generate(200, Puzzle::Pocket);
        assert!(moves.iter().all(|m| !m.face.is_slice()));
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let a = Scrambler::seeded(42).generate(30, Puzzle::Standard);
        let b = Scrambler::seeded(42).generate(30, Puzzle::Standard);
        assert_eq!(a, b);
    }
}
