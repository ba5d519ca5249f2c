// SPDX-License-Identifier: MIT OR Apache-2.0
//! Bit-packed cube state.
//!
//! Corner slots (0..8): URF, UFL, ULB, UBR, DFR, DLF, DBL, DRB.
//! Edge slots (0..12): UR, UF, UL, UB, DR, DF, DL, DB, FR, FL, BL, BR.
//!
//! Each slot stores the piece currently sitting there and its orientation.
//! Corner slots use 3 position bits + 2 orientation bits, edge slots use
//! 4 position bits + 1 orientation bit, so both sets fit in one `u64` each.

use crate::token::{Face, Move};
use serde::{Deserialize, Serialize};

/// Number of corner slots
pub const CORNER_COUNT: usize = 8;

/// Number of edge slots
pub const EDGE_COUNT: usize = 12;

const SLOT_BITS: usize = 5;
const SLOT_MASK: u64 = 0b1_1111;
const CORNER_POSITION_BITS: usize = 3;
const EDGE_POSITION_BITS: usize = 4;

/// A piece in a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cubie {
    /// Home index of the piece
    pub position: u8,
    /// Twist (corners, 0..3) or flip (edges, 0..2)
    pub orientation: u8,
}

impl Cubie {
    /// Create a cubie
    pub fn new(position: u8, orientation: u8) -> Self {
        Self {
            position,
            orientation,
        }
    }
}

/// One quarter turn as slot cycles.
///
/// Pieces move `slots[i - 1] -> slots[i]` and gain `twist[i]` / `flip`.
struct QuarterTurn {
    corners: Option<([usize; 4], [u8; 4])>,
    edges: [usize; 4],
    flip: u8,
}

const NO_TWIST: [u8; 4] = [0, 0, 0, 0];
const TWIST: [u8; 4] = [2, 1, 2, 1];

fn quarter_turn(face: Face) -> QuarterTurn {
    match face {
        Face::U => QuarterTurn {
            corners: Some(([0, 1, 2, 3], NO_TWIST)),
            edges: [0, 1, 2, 3],
            flip: 0,
        },
        Face::D => QuarterTurn {
            corners: Some(([7, 6, 5, 4], NO_TWIST)),
            edges: [7, 6, 5, 4],
            flip: 0,
        },
        Face::R => QuarterTurn {
            corners: Some(([7, 4, 0, 3], TWIST)),
            edges: [11, 4, 8, 0],
            flip: 0,
        },
        Face::L => QuarterTurn {
            corners: Some(([5, 6, 2, 1], TWIST)),
            edges: [9, 6, 10, 2],
            flip: 0,
        },
        Face::F => QuarterTurn {
            corners: Some(([4, 5, 1, 0], TWIST)),
            edges: [8, 5, 9, 1],
            flip: 1,
        },
        Face::B => QuarterTurn {
            corners: Some(([6, 7, 3, 2], TWIST)),
            edges: [10, 7, 11, 3],
            flip: 1,
        },
        // Centers are not tracked, so slices only cycle their edges.
        Face::E => QuarterTurn {
            corners: None,
            edges: [9, 8, 11, 10],
            flip: 0,
        },
        Face::M => QuarterTurn {
            corners: None,
            edges: [1, 5, 7, 3],
            flip: 1,
        },
        Face::S => QuarterTurn {
            corners: None,
            edges: [2, 0, 4, 6],
            flip: 1,
        },
    }
}

/// Packed corner/edge state of a cube
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CubeState {
    corners: u64,
    edges: u64,
}

impl CubeState {
    /// Solved cube
    pub fn solved() -> Self {
        let mut state = Self {
            corners: 0,
            edges: 0,
        };
        for i in 0..CORNER_COUNT {
            state.set_corner(i, Cubie::new(i as u8, 0));
        }
        for i in 0..EDGE_COUNT {
            state.set_edge(i, Cubie::new(i as u8, 0));
        }
        state
    }

    /// Cube obtained by applying `moves` to a solved cube
    pub fn from_moves(moves: &[Move]) -> Self {
        let mut state = Self::solved();
        state.apply_all(moves);
        state
    }

    /// Get the cubie in a corner slot
    pub fn corner(&self, index: usize) -> Cubie {
        assert!(index < CORNER_COUNT, "corner index {index} out of range");
        let slot = (self.corners >> (index * SLOT_BITS)) & SLOT_MASK;
        Cubie::new(
            (slot & ((1 << CORNER_POSITION_BITS) - 1)) as u8,
            (slot >> CORNER_POSITION_BITS) as u8,
        )
    }

    /// Set the cubie in a corner slot
    pub fn set_corner(&mut self, index: usize, cubie: Cubie) {
        assert!(index < CORNER_COUNT, "corner index {index} out of range");
        let slot = (u64::from(cubie.position) & ((1 << CORNER_POSITION_BITS) - 1))
            | ((u64::from(cubie.orientation) & 0b11) << CORNER_POSITION_BITS);
        let shift = index * SLOT_BITS;
        self.corners = (self.corners & !(SLOT_MASK << shift)) | (slot << shift);
    }

    /// Get the cubie in an edge slot
    pub fn edge(&self, index: usize) -> Cubie {
        assert!(index < EDGE_COUNT, "edge index {index} out of range");
        let slot = (self.edges >> (index * SLOT_BITS)) & SLOT_MASK;
        Cubie::new(
            (slot & ((1 << EDGE_POSITION_BITS) - 1)) as u8,
            (slot >> EDGE_POSITION_BITS) as u8,
        )
    }

    /// Set the cubie in an edge slot
    pub fn set_edge(&mut self, index: usize, cubie: Cubie) {
        assert!(index < EDGE_COUNT, "edge index {index} out of range");
        let slot = (u64::from(cubie.position) & ((1 << EDGE_POSITION_BITS) - 1))
            | ((u64::from(cubie.orientation) & 0b1) << EDGE_POSITION_BITS);
        let shift = index * SLOT_BITS;
        self.edges = (self.edges & !(SLOT_MASK << shift)) | (slot << shift);
    }

    /// Check whether every piece is home with zero orientation
    pub fn is_solved(&self) -> bool {
        *self == Self::solved()
    }

    /// Check that positions form permutations and orientations are in range
    pub fn is_valid(&self) -> bool {
        let mut seen_corners = [false; CORNER_COUNT];
        for i in 0..CORNER_COUNT {
            let c = self.corner(i);
            let pos = usize::from(c.position);
            if pos >= CORNER_COUNT || seen_corners[pos] || c.orientation > 2 {
                return false;
            }
            seen_corners[pos] = true;
        }

        let mut seen_edges = [false; EDGE_COUNT];
        for i in 0..EDGE_COUNT {
            let e = self.edge(i);
            let pos = usize::from(e.position);
            if pos >= EDGE_COUNT || seen_edges[pos] || e.orientation > 1 {
                return false;
            }
            seen_edges[pos] = true;
        }

        true
    }

    /// Apply one move
    pub fn apply(&mut self, m: Move) {
        let turn = quarter_turn(m.face);
        let mut next = *self;
        for _ in 0..m.turn.quarter_turns() {
            next.apply_quarter(&turn);
        }
        *self = next;
    }

    /// Apply moves in order
    pub fn apply_all(&mut self, moves: &[Move]) {
        for m in moves {
            self.apply(*m);
        }
    }

    fn apply_quarter(&mut self, turn: &QuarterTurn) {
        if let Some((slots, twist)) = turn.corners {
            let old = slots.map(|s| self.corner(s));
            for i in 0..4 {
                let src = old[(i + 3) % 4];
                self.set_corner(
                    slots[i],
                    Cubie::new(src.position, (src.orientation + twist[i]) % 3),
                );
            }
        }

        let old = turn.edges.map(|s| self.edge(s));
        for i in 0..4 {
            let src = old[(i + 3) % 4];
            self.set_edge(
                turn.edges[i],
                Cubie::new(src.position, (src.orientation + turn.flip) % 2),
            );
        }
    }
}

impl Default for CubeState {
    fn default() -> Self {
        Self::solved()
    }
}
