// SPDX-License-Identifier: MIT OR Apache-2.0
//! Visual rotation for each move.
//!
//! The renderer regroups every piece whose coordinate on `axis` equals
//! `layer` under a temporary anchor and turns the anchor by `angle`.

use crate::token::{Face, Move, Turn};
use serde::{Deserialize, Serialize};

/// Rotation axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Left-right axis
    X,
    /// Down-up axis
    Y,
    /// Back-front axis
    Z,
}

/// Slab rotation for one move
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    /// Axis to rotate around
    pub axis: Axis,
    /// Slab selector on the axis (-1, 0 or 1)
    pub layer: i8,
    /// Angle in degrees
    pub angle: f32,
}

impl Rotation {
    /// Rotation of a clockwise quarter turn of `face`
    pub fn quarter(face: Face) -> Self {
        let (axis, layer, angle) = match face {
            Face::F => (Axis::Z, -1, 90.0),
            Face::R => (Axis::X, 1, 90.0),
            Face::U => (Axis::Y, 1, 90.0),
            Face::B => (Axis::Z, 1, -90.0),
            Face::L => (Axis::X, -1, -90.0),
            Face::D => (Axis::Y, -1, -90.0),
            Face::E => (Axis::Y, 0, -90.0),
            Face::M => (Axis::X, 0, -90.0),
            Face::S => (Axis::Z, 0, 90.0),
        };
        Self { axis, layer, angle }
    }

    /// Rotation for a full move
    pub fn for_move(m: Move) -> Self {
        let quarter = Self::quarter(m.face);
        let angle = match m.turn {
            Turn::Clockwise => quarter.angle,
            Turn::Double => quarter.angle * 2.0,
            Turn::Prime => -quarter.angle,
        };
        Self { angle, ..quarter }
    }
}

impl Move {
    /// Visual rotation for this move
    pub fn rotation(&self) -> Rotation {
        Rotation::for_move(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prime_negates_angle() {
        for face in Face::ALL {
            let cw = Move::clockwise(face).rotation();
            let ccw = Move::prime(face).rotation();
            assert_eq!(cw.axis, ccw.axis);
            assert_eq!(cw.layer, ccw.layer);
            assert_eq!(cw.angle, -ccw.angle);
        }
    }

    #[test]
    fn test_double_turn_is_half_rotation() {
        let r = Move::double(Face::L).rotation();
        assert_eq!(r.axis, Axis::X);
        assert_eq!(r.layer, -1);
        assert_eq!(r.angle, -180.0);
    }

    #[test]
    fn test_slices_use_middle_layer() {
        for face in [Face::E, Face::M, Face::S] {
            assert_eq!(Rotation::quarter(face).layer, 0);
        }
    }
}
