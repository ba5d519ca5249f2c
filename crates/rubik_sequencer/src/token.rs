// SPDX-License-Identifier: MIT OR Apache-2.0
//! Move tokens and move-string validation.
//!
//! A move is a face (or middle slice) plus an optional modifier:
//! - no suffix: clockwise quarter turn
//! - `2`: double turn
//! - `'`: prime (counter-clockwise) quarter turn

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// An ordered batch of moves played as one sweep
pub type MoveBatch = Vec<Move>;

/// Validation errors for move text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Character outside the move alphabet
    #[error("Invalid character '{0}' in moves")]
    InvalidCharacter(char),

    /// Face that the puzzle variant does not have
    #[error("Face '{face}' is not available on the {puzzle} puzzle")]
    UnsupportedFace {
        /// Offending face
        face: Face,
        /// Puzzle variant the text was parsed for
        puzzle: Puzzle,
    },

    /// Modifier with no face before it
    #[error("Modifier '{0}' has no preceding face")]
    DanglingModifier(char),

    /// Two faces written back to back
    #[error("Faces '{0}' and '{1}' must be separated by a space")]
    AdjacentFaces(char, char),

    /// Token longer than face + one modifier
    #[error("Invalid move token \"{0}\"")]
    TokenTooLong(String),

    /// Empty token
    #[error("Empty move token")]
    EmptyToken,
}

/// Cube face or middle slice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Face {
    /// Front
    F,
    /// Right
    R,
    /// Up
    U,
    /// Back
    B,
    /// Left
    L,
    /// Down
    D,
    /// Equator slice (between U and D, turns like D)
    E,
    /// Middle slice (between L and R, turns like L)
    M,
    /// Standing slice (between F and B, turns like F)
    S,
}

impl Face {
    /// The six outer faces
    pub const PRIMARY: [Face; 6] = [Face::F, Face::R, Face::U, Face::B, Face::L, Face::D];

    /// All faces including middle slices
    pub const ALL: [Face; 9] = [
        Face::F,
        Face::R,
        Face::U,
        Face::B,
        Face::L,
        Face::D,
        Face::E,
        Face::M,
        Face::S,
    ];

    /// Parse a face letter (case-insensitive)
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'F' => Some(Self::F),
            'R' => Some(Self::R),
            'U' => Some(Self::U),
            'B' => Some(Self::B),
            'L' => Some(Self::L),
            'D' => Some(Self::D),
            'E' => Some(Self::E),
            'M' => Some(Self::M),
            'S' => Some(Self::S),
            _ => None,
        }
    }

    /// Upper-case letter for this face
    pub fn as_char(&self) -> char {
        match self {
            Self::F => 'F',
            Self::R => 'R',
            Self::U => 'U',
            Self::B => 'B',
            Self::L => 'L',
            Self::D => 'D',
            Self::E => 'E',
            Self::M => 'M',
            Self::S => 'S',
        }
    }

    /// Whether this is a middle slice
    pub fn is_slice(&self) -> bool {
        matches!(self, Self::E | Self::M | Self::S)
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Turn amount and direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Turn {
    /// Quarter turn clockwise
    #[default]
    Clockwise,
    /// Half turn
    Double,
    /// Quarter turn counter-clockwise
    Prime,
}

impl Turn {
    /// All turn kinds
    pub const ALL: [Turn; 3] = [Turn::Clockwise, Turn::Double, Turn::Prime];

    /// Number of clockwise quarter turns this is equivalent to
    pub fn quarter_turns(&self) -> usize {
        match self {
            Self::Clockwise => 1,
            Self::Double => 2,
            Self::Prime => 3,
        }
    }

    /// Textual suffix
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Clockwise => "",
            Self::Double => "2",
            Self::Prime => "'",
        }
    }
}

/// Puzzle variant, deciding which faces are legal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Puzzle {
    /// 2x2x2, outer faces only
    Pocket,
    /// 3x3x3, outer faces plus middle slices
    #[default]
    Standard,
}

impl Puzzle {
    /// Faces that can be turned on this puzzle
    pub fn faces(&self) -> &'static [Face] {
        match self {
            Self::Pocket => &Face::PRIMARY,
            Self::Standard => &Face::ALL,
        }
    }

    /// Check whether a face exists on this puzzle
    pub fn supports(&self, face: Face) -> bool {
        !face.is_slice() || *self == Self::Standard
    }
}

impl fmt::Display for Puzzle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pocket => write!(f, "2x2"),
            Self::Standard => write!(f, "3x3"),
        }
    }
}

/// A single move token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Move {
    /// Face being turned
    pub face: Face,
    /// Turn amount
    pub turn: Turn,
}

impl Move {
    /// Create a move
    pub const fn new(face: Face, turn: Turn) -> Self {
        Self { face, turn }
    }

    /// Clockwise quarter turn of a face
    pub const fn clockwise(face: Face) -> Self {
        Self::new(face, Turn::Clockwise)
    }

    /// Half turn of a face
    pub const fn double(face: Face) -> Self {
        Self::new(face, Turn::Double)
    }

    /// Counter-clockwise quarter turn of a face
    pub const fn prime(face: Face) -> Self {
        Self::new(face, Turn::Prime)
    }

    /// The move that undoes this one.
    ///
    /// Double turns are their own inverse.
    pub fn inverse(&self) -> Self {
        let turn = match self.turn {
            Turn::Clockwise => Turn::Prime,
            Turn::Prime => Turn::Clockwise,
            Turn::Double => Turn::Double,
        };
        Self::new(self.face, turn)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.face, self.turn.suffix())
    }
}

impl FromStr for Move {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let Some(first) = chars.next() else {
            return Err(ValidationError::EmptyToken);
        };
        let face = match Face::from_char(first) {
            Some(face) => face,
            None if is_modifier(first) => return Err(ValidationError::DanglingModifier(first)),
            None => return Err(ValidationError::InvalidCharacter(first)),
        };
        let turn = match chars.next() {
            None => Turn::Clockwise,
            Some('2') => Turn::Double,
            Some('\'') => Turn::Prime,
            Some(c) if Face::from_char(c).is_some() => {
                return Err(ValidationError::AdjacentFaces(first, c))
            }
            Some(c) => return Err(ValidationError::InvalidCharacter(c)),
        };
        if chars.next().is_some() {
            return Err(ValidationError::TokenTooLong(s.to_string()));
        }
        Ok(Self::new(face, turn))
    }
}

impl TryFrom<String> for Move {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Move> for String {
    fn from(value: Move) -> Self {
        value.to_string()
    }
}

fn is_modifier(c: char) -> bool {
    c == '2' || c == '\''
}

/// Validate and parse a whitespace-separated move string.
///
/// Empty input yields an empty batch.
pub fn parse_sequence(text: &str, puzzle: Puzzle) -> Result<MoveBatch, ValidationError> {
    // Whole-string character checks come first so the reported error
    // matches the first class of mistake, not the first token.
    for c in text.chars() {
        if !(c.is_whitespace() || is_modifier(c) || Face::from_char(c).is_some()) {
            return Err(ValidationError::InvalidCharacter(c));
        }
    }
    for c in text.chars() {
        if let Some(face) = Face::from_char(c) {
            if !puzzle.supports(face) {
                return Err(ValidationError::UnsupportedFace { face, puzzle });
            }
        }
    }

    for token in text.split_whitespace() {
        let mut prev: Option<char> = None;
        for c in token.chars() {
            if is_modifier(c) && !prev.is_some_and(|p| Face::from_char(p).is_some()) {
                return Err(ValidationError::DanglingModifier(c));
            }
            if let Some(p) = prev {
                if Face::from_char(p).is_some() && Face::from_char(c).is_some() {
                    return Err(ValidationError::AdjacentFaces(p, c));
                }
            }
            prev = Some(c);
        }
    }

    text.split_whitespace().map(str::parse).collect()
}

/// Render moves as a space-separated string
pub fn format_sequence(moves: &[Move]) -> String {
    moves
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// The sequence that undoes `moves`: reversed order, each move inverted
pub fn reverse_sequence(moves: &[Move]) -> MoveBatch {
    moves.iter().rev().map(Move::inverse).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverse_is_involution() {
        for face in Face::ALL {
            for turn in Turn::ALL {
                let m = Move::new(face, turn);
                assert_eq!(m.inverse().inverse(), m);
            }
        }
    }

    #[test]
    fn test_double_is_self_inverse() {
        let m = Move::double(Face::R);
        assert_eq!(m.inverse(), m);
        assert_eq!(Move::clockwise(Face::U).inverse(), Move::prime(Face::U));
        assert_eq!(Move::prime(Face::U).inverse(), Move::clockwise(Face::U));
    }

    #[test]
    fn test_parse_simple_sequence() {
        let moves = parse_sequence("F R U", Puzzle::Standard).unwrap();
        assert_eq!(
            moves,
            vec![
                Move::clockwise(Face::F),
                Move::clockwise(Face::R),
                Move::clockwise(Face::U),
            ]
        );
    }

    #[test]
    fn test_parse_modifiers_and_case() {
        let moves = parse_sequence("u R' d2  m", Puzzle::Standard).unwrap();
        assert_eq!(format_sequence(&moves), "U R' D2 M");
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse_sequence("   ", Puzzle::Standard).unwrap().is_empty());
    }

    #[test]
    fn test_reject_both_modifiers() {
        assert_eq!(
            parse_sequence("F2'", Puzzle::Standard),
            Err(ValidationError::DanglingModifier('\''))
        );
        assert_eq!(
            "F2'".parse::<Move>(),
            Err(ValidationError::TokenTooLong("F2'".to_string()))
        );
    }

    #[test]
    fn test_reject_invalid_character() {
        assert_eq!(
            parse_sequence("F X", Puzzle::Standard),
            Err(ValidationError::InvalidCharacter('X'))
        );
        assert_eq!(
            parse_sequence("F3", Puzzle::Standard),
            Err(ValidationError::InvalidCharacter('3'))
        );
    }

    #[test]
    fn test_reject_dangling_modifier() {
        assert_eq!(
            parse_sequence("F '", Puzzle::Standard),
            Err(ValidationError::DanglingModifier('\''))
        );
        assert_eq!(
            parse_sequence("2F", Puzzle::Standard),
            Err(ValidationError::DanglingModifier('2'))
        );
    }

    #[test]
    fn test_reject_adjacent_faces() {
        assert_eq!(
            parse_sequence("FR", Puzzle::Standard),
            Err(ValidationError::AdjacentFaces('F', 'R'))
        );
    }

    #[test]
    fn test_pocket_rejects_slices() {
        assert!(parse_sequence("F R U", Puzzle::Pocket).is_ok());
        assert_eq!(
            parse_sequence("F M", Puzzle::Pocket),
            Err(ValidationError::UnsupportedFace {
                face: Face::M,
                puzzle: Puzzle::Pocket,
            })
        );
    }

    #[test]
    fn test_reverse_sequence_reverses_order() {
        let moves = parse_sequence("R U2 F'", Puzzle::Standard).unwrap();
        assert_eq!(format_sequence(&reverse_sequence(&moves)), "F U2 R'");
    }

    #[test]
    fn test_move_serde_as_text() {
        let m = Move::prime(Face::B);
        let text = ron::to_string(&m).unwrap();
        let back: Move = ron::from_str(&text).unwrap();
        assert_eq!(back, m);
    }
}
