// SPDX-License-Identifier: MIT OR Apache-2.0
//! Move timeline with cursor-based undo/redo.
//!
//! The log holds every move made so far; the cursor points at the last
//! applied move. Stepping backward plays the cached inverse of the move
//! under the cursor, stepping forward replays the next logged move.
//! Editing while rewound discards everything after the cursor.

use crate::token::{Move, MoveBatch};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Timeline persistence errors
#[derive(Debug, Error)]
pub enum TimelineError {
    /// RON encoding failed
    #[error("Failed to encode timeline: {0}")]
    Encode(#[from] ron::Error),

    /// RON decoding failed
    #[error("Failed to decode timeline: {0}")]
    Decode(#[from] ron::error::SpannedError),
}

/// Result type for timeline persistence
pub type Result<T> = std::result::Result<T, TimelineError>;

/// Editable history of moves
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Timeline {
    /// Every logged move
    log: Vec<Move>,
    /// Index of the last applied move, `None` before the first
    cursor: Option<usize>,
    /// Inverse of each logged move, rebuilt after every edit
    #[serde(skip)]
    reverse_log: Vec<Move>,
    /// Optional cap on log length
    #[serde(default)]
    max_len: Option<usize>,
}

impl Timeline {
    /// Create an empty timeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a timeline that keeps at most `max_len` moves
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            max_len: Some(max_len.max(1)),
            ..Self::default()
        }
    }

    /// Append moves at the cursor.
    ///
    /// If the cursor is before the tail, the moves after it are dropped
    /// first. The cursor ends on the new tail. Returns how many logged
    /// moves were discarded.
    pub fn append_or_insert(&mut self, batch: &[Move]) -> usize {
        if batch.is_empty() {
            return 0;
        }

        let keep = self.cursor.map_or(0, |c| c + 1);
        let discarded = self.log.len() - keep;
        if discarded > 0 {
            tracing::debug!("Branching timeline: discarding {discarded} redo moves");
            self.log.truncate(keep);
        }

        self.log.extend_from_slice(batch);

        // Enforce length limit
        if let Some(max_len) = self.max_len {
            if self.log.len() > max_len {
                let overflow = self.log.len() - max_len;
                self.log.drain(..overflow);
            }
        }

        self.cursor = Some(self.log.len() - 1);
        self.rebuild_reverse_log();
        discarded
    }

    /// Advance the cursor and return the move to replay
    pub fn step_forward(&mut self) -> Option<Move> {
        if !self.can_step_forward() {
            return None;
        }
        let next = self.cursor.map_or(0, |c| c + 1);
        self.cursor = Some(next);
        self.log.get(next).copied()
    }

    /// Return the move that undoes the one under the cursor, then move the cursor back
    pub fn step_backward(&mut self) -> Option<Move> {
        let current = self.cursor?;
        let undo = match self.reverse_log.get(current) {
            Some(m) => *m,
            None => {
                // Reverse log out of sync (e.g. freshly deserialized)
                self.rebuild_reverse_log();
                *self.reverse_log.get(current)?
            }
        };
        self.cursor = current.checked_sub(1);
        Some(undo)
    }

    /// Recompute the inverse of every logged move
    pub fn rebuild_reverse_log(&mut self) {
        self.reverse_log = self.log.iter().map(Move::inverse).collect();
    }

    /// Check if redo is available
    pub fn can_step_forward(&self) -> bool {
        match self.cursor {
            Some(c) => c + 1 < self.log.len(),
            None => !self.log.is_empty(),
        }
    }

    /// Check if undo is available
    pub fn can_step_backward(&self) -> bool {
        self.cursor.is_some()
    }

    /// Index of the last applied move
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Number of logged moves
    pub fn len(&self) -> usize {
        self.log.len()
    }

    /// Check if nothing has been logged
    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    /// All logged moves, including redo entries
    pub fn moves(&self) -> &[Move] {
        &self.log
    }

    /// Cached inverses, one per logged move
    pub fn reverse_log(&self) -> &[Move] {
        &self.reverse_log
    }

    /// Moves up to and including the cursor
    pub fn applied(&self) -> &[Move] {
        match self.cursor {
            Some(c) => &self.log[..=c],
            None => &[],
        }
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.log.clear();
        self.reverse_log.clear();
        self.cursor = None;
    }

    /// Serialize to RON
    pub fn to_ron(&self) -> Result<String> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }

    /// Load from RON, rebuilding the reverse log
    pub fn from_ron(text: &str) -> Result<Self> {
        let mut timeline: Self = ron::from_str(text)?;
        if let Some(c) = timeline.cursor {
            if c >= timeline.log.len() {
                timeline.cursor = timeline.log.len().checked_sub(1);
            }
        }
        timeline.rebuild_reverse_log();
        Ok(timeline)
    }
}

impl From<MoveBatch> for Timeline {
    fn from(moves: MoveBatch) -> Self {
        let mut timeline = Self::new();
        timeline.append_or_insert(&moves);
        timeline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cube::CubeState;
    use crate::token::{parse_sequence, Face, Puzzle};

    fn moves(text: &str) -> MoveBatch {
        parse_sequence(text, Puzzle::Standard).unwrap()
    }

    #[test]
    fn test_empty_timeline() {
        let mut timeline = Timeline::new();
        assert_eq!(timeline.cursor(), None);
        assert_eq!(timeline.step_forward(), None);
        assert_eq!(timeline.step_backward(), None);
        assert!(timeline.applied().is_empty());
    }

    #[test]
    fn test_append_at_tail() {
        let mut timeline = Timeline::new();
        assert_eq!(timeline.append_or_insert(&moves("R U")), 0);
        assert_eq!(timeline.append_or_insert(&moves("F")), 0);
        assert_eq!(timeline.moves(), moves("R U F").as_slice());
        assert_eq!(timeline.cursor(), Some(2));
    }

    #[test]
    fn test_branch_on_edit() {
        let mut timeline = Timeline::from(moves("R U F"));
        timeline.step_backward();
        assert_eq!(timeline.cursor(), Some(1));

        let discarded = timeline.append_or_insert(&moves("D"));
        assert_eq!(discarded, 1);
        assert_eq!(timeline.moves(), moves("R U D").as_slice());
        assert_eq!(timeline.cursor(), Some(2));
        assert_eq!(timeline.step_forward(), None);
    }

    #[test]
    fn test_branch_from_fully_rewound() {
        let mut timeline = Timeline::from(moves("R U"));
        timeline.step_backward();
        timeline.step_backward();
        assert_eq!(timeline.cursor(), None);

        assert_eq!(timeline.append_or_insert(&moves("L2")), 2);
        assert_eq!(timeline.moves(), moves("L2").as_slice());
        assert_eq!(timeline.cursor(), Some(0));
    }

    #[test]
    fn test_step_backward_returns_inverse() {
        let mut timeline = Timeline::from(moves("R U2 F'"));
        assert_eq!(timeline.step_backward(), Some(Move::clockwise(Face::F)));
        assert_eq!(timeline.step_backward(), Some(Move::double(Face::U)));
        assert_eq!(timeline.step_backward(), Some(Move::prime(Face::R)));
        assert_eq!(timeline.step_backward(), None);
        assert_eq!(timeline.cursor(), None);
    }

    #[test]
    fn test_step_forward_replays() {
        let mut timeline = Timeline::from(moves("R U"));
        timeline.step_backward();
        timeline.step_backward();
        assert_eq!(timeline.step_forward(), Some(Move::clockwise(Face::R)));
        assert_eq!(timeline.step_forward(), Some(Move::clockwise(Face::U)));
        assert_eq!(timeline.step_forward(), None);
        assert_eq!(timeline.cursor(), Some(1));
    }

    #[test]
    fn test_undo_round_trip_restores_cube() {
        let mut timeline = Timeline::new();
        let mut cube = CubeState::solved();
        let batch = moves("U R B L D2 F U' R' B' L' D' F'");

        timeline.append_or_insert(&batch);
        cube.apply_all(&batch);

        while let Some(undo) = timeline.step_backward() {
            cube.apply(undo);
        }
        assert!(cube.is_solved());
    }

    #[test]
    fn test_reverse_log_matches_log() {
        let timeline = Timeline::from(moves("R U2 M'"));
        let expected: Vec<Move> = timeline.moves().iter().map(Move::inverse).collect();
        assert_eq!(timeline.reverse_log(), expected.as_slice());
    }

    #[test]
    fn test_max_len_drops_oldest() {
        let mut timeline = Timeline::with_max_len(3);
        timeline.append_or_insert(&moves("R U F D"));
        assert_eq!(timeline.moves(), moves("U F D").as_slice());
        assert_eq!(timeline.cursor(), Some(2));
    }

    #[test]
    fn test_applied_tracks_cursor() {
        let mut timeline = Timeline::from(moves("R U F"));
        assert_eq!(timeline.applied(), moves("R U F").as_slice());
        timeline.step_backward();
        timeline.step_backward();
        assert_eq!(timeline.applied(), moves("R").as_slice());
        assert_eq!(timeline.moves().len(), 3);
    }

    #[test]
    fn test_ron_round_trip() {
        let mut timeline = Timeline::from(moves("R U2 F'"));
        timeline.step_backward();

        let text = timeline.to_ron().unwrap();
        let mut loaded = Timeline::from_ron(&text).unwrap();
        assert_eq!(loaded.moves(), timeline.moves());
        assert_eq!(loaded.cursor(), Some(1));
        assert_eq!(loaded.reverse_log(), timeline.reverse_log());
        assert_eq!(loaded.step_backward(), Some(Move::double(Face::U)));
    }

    #[test]
    fn test_from_ron_clamps_cursor() {
        let loaded = Timeline::from_ron("(log: [\"R\"], cursor: Some(5))").unwrap();
        assert_eq!(loaded.cursor(), Some(0));
    }
}
