//! Exhaustive discard evaluation: the sequence generator, the oracle seams,
//! and the evaluator itself.

pub mod candidate;
pub mod evaluate;
pub mod sequence;

use crate::algo::point::{HanFuScorer, ScoreError};
use crate::algo::shanten;
use crate::hand::{Meld, TileCounts};
use crate::tile::Tile;

use serde::Deserialize;

pub use candidate::{Candidate, GlobalBest, Outcome, Trajectory};
pub use evaluate::{DiscardEvaluator, Evaluation};
pub use sequence::{DrawSeq, DrawSequences};

/// Classifies a tile-count vector by its distance to a winning shape.
///
/// `-1` denotes a complete hand; the evaluator branches on that value only
/// and never interprets the non-negative distances.
pub trait WinDetector: Sync {
    fn shanten(&self, counts: &TileCounts) -> i8;
}

/// Converts a winning hand into a point value.
///
/// The evaluator always passes an empty meld list, self-draw, and no riichi
/// declaration; any error is absorbed into a zero-scored outcome.
pub trait ScoreOracle: Sync {
    fn score(
        &self,
        hand: &[Tile],
        melds: &[Meld],
        win_tile: Tile,
        is_self_draw: bool,
        is_riichi_declared: bool,
    ) -> Result<u32, ScoreError>;
}

/// The backtracking detector from [`crate::algo::shanten`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardWinDetector;

impl WinDetector for StandardWinDetector {
    fn shanten(&self, counts: &TileCounts) -> i8 {
        shanten::shanten(counts)
    }
}

impl ScoreOracle for HanFuScorer {
    fn score(
        &self,
        hand: &[Tile],
        melds: &[Meld],
        win_tile: Tile,
        is_self_draw: bool,
        is_riichi_declared: bool,
    ) -> Result<u32, ScoreError> {
        self.score_hand(hand, melds, win_tile, is_self_draw, is_riichi_declared)
            .map(|s| s.points)
    }
}

/// Search configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct SearchConfig {
    /// Number of future draws to look ahead.
    pub depth: usize,

    /// Emit a progress line per completed discard candidate. Reporting never
    /// affects computed results.
    #[serde(default)]
    pub report_progress: bool,
}

impl SearchConfig {
    #[must_use]
    pub const fn new(depth: usize) -> Self {
        Self {
            depth,
            report_progress: false,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            depth: 3,
            report_progress: false,
        }
    }
}
