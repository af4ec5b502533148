//! Per-discard summaries and the outcome taxonomy of single futures.

use crate::tile::Tile;
use std::cmp::Ordering;

use serde::Serialize;

/// Classification of one simulated future for one discard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Some tile type would exceed four copies; rejected before win
    /// detection.
    Illegal,
    /// Legal but not a winning shape.
    NotWinning,
    /// Winning shape the score oracle refused to score; counted as zero.
    Faulted,
    /// Scored win with strictly positive points.
    Win(u32),
}

impl Outcome {
    #[must_use]
    pub const fn points(self) -> u32 {
        match self {
            Self::Win(p) => p,
            _ => 0,
        }
    }

    #[must_use]
    pub const fn is_win(self) -> bool {
        matches!(self, Self::Win(_))
    }
}

/// A concrete line of play: the draws taken and the hand they produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trajectory {
    pub draws: Vec<Tile>,
    /// Base hand in original order with the draws appended.
    pub hand: Vec<Tile>,
}

/// Aggregate result for one discard candidate over the whole sequence space.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub tile: Tile,
    pub total_sequences: u64,
    pub wins: u64,
    /// Complete futures the oracle could not score (counted as zero).
    pub faults: u64,
    pub win_prob: f64,
    /// Mean points over winning futures; 0 when there are none.
    pub avg_win_score: f64,
    /// Exactly `win_prob * avg_win_score`.
    pub exp_value: f64,
    pub best_score: u32,
    /// First future reaching `best_score` in enumeration order.
    pub best_trajectory: Option<Trajectory>,
}

impl Candidate {
    /// Ranking for display: EV first, then win probability, then best score,
    /// then tile order.
    #[must_use]
    pub fn cmp_rank(&self, other: &Self) -> Ordering {
        match self.exp_value.total_cmp(&other.exp_value) {
            Ordering::Equal => {}
            o => return o.reverse(),
        }
        match self.win_prob.total_cmp(&other.win_prob) {
            Ordering::Equal => {}
            o => return o.reverse(),
        }
        match self.best_score.cmp(&other.best_score) {
            Ordering::Equal => {}
            o => return o.reverse(),
        }
        self.tile.cmp(&other.tile)
    }

    #[must_use]
    pub const fn table_header() -> &'static [&'static str] {
        &["Tile", "P(win)", "Avg|win", "EV", "Best", "Wins", "Faults"]
    }

    #[must_use]
    pub fn table_row(&self) -> Vec<String> {
        vec![
            self.tile.to_string(),
            format!("{:.4}", self.win_prob),
            format!("{:.1}", self.avg_win_score),
            format!("{:.2}", self.exp_value),
            self.best_score.to_string(),
            self.wins.to_string(),
            self.faults.to_string(),
        ]
    }
}

/// The single best-scoring future across every discard candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalBest {
    pub discard: Tile,
    pub score: u32,
    pub trajectory: Trajectory,
}
