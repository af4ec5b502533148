//! Exhaustive discard evaluation for riichi mahjong hands.
//!
//! Given a 14-tile hand, [`search::DiscardEvaluator`] enumerates, for every
//! distinct discard choice, every ordered sequence of future draws up to a
//! configured depth, detects which futures complete the hand, scores the
//! wins, and reduces the outcomes into per-discard win probability,
//! conditional average score, and expected value. The enumeration is
//! deterministic and embarrassingly parallel; identical inputs always
//! produce identical reports.
//!
//! The two game-rule oracles the search consumes, win detection
//! ([`algo::shanten`]) and scoring ([`algo::point`]), sit behind the
//! [`search::WinDetector`] and [`search::ScoreOracle`] traits and can be
//! swapped out.

mod macros;

pub mod algo;
pub mod hand;
pub mod search;
pub mod tile;
