//! The exhaustive discard evaluator.
//!
//! For every distinct tile in a 14-tile hand, the evaluator removes one copy,
//! enumerates every ordered sequence of future draws up to the configured
//! depth, classifies each resulting vector (multiplicity violation, not
//! winning, unscorable, or a scored win) and reduces the outcomes into one
//! [`Candidate`] summary per discard. Candidates are processed in ascending
//! tile order and sequences in lexicographic order, so every tie-break is a
//! total order and results are identical across any worker partitioning.

use crate::hand::{TileCounts, count_tiles, ensure_counts_legal, flattened};
use crate::tile::{MAX_TILE_COPIES, TILE_SPACE, Tile};

use super::candidate::{Candidate, GlobalBest, Outcome, Trajectory};
use super::sequence::{DrawSeq, DrawSequences};
use super::{ScoreOracle, SearchConfig, WinDetector};

use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Result, ensure};
use rayon::prelude::*;
use serde::Serialize;

/// Full evaluation report for one hand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub depth: usize,
    /// One summary per distinct tile in the hand, ascending tile order.
    pub candidates: Vec<Candidate>,
    /// Index of the candidate with the highest expected value.
    pub best: usize,
    /// Highest-scoring single future across all candidates, if any future
    /// scored at all.
    pub global_best: Option<GlobalBest>,
}

impl Evaluation {
    #[must_use]
    pub fn best_candidate(&self) -> &Candidate {
        &self.candidates[self.best]
    }
}

/// Discard evaluator with injected win-detection and scoring oracles.
pub struct DiscardEvaluator<W, S> {
    detector: W,
    oracle: S,
    config: SearchConfig,
}

impl DiscardEvaluator<super::StandardWinDetector, crate::algo::point::HanFuScorer> {
    /// Evaluator with the built-in detector and scorer.
    #[must_use]
    pub fn standard(config: SearchConfig) -> Self {
        Self::new(
            super::StandardWinDetector,
            crate::algo::point::HanFuScorer::default(),
            config,
        )
    }
}

impl<W: WinDetector, S: ScoreOracle> DiscardEvaluator<W, S> {
    pub const fn new(detector: W, oracle: S, config: SearchConfig) -> Self {
        Self {
            detector,
            oracle,
            config,
        }
    }

    /// Evaluate every discard choice of a 14-tile hand.
    ///
    /// The hand must hold exactly 14 tiles with no type above four copies;
    /// anything else is a caller error.
    pub fn evaluate(&self, hand: &[Tile]) -> Result<Evaluation> {
        ensure!(hand.len() == 14, "expected a 14-tile hand, got {}", hand.len());
        let counts = count_tiles(hand);
        ensure_counts_legal(&counts)?;
        let depth = self.config.depth;
        ensure!(
            depth <= TILE_SPACE,
            "lookahead depth {depth} exceeds the {TILE_SPACE} tile types"
        );

        let total = DrawSequences::count(depth);
        let discards: Vec<Tile> = (0..TILE_SPACE)
            .filter(|&i| counts[i] > 0)
            .map(|i| Tile::new_unchecked(i as u8))
            .collect();

        let n_done = AtomicUsize::new(0);
        let candidates: Vec<Candidate> = discards
            .par_iter()
            .map(|&discard| {
                let cand = self.evaluate_discard(hand, &counts, discard, depth, total);
                if self.config.report_progress {
                    let done = n_done.fetch_add(1, Ordering::Relaxed) + 1;
                    eprintln!(
                        "[{done}/{}] {discard}: {total} sequences, {} wins",
                        discards.len(),
                        cand.wins,
                    );
                }
                cand
            })
            .collect();

        let mut best = 0;
        for (i, c) in candidates.iter().enumerate().skip(1) {
            if c.exp_value > candidates[best].exp_value {
                best = i;
            }
        }

        let mut global_best: Option<GlobalBest> = None;
        for c in &candidates {
            if c.best_score > global_best.as_ref().map_or(0, |g| g.score) {
                if let Some(trajectory) = &c.best_trajectory {
                    global_best = Some(GlobalBest {
                        discard: c.tile,
                        score: c.best_score,
                        trajectory: trajectory.clone(),
                    });
                }
            }
        }

        Ok(Evaluation {
            depth,
            candidates,
            best,
            global_best,
        })
    }

    fn evaluate_discard(
        &self,
        hand: &[Tile],
        counts: &TileCounts,
        discard: Tile,
        depth: usize,
        total: u64,
    ) -> Candidate {
        // base hand: one copy of the candidate removed, order preserved
        let mut base = Vec::with_capacity(hand.len() - 1);
        let mut removed = false;
        for &t in hand {
            if !removed && t == discard {
                removed = true;
                continue;
            }
            base.push(t);
        }
        let mut base_counts = *counts;
        base_counts[discard.as_usize()] -= 1;

        let agg = if depth == 0 {
            let mut agg = Aggregate::default();
            agg.absorb(0, &DrawSeq::new(), self.classify(&base_counts, &DrawSeq::new()));
            agg
        } else {
            let block = DrawSequences::block_len(depth);
            (0..TILE_SPACE as u8)
                .into_par_iter()
                .map(|first| {
                    let first = Tile::new_unchecked(first);
                    let base_index = u64::from(first.as_u8()) * block;
                    let mut agg = Aggregate::default();
                    for (i, seq) in DrawSequences::with_first(first, depth).enumerate() {
                        let outcome = self.classify(&base_counts, &seq);
                        agg.absorb(base_index + i as u64, &seq, outcome);
                    }
                    agg
                })
                .reduce(Aggregate::default, Aggregate::merge)
        };

        agg.into_candidate(discard, &base, total)
    }

    /// Classify one future: append the draws, police multiplicity, consult
    /// the detector, then the oracle. Oracle faults never escape.
    fn classify(&self, base_counts: &TileCounts, seq: &DrawSeq) -> Outcome {
        let mut counts = *base_counts;
        for &t in seq.iter() {
            let c = &mut counts[t.as_usize()];
            *c += 1;
            if *c > MAX_TILE_COPIES {
                return Outcome::Illegal;
            }
        }

        if self.detector.shanten(&counts) != -1 {
            return Outcome::NotWinning;
        }

        let full = flattened(&counts);
        // The designated win tile is the first tile of the flattened hand,
        // not the last draw; the scorer's wait classification follows this
        // designation.
        let win_tile = full[0];
        match self.oracle.score(&full, &[], win_tile, true, false) {
            Ok(points) if points > 0 => Outcome::Win(points),
            Ok(_) | Err(_) => Outcome::Faulted,
        }
    }
}

/// Partial per-discard reduction, mergeable across workers.
#[derive(Default, Clone)]
struct Aggregate {
    wins: u64,
    win_points_sum: u64,
    faults: u64,
    best: Option<Best>,
}

#[derive(Clone)]
struct Best {
    score: u32,
    index: u64,
    draws: DrawSeq,
}

impl Aggregate {
    fn absorb(&mut self, index: u64, seq: &DrawSeq, outcome: Outcome) {
        match outcome {
            Outcome::Win(points) => {
                self.wins += 1;
                self.win_points_sum += u64::from(points);
                // strict greater: the first maximal sequence wins
                if self.best.as_ref().is_none_or(|b| points > b.score) {
                    self.best = Some(Best {
                        score: points,
                        index,
                        draws: *seq,
                    });
                }
            }
            Outcome::Faulted => self.faults += 1,
            Outcome::Illegal | Outcome::NotWinning => {}
        }
    }

    fn merge(mut self, other: Self) -> Self {
        self.wins += other.wins;
        self.win_points_sum += other.win_points_sum;
        self.faults += other.faults;
        self.best = match (self.best.take(), other.best) {
            (Some(a), Some(b)) => {
                // equal scores resolve to the earlier sequence, reproducing
                // the sequential first-occurrence tie-break
                if b.score > a.score || (b.score == a.score && b.index < a.index) {
                    Some(b)
                } else {
                    Some(a)
                }
            }
            (a, b) => a.or(b),
        };
        self
    }

    fn into_candidate(self, tile: Tile, base: &[Tile], total: u64) -> Candidate {
        let win_prob = self.wins as f64 / total as f64;
        let avg_win_score = if self.wins > 0 {
            self.win_points_sum as f64 / self.wins as f64
        } else {
            0.0
        };
        let exp_value = win_prob * avg_win_score;

        let best_trajectory = self.best.as_ref().map(|b| {
            let mut hand = base.to_vec();
            hand.extend(b.draws.iter().copied());
            Trajectory {
                draws: b.draws.to_vec(),
                hand,
            }
        });

        Candidate {
            tile,
            total_sequences: total,
            wins: self.wins,
            faults: self.faults,
            win_prob,
            avg_win_score,
            exp_value,
            best_score: self.best.map_or(0, |b| b.score),
            best_trajectory,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::algo::point::HanFuScorer;
    use crate::hand::parse_hand;
    use crate::search::StandardWinDetector;
    use crate::t;

    fn evaluator(depth: usize) -> DiscardEvaluator<StandardWinDetector, HanFuScorer> {
        DiscardEvaluator::standard(SearchConfig::new(depth))
    }

    fn tenpai_hand() -> Vec<Tile> {
        // four runs plus a pair: already complete as 14, every discard
        // leaves a tenpai or better base
        parse_hand("123m456m789m123p55s").unwrap()
    }

    #[test]
    fn rejects_malformed_hands() {
        let eval = evaluator(1);
        eval.evaluate(&parse_hand("123m456m789m123p5s").unwrap())
            .unwrap_err();

        let five_copies = parse_hand("11111m23m456m789m5s").unwrap();
        assert_eq!(five_copies.len(), 14);
        eval.evaluate(&five_copies).unwrap_err();
    }

    #[test]
    fn depth_zero_has_one_empty_sequence_and_no_wins() {
        let eval = evaluator(0);
        let result = eval.evaluate(&tenpai_hand()).unwrap();
        for c in &result.candidates {
            assert_eq!(c.total_sequences, 1);
            assert_eq!(c.wins, 0);
            assert_eq!(c.win_prob, 0.0);
            assert_eq!(c.exp_value, 0.0);
            assert!(c.best_trajectory.is_none());
        }
        assert!(result.global_best.is_none());
    }

    #[test]
    fn probabilities_are_probabilities_and_ev_is_exact() {
        let eval = evaluator(1);
        let result = eval.evaluate(&tenpai_hand()).unwrap();
        assert_eq!(result.candidates.len(), 13);
        for c in &result.candidates {
            assert!((0.0..=1.0).contains(&c.win_prob));
            assert_eq!(c.exp_value, c.win_prob * c.avg_win_score);
            assert_eq!(c.win_prob, c.wins as f64 / c.total_sequences as f64);
        }
    }

    #[test]
    fn tenpai_discard_wins_at_depth_one() {
        let eval = evaluator(1);
        let result = eval.evaluate(&tenpai_hand()).unwrap();

        // discarding 5s leaves a tanki wait on 5s
        let c5s = result
            .candidates
            .iter()
            .find(|c| c.tile == t!(5s))
            .unwrap();
        assert_eq!(c5s.wins, 1);
        assert!(c5s.win_prob > 0.0);
        let traj = c5s.best_trajectory.as_ref().unwrap();
        assert_eq!(traj.draws, vec![t!(5s)]);
        assert_eq!(traj.hand.len(), 14);

        // discarding 1m leaves a two-sided wait on 1m and 4m
        let c1m = result
            .candidates
            .iter()
            .find(|c| c.tile == t!(1m))
            .unwrap();
        assert_eq!(c1m.wins, 2);
        assert_eq!(c1m.win_prob, 2.0 / 34.0);

        // the recommended discard has the maximal EV
        let best_ev = result.best_candidate().exp_value;
        for c in &result.candidates {
            assert!(c.exp_value <= best_ev);
        }

        // the global best equals the maximal single-outcome score
        let max_best = result.candidates.iter().map(|c| c.best_score).max().unwrap();
        let global = result.global_best.as_ref().unwrap();
        assert_eq!(global.score, max_best);
        assert!(max_best > 0);
    }

    /// Detector wrapper that fails the test if it ever sees an illegal
    /// count vector.
    struct PolicedDetector;

    impl WinDetector for PolicedDetector {
        fn shanten(&self, counts: &TileCounts) -> i8 {
            assert!(
                counts.iter().all(|&c| c <= MAX_TILE_COPIES),
                "overfull vector reached the win detector"
            );
            crate::algo::shanten::shanten(counts)
        }
    }

    #[test]
    fn overfull_futures_never_reach_the_oracles() {
        // four copies of 1m already in hand: any future drawing 1m is illegal
        let hand = parse_hand("1111m234m567m99s55z").unwrap();
        let eval = DiscardEvaluator::new(
            PolicedDetector,
            HanFuScorer::default(),
            SearchConfig::new(2),
        );
        let result = eval.evaluate(&hand).unwrap();
        // every sequence containing 1m was cut before detection, and the
        // sequence totals are unaffected by the cuts
        for c in &result.candidates {
            assert_eq!(c.total_sequences, 34 * 33);
        }
    }

    #[test]
    fn unscorable_wins_are_counted_as_faults_not_wins() {
        // discarding 9s leaves 2m as a permanent floater below everything
        // else; draws (3z, 5p) complete four sets plus a pair around it, but
        // the designated win tile (the 2m) sits in no group
        let hand = parse_hand("2m567m789m123p5p33z9s").unwrap();
        assert_eq!(hand.len(), 14);
        let eval = evaluator(2);
        let result = eval.evaluate(&hand).unwrap();
        let c9s = result
            .candidates
            .iter()
            .find(|c| c.tile == t!(9s))
            .unwrap();
        assert!(c9s.faults > 0);
        // faults contribute nothing to the win statistics
        assert_eq!(
            c9s.win_prob,
            c9s.wins as f64 / c9s.total_sequences as f64
        );
    }

    #[test]
    fn evaluation_is_deterministic() {
        use rand::SeedableRng;
        use rand::seq::SliceRandom;
        use rand_chacha::ChaCha12Rng;

        let mut rng = ChaCha12Rng::seed_from_u64(42);
        let mut pool: Vec<Tile> = (0..TILE_SPACE)
            .flat_map(|i| std::iter::repeat_n(Tile::new_unchecked(i as u8), 4))
            .collect();
        pool.shuffle(&mut rng);
        let hand: Vec<Tile> = pool[..14].to_vec();

        let eval = evaluator(1);
        let a = eval.evaluate(&hand).unwrap();
        let b = eval.evaluate(&hand).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn sample_hand_depth_one_report() {
        // three runs, three honors, and a two-away pair structure
        let hand: Vec<Tile> = [0, 1, 2, 9, 10, 11, 18, 19, 20, 27, 28, 29, 5, 6]
            .iter()
            .map(|&i| Tile::try_from(i as usize).unwrap())
            .collect();
        let eval = evaluator(1);
        let result = eval.evaluate(&hand).unwrap();
        assert_eq!(result.candidates.len(), 14);
        for c in &result.candidates {
            assert_eq!(c.total_sequences, 34);
            assert!(c.exp_value >= 0.0);
        }
    }

    #[test]
    #[ignore = "exhaustive depth-3 sweep over 14 x 35904 futures"]
    fn sample_hand_depth_three_enumerates_the_full_space() {
        let hand: Vec<Tile> = [0, 1, 2, 9, 10, 11, 18, 19, 20, 27, 28, 29, 5, 6]
            .iter()
            .map(|&i| Tile::try_from(i as usize).unwrap())
            .collect();
        let eval = evaluator(3);
        let result = eval.evaluate(&hand).unwrap();
        assert_eq!(result.candidates.len(), 14);
        let max_best = result.candidates.iter().map(|c| c.best_score).max().unwrap();
        for c in &result.candidates {
            assert_eq!(c.total_sequences, 35_904);
            assert!(c.exp_value >= 0.0);
            assert_eq!(c.exp_value, c.win_prob * c.avg_win_score);
        }
        if let Some(global) = &result.global_best {
            assert_eq!(global.score, max_best);
        } else {
            assert_eq!(max_best, 0);
        }
    }
}
