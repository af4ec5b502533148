//! Distance-to-completion (shanten) calculation over tile-count vectors.
//!
//! Exact backtracking over the count vector, no lookup tables. The standard
//! form aims for four sets plus a pair; tiles that fit no block are simply
//! left unused, so vectors holding more than 14 tiles can still be complete.

use crate::hand::TileCounts;
use crate::tile::TILE_SPACE;

/// Minimum of the standard, seven-pairs and thirteen-orphans distances.
/// `-1` means the vector is complete.
#[must_use]
pub fn shanten(counts: &TileCounts) -> i8 {
    standard(counts)
        .min(chiitoitsu(counts))
        .min(kokushi(counts))
}

/// Standard form: four sets plus a pair.
#[must_use]
pub fn standard(counts: &TileCounts) -> i8 {
    let mut c = *counts;
    let mut best = 8;
    search(&mut c, 0, 0, 0, false, &mut best);
    for i in 0..TILE_SPACE {
        if c[i] >= 2 {
            c[i] -= 2;
            search(&mut c, 0, 0, 0, true, &mut best);
            c[i] += 2;
        }
    }
    best
}

fn search(c: &mut TileCounts, mut i: usize, sets: i8, partials: i8, has_head: bool, best: &mut i8) {
    while i < TILE_SPACE && c[i] == 0 {
        i += 1;
    }

    let usable = partials.min(4 - sets);
    let dist = 8 - 2 * sets - usable - i8::from(has_head);
    if dist < *best {
        *best = dist;
    }
    if i == TILE_SPACE || *best == -1 {
        return;
    }

    let in_suit = i < 27;
    let rank = i % 9;

    if sets < 4 {
        if c[i] >= 3 {
            c[i] -= 3;
            search(c, i, sets + 1, partials, has_head, best);
            c[i] += 3;
        }
        if in_suit && rank <= 6 && c[i + 1] > 0 && c[i + 2] > 0 {
            c[i] -= 1;
            c[i + 1] -= 1;
            c[i + 2] -= 1;
            search(c, i, sets + 1, partials, has_head, best);
            c[i] += 1;
            c[i + 1] += 1;
            c[i + 2] += 1;
        }
    }
    if sets + partials < 4 {
        if c[i] >= 2 {
            c[i] -= 2;
            search(c, i, sets, partials + 1, has_head, best);
            c[i] += 2;
        }
        if in_suit && rank <= 7 && c[i + 1] > 0 {
            c[i] -= 1;
            c[i + 1] -= 1;
            search(c, i, sets, partials + 1, has_head, best);
            c[i] += 1;
            c[i + 1] += 1;
        }
        if in_suit && rank <= 6 && c[i + 2] > 0 {
            c[i] -= 1;
            c[i + 2] -= 1;
            search(c, i, sets, partials + 1, has_head, best);
            c[i] += 1;
            c[i + 2] += 1;
        }
    }

    // leave the remaining copies of this tile unused
    search(c, i + 1, sets, partials, has_head, best);
}

/// Seven pairs. A count of 4 still yields a single pair.
#[must_use]
pub fn chiitoitsu(counts: &TileCounts) -> i8 {
    let mut pairs = 0_i8;
    let mut kinds = 0_i8;
    counts.iter().filter(|&&c| c > 0).for_each(|&c| {
        kinds += 1;
        if c >= 2 {
            pairs += 1;
        }
    });

    6 - pairs + (7 - kinds).max(0)
}

/// Thirteen orphans.
#[must_use]
pub fn kokushi(counts: &TileCounts) -> i8 {
    let mut kinds = 0_i8;
    let mut has_pair = false;

    for &i in &YAOKYUU_IDS {
        let c = counts[i];
        if c > 0 {
            kinds += 1;
            if c >= 2 {
                has_pair = true;
            }
        }
    }

    13 - kinds - i8::from(has_pair)
}

pub(crate) const YAOKYUU_IDS: [usize; 13] = [0, 8, 9, 17, 18, 26, 27, 28, 29, 30, 31, 32, 33];

#[cfg(test)]
mod test {
    use super::*;
    use crate::hand::{count_tiles, parse_hand};

    fn counts_of(s: &str) -> TileCounts {
        count_tiles(&parse_hand(s).unwrap())
    }

    #[test]
    fn complete_fourteen() {
        assert_eq!(shanten(&counts_of("123456789m123p55p")), -1);
        assert_eq!(shanten(&counts_of("111m222m333m444m55m")), -1);
        assert_eq!(shanten(&counts_of("123m123m123p789s11z")), -1);
    }

    #[test]
    fn thirteen_tiles_never_complete() {
        // 4 sets + pair needs 14 tiles, so no 13-tile vector reaches -1.
        assert_eq!(shanten(&counts_of("123456789m123p5p")), 0);
        assert_eq!(shanten(&counts_of("123m123p123s123z5m")), 2);
        assert_eq!(shanten(&counts_of("147m258p369s1234z")), 6);
    }

    #[test]
    fn tenpai_and_one_away() {
        // waiting on 6p
        assert_eq!(standard(&counts_of("123m456m789m55s45p")), 0);
        // closed wait pair hand
        assert_eq!(standard(&counts_of("123m456m789m123p5s")), 0);
        // pair settled, two floaters left
        assert_eq!(standard(&counts_of("123m456m789m55s4p7p")), 1);
    }

    #[test]
    fn seven_pairs_distances() {
        assert_eq!(chiitoitsu(&counts_of("1122334455667m8m")), 0);
        assert_eq!(chiitoitsu(&counts_of("11223344556677m")), -1);
        assert_eq!(shanten(&counts_of("11223344556677m")), -1);
        // a quad counts as a single pair
        assert_eq!(chiitoitsu(&counts_of("1111223344556m6m")), 1);
        // six pairs with a seventh kind already in hand
        assert_eq!(chiitoitsu(&counts_of("112233m445566p7s")), 0);
    }

    #[test]
    fn seven_pairs_oversized_goes_below_complete() {
        // 16 tiles forming eight pairs: distance -2, not -1.
        assert_eq!(chiitoitsu(&counts_of("1122334455667788m")), -2);
        assert_eq!(shanten(&counts_of("1122334455667788m")), -2);
    }

    #[test]
    fn thirteen_orphans() {
        assert_eq!(kokushi(&counts_of("19m19p19s1234567z")), 0);
        assert_eq!(kokushi(&counts_of("19m19p19s12345677z")), -1);
        assert_eq!(shanten(&counts_of("19m19p19s12345677z")), -1);
        assert_eq!(kokushi(&counts_of("123456789m123p5p")), 10);
    }

    #[test]
    fn surplus_tiles_are_ignored() {
        // complete 14 plus two unattached honors, 16 tiles total
        assert_eq!(standard(&counts_of("123456789m123p55p1z4z")), -1);
        // 14 tiles but no pair anywhere, still tenpai at best
        assert_eq!(standard(&counts_of("123456789m123p5p1z")), 0);
    }

    #[test]
    fn overfull_counts_still_classify() {
        // The detector itself does not police multiplicity; callers do.
        let mut counts = counts_of("123456789m123p55p");
        counts[0] = 4;
        assert!(shanten(&counts) >= -1);
    }
}
