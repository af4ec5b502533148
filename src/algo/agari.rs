//! Decomposition of a count vector into a head plus a given number of sets.
//!
//! Tiles that fit no block are skipped, mirroring the distance calculation in
//! [`super::shanten`]: a vector larger than 14 tiles decomposes as long as a
//! head and enough sets can be carved out of it.

use crate::hand::TileCounts;
use crate::tile::TILE_SPACE;

use ahash::AHashSet;

/// A single set within a decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Mentsu {
    /// Run of three, identified by its lowest tile ID.
    Shuntsu(u8),
    /// Triplet.
    Koutsu(u8),
}

impl Mentsu {
    /// Whether the set contains the given tile ID.
    #[must_use]
    pub fn contains(self, tid: u8) -> bool {
        match self {
            Self::Shuntsu(t) => tid >= t && tid <= t + 2,
            Self::Koutsu(t) => tid == t,
        }
    }

    /// Whether the set contains a terminal or honor tile.
    #[must_use]
    pub fn has_yaokyuu(self) -> bool {
        match self {
            Self::Shuntsu(t) => t % 9 == 0 || t % 9 == 6,
            Self::Koutsu(t) => crate::tile::Tile::new_unchecked(t).is_yaokyuu(),
        }
    }
}

/// One complete interpretation of a winning vector.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Division {
    pub head: u8,
    pub body: Vec<Mentsu>,
}

/// Enumerate every distinct head-plus-`n_sets` interpretation, sorted.
///
/// A fully concealed winning hand needs `n_sets == 4`; each meld held outside
/// the concealed part lowers the requirement by one.
#[must_use]
pub fn find_divisions(counts: &TileCounts, n_sets: usize) -> Vec<Division> {
    let mut found = AHashSet::new();
    let mut c = *counts;

    for head in 0..TILE_SPACE {
        if c[head] >= 2 {
            c[head] -= 2;
            let mut body = Vec::with_capacity(n_sets);
            collect(&mut c, 0, head as u8, n_sets, &mut body, &mut found);
            c[head] += 2;
        }
    }

    let mut divisions: Vec<Division> = found.into_iter().collect();
    divisions.sort_unstable();
    divisions
}

fn collect(
    c: &mut TileCounts,
    mut i: usize,
    head: u8,
    n_sets: usize,
    body: &mut Vec<Mentsu>,
    found: &mut AHashSet<Division>,
) {
    if body.len() == n_sets {
        let mut sets = body.clone();
        sets.sort_unstable();
        found.insert(Division { head, body: sets });
        return;
    }

    while i < TILE_SPACE && c[i] == 0 {
        i += 1;
    }
    if i == TILE_SPACE {
        return;
    }

    if c[i] >= 3 {
        c[i] -= 3;
        body.push(Mentsu::Koutsu(i as u8));
        collect(c, i, head, n_sets, body, found);
        body.pop();
        c[i] += 3;
    }

    if i < 27 && i % 9 <= 6 && c[i + 1] > 0 && c[i + 2] > 0 {
        c[i] -= 1;
        c[i + 1] -= 1;
        c[i + 2] -= 1;
        body.push(Mentsu::Shuntsu(i as u8));
        collect(c, i, head, n_sets, body, found);
        body.pop();
        c[i] += 1;
        c[i + 1] += 1;
        c[i + 2] += 1;
    }

    // leave the remaining copies of this tile unused
    collect(c, i + 1, head, n_sets, body, found);
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hand::{count_tiles, parse_hand};
    use crate::tu8;

    fn divisions_of(s: &str) -> Vec<Division> {
        find_divisions(&count_tiles(&parse_hand(s).unwrap()), 4)
    }

    #[test]
    fn simple_hand_single_division() {
        let divs = divisions_of("123m456m789m123p55p");
        assert_eq!(divs.len(), 1);
        let d = &divs[0];
        assert_eq!(d.head, tu8!(5p));
        assert_eq!(
            d.body,
            vec![
                Mentsu::Shuntsu(tu8!(1m)),
                Mentsu::Shuntsu(tu8!(4m)),
                Mentsu::Shuntsu(tu8!(7m)),
                Mentsu::Shuntsu(tu8!(1p)),
            ]
        );
    }

    #[test]
    fn ambiguous_hand_multiple_divisions() {
        // 111222333m reads as three triplets or three identical runs
        let divs = divisions_of("111222333m99s456p");
        assert_eq!(divs.len(), 2);
        assert!(
            divs.iter()
                .any(|d| d.body.contains(&Mentsu::Koutsu(tu8!(1m))))
        );
        assert!(
            divs.iter()
                .any(|d| d.body.contains(&Mentsu::Shuntsu(tu8!(1m))))
        );
    }

    #[test]
    fn incomplete_hand_has_no_division() {
        assert!(divisions_of("123m456m789m123p5s").is_empty());
        assert!(divisions_of("1122334455667m8m").is_empty());
    }

    #[test]
    fn surplus_tiles_are_skipped() {
        // complete 14 plus two floaters
        let divs = divisions_of("123m456m789m123p55p1z4z");
        assert_eq!(divs.len(), 1);
        assert_eq!(divs[0].head, tu8!(5p));
    }

    #[test]
    fn duplicate_runs_deduplicate() {
        let divs = divisions_of("123m123m123p789s11z");
        assert_eq!(divs.len(), 1);
        let runs = divs[0]
            .body
            .iter()
            .filter(|m| **m == Mentsu::Shuntsu(tu8!(1m)))
            .count();
        assert_eq!(runs, 2);
    }

    #[test]
    fn reduced_set_count_for_melded_hands() {
        // concealed part of a hand with two melds: two sets plus the head
        let counts = count_tiles(&parse_hand("123m55s789p").unwrap());
        let divs = find_divisions(&counts, 2);
        assert_eq!(divs.len(), 1);
        assert_eq!(divs[0].head, tu8!(5s));
        assert_eq!(divs[0].body.len(), 2);

        // a bare pair closes a hand whose four sets are all melded
        let counts = count_tiles(&parse_hand("55s").unwrap());
        let divs = find_divisions(&counts, 0);
        assert_eq!(divs.len(), 1);
        assert!(divs[0].body.is_empty());
    }

    #[test]
    fn set_membership() {
        assert!(Mentsu::Shuntsu(tu8!(1m)).contains(tu8!(3m)));
        assert!(!Mentsu::Shuntsu(tu8!(1m)).contains(tu8!(4m)));
        assert!(Mentsu::Koutsu(tu8!(E)).contains(tu8!(E)));
        assert!(Mentsu::Shuntsu(tu8!(7s)).has_yaokyuu());
        assert!(Mentsu::Shuntsu(tu8!(1p)).has_yaokyuu());
        assert!(!Mentsu::Shuntsu(tu8!(4p)).has_yaokyuu());
        assert!(Mentsu::Koutsu(tu8!(N)).has_yaokyuu());
        assert!(!Mentsu::Koutsu(tu8!(5s)).has_yaokyuu());
    }
}
