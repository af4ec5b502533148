use crate::tile::{MAX_TILE_COPIES, TILE_SPACE, Tile};
use crate::tu8;

use anyhow::{Result, bail, ensure};
use serde::{Deserialize, Serialize};

/// Canonical tile-count form of a hand, one entry per tile type.
pub type TileCounts = [u8; TILE_SPACE];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeldKind {
    Chi,
    Pon,
    Minkan,
    Ankan,
}

/// A called (or concealed-kan) set held outside the concealed hand.
///
/// `tile` is the lowest tile of a run, or the tile of a triplet/quad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meld {
    pub kind: MeldKind,
    pub tile: Tile,
}

impl Meld {
    /// Concealed kans do not break menzen status.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        !matches!(self.kind, MeldKind::Ankan)
    }

    /// Add the meld's tiles to a count vector.
    pub fn add_to(&self, counts: &mut TileCounts) {
        match self.kind {
            MeldKind::Chi => {
                for off in 0..3 {
                    counts[self.tile.as_usize() + off] += 1;
                }
            }
            MeldKind::Pon => counts[self.tile.as_usize()] += 3,
            MeldKind::Minkan | MeldKind::Ankan => counts[self.tile.as_usize()] += 4,
        }
    }
}

#[must_use]
pub fn count_tiles(tiles: &[Tile]) -> TileCounts {
    let mut counts = [0; TILE_SPACE];
    for t in tiles {
        counts[t.as_usize()] += 1;
    }
    counts
}

/// Expand a count vector into an explicit multiset hand, ascending by tile ID.
#[must_use]
pub fn flattened(counts: &TileCounts) -> Vec<Tile> {
    let mut tiles = Vec::with_capacity(counts.iter().map(|&c| c as usize).sum());
    for (tid, &c) in counts.iter().enumerate() {
        for _ in 0..c {
            tiles.push(Tile::new_unchecked(tid as u8));
        }
    }
    tiles
}

/// Reject count vectors that exceed the physical 4-copy limit.
pub fn ensure_counts_legal(counts: &TileCounts) -> Result<()> {
    for (tid, &c) in counts.iter().enumerate() {
        ensure!(
            c <= MAX_TILE_COPIES,
            "{} copies of {}, more than the {} available",
            c,
            Tile::new_unchecked(tid as u8),
            MAX_TILE_COPIES,
        );
    }
    Ok(())
}

/// Parse a hand from text.
///
/// Accepts compact mpsz groups (`123m55z` style, `z` ranks 1-7 being
/// E S W N P F C) as well as honor letters (`123mEEP`); whitespace and commas
/// are ignored, so space-separated tile tokens work too.
pub fn parse_hand(s: &str) -> Result<Vec<Tile>> {
    let mut tiles = Vec::new();
    let mut pending: Vec<u8> = Vec::new();

    for ch in s.chars() {
        match ch {
            '1'..='9' => pending.push(ch as u8 - b'1'),
            'm' | 'p' | 's' => {
                ensure!(!pending.is_empty(), "suit '{ch}' with no preceding ranks");
                let base = match ch {
                    'm' => 0,
                    'p' => 9,
                    _ => 18,
                };
                for rank in pending.drain(..) {
                    tiles.push(Tile::new_unchecked(base + rank));
                }
            }
            'z' => {
                ensure!(!pending.is_empty(), "suit 'z' with no preceding ranks");
                for rank in pending.drain(..) {
                    ensure!(rank < 7, "honor rank {} out of range", rank + 1);
                    tiles.push(Tile::new_unchecked(tu8!(E) + rank));
                }
            }
            'E' | 'S' | 'W' | 'N' | 'P' | 'F' | 'C' => {
                ensure!(
                    pending.is_empty(),
                    "ranks with no suit before honor '{ch}'"
                );
                tiles.push(ch.to_string().parse::<Tile>().map_err(anyhow::Error::msg)?);
            }
            c if c.is_whitespace() || c == ',' => {
                ensure!(pending.is_empty(), "ranks with no suit before '{c}'");
            }
            c => bail!("unexpected character '{c}' in hand"),
        }
    }
    ensure!(pending.is_empty(), "trailing ranks with no suit");

    Ok(tiles)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::t;

    #[test]
    fn count_flatten_roundtrip() {
        let tiles = vec![t!(3s), t!(1m), t!(1m), t!(E), t!(9p)];
        let counts = count_tiles(&tiles);
        assert_eq!(counts[tu8!(1m) as usize], 2);
        assert_eq!(counts[tu8!(E) as usize], 1);
        assert_eq!(counts.iter().map(|&c| c as usize).sum::<usize>(), 5);

        let flat = flattened(&counts);
        assert_eq!(flat, vec![t!(1m), t!(1m), t!(9p), t!(3s), t!(E)]);
    }

    #[test]
    fn legality() {
        let mut counts = [0; TILE_SPACE];
        counts[tu8!(5p) as usize] = 4;
        ensure_counts_legal(&counts).unwrap();
        counts[tu8!(5p) as usize] = 5;
        ensure_counts_legal(&counts).unwrap_err();
    }

    #[test]
    fn parse_mpsz() {
        let tiles = parse_hand("123m456p789s1123z").unwrap();
        assert_eq!(tiles.len(), 13);
        assert_eq!(tiles[0], t!(1m));
        assert_eq!(tiles[8], t!(9s));
        assert_eq!(tiles[9], t!(E));
        assert_eq!(tiles[10], t!(E));
        assert_eq!(tiles[12], t!(W));
    }

    #[test]
    fn parse_honor_letters_and_separators() {
        let tiles = parse_hand("11m EE, P").unwrap();
        assert_eq!(tiles, vec![t!(1m), t!(1m), t!(E), t!(E), t!(P)]);
    }

    #[test]
    fn parse_rejects_malformed() {
        parse_hand("12").unwrap_err();
        parse_hand("m").unwrap_err();
        parse_hand("12 E").unwrap_err();
        parse_hand("8z").unwrap_err();
        parse_hand("1x").unwrap_err();
    }
}
