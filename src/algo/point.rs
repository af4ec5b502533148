//! Han/fu scoring for completed hands.
//!
//! [`HanFuScorer::score_hand`] evaluates every head-plus-sets interpretation
//! of the hand, picks the highest-scoring one, and converts han/fu to a point
//! total. Tiles beyond the interpretation are ignored, consistent with the
//! distance calculation in [`super::shanten`]. A hand that cannot be
//! completed, or that completes without any yaku, is an error.

use crate::algo::agari::{Division, Mentsu, find_divisions};
use crate::algo::shanten;
use crate::hand::{Meld, MeldKind, TileCounts, count_tiles};
use crate::tile::Tile;
use crate::tu8;

use std::error::Error;
use std::fmt;

use serde::Serialize;

pub const YAKUMAN_HAN: u8 = 13;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreError {
    /// No interpretation reaches a head plus the required sets.
    NotComplete,
    /// Complete, but no interpretation carries a yaku.
    NoYaku,
    /// The designated winning tile does not occur in the hand.
    WinTileAbsent,
}

impl fmt::Display for ScoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotComplete => f.write_str("hand is not a winning shape"),
            Self::NoYaku => f.write_str("winning shape carries no yaku"),
            Self::WinTileAbsent => f.write_str("winning tile is not part of the hand"),
        }
    }
}

impl Error for ScoreError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Scored {
    pub han: u8,
    pub fu: u8,
    pub points: u32,
}

/// Stateless han/fu scorer with a fixed seat context.
#[derive(Debug, Clone)]
pub struct HanFuScorer {
    pub round_wind: Tile,
    pub seat_wind: Tile,
}

impl Default for HanFuScorer {
    /// East round, South seat: a concealed non-dealer hand.
    fn default() -> Self {
        Self {
            round_wind: Tile::new_unchecked(tu8!(E)),
            seat_wind: Tile::new_unchecked(tu8!(S)),
        }
    }
}

/// One set plus the flags the yaku/fu rules care about.
#[derive(Clone, Copy)]
struct SetInfo {
    mentsu: Mentsu,
    /// Counts towards sanankou/suuankou.
    concealed: bool,
    kan: bool,
}

impl HanFuScorer {
    #[must_use]
    pub const fn new(round_wind: Tile, seat_wind: Tile) -> Self {
        Self {
            round_wind,
            seat_wind,
        }
    }

    #[must_use]
    pub const fn is_dealer(&self) -> bool {
        self.seat_wind.as_u8() == tu8!(E)
    }

    /// Score a winning hand. `hand` is the concealed tiles including the
    /// winning tile; melds are listed separately.
    pub fn score_hand(
        &self,
        hand: &[Tile],
        melds: &[Meld],
        win_tile: Tile,
        is_self_draw: bool,
        is_riichi: bool,
    ) -> Result<Scored, ScoreError> {
        let counts = count_tiles(hand);
        if counts[win_tile.as_usize()] == 0 {
            return Err(ScoreError::WinTileAbsent);
        }

        let is_menzen = melds.iter().all(|m| !m.is_open());
        let mut full = counts;
        for m in melds {
            m.add_to(&mut full);
        }

        let mut best: Option<Scored> = None;
        let mut complete = false;

        if melds.is_empty() && shanten::kokushi(&counts) == -1 {
            complete = true;
            consider(&mut best, self.tally(YAKUMAN_HAN, 0, is_self_draw));
        }

        if melds.is_empty() {
            let pairs = counts.iter().filter(|&&c| c >= 2).count();
            if pairs >= 7 {
                complete = true;
                consider(&mut best, self.score_chiitoitsu(&full, is_self_draw, is_riichi));
            }
        }

        let n_sets = 4_usize.saturating_sub(melds.len());
        for div in find_divisions(&counts, n_sets) {
            complete = true;

            let mut win_groups: Vec<Option<usize>> = Vec::new();
            if div.head == win_tile.as_u8() {
                win_groups.push(None);
            }
            for (idx, m) in div.body.iter().enumerate() {
                if m.contains(win_tile.as_u8()) {
                    win_groups.push(Some(idx));
                }
            }

            for wg in win_groups {
                if let Some(scored) = self.score_division(
                    &div,
                    melds,
                    &full,
                    wg,
                    win_tile,
                    is_menzen,
                    is_self_draw,
                    is_riichi,
                ) {
                    consider(&mut best, scored);
                }
            }
        }

        match best {
            Some(s) => Ok(s),
            None => Err(if complete {
                ScoreError::NoYaku
            } else {
                ScoreError::NotComplete
            }),
        }
    }

    fn score_chiitoitsu(&self, full: &TileCounts, is_self_draw: bool, is_riichi: bool) -> Scored {
        let mut han = 2;
        if is_riichi {
            han += 1;
        }
        if is_self_draw {
            han += 1;
        }
        if is_tanyao(full) {
            han += 1;
        }
        if is_honroutou(full) {
            han += 2;
        }
        if is_chinitsu(full) {
            han += 6;
        } else if is_honitsu(full) {
            han += 3;
        }
        self.tally(han, 25, is_self_draw)
    }

    #[allow(clippy::too_many_arguments)]
    fn score_division(
        &self,
        div: &Division,
        melds: &[Meld],
        full: &TileCounts,
        wg: Option<usize>,
        win_tile: Tile,
        is_menzen: bool,
        is_self_draw: bool,
        is_riichi: bool,
    ) -> Option<Scored> {
        let mut sets: Vec<SetInfo> = div
            .body
            .iter()
            .enumerate()
            .map(|(idx, &mentsu)| SetInfo {
                mentsu,
                // a triplet completed by a claimed discard is not concealed
                concealed: !(matches!(mentsu, Mentsu::Koutsu(_))
                    && !is_self_draw
                    && wg == Some(idx)),
                kan: false,
            })
            .collect();
        for m in melds {
            sets.push(match m.kind {
                MeldKind::Chi => SetInfo {
                    mentsu: Mentsu::Shuntsu(m.tile.as_u8()),
                    concealed: false,
                    kan: false,
                },
                MeldKind::Pon => SetInfo {
                    mentsu: Mentsu::Koutsu(m.tile.as_u8()),
                    concealed: false,
                    kan: false,
                },
                MeldKind::Minkan => SetInfo {
                    mentsu: Mentsu::Koutsu(m.tile.as_u8()),
                    concealed: false,
                    kan: true,
                },
                MeldKind::Ankan => SetInfo {
                    mentsu: Mentsu::Koutsu(m.tile.as_u8()),
                    concealed: true,
                    kan: true,
                },
            });
        }

        let koutsu_of = |tid: u8| {
            sets.iter()
                .any(|s| matches!(s.mentsu, Mentsu::Koutsu(t) if t == tid))
        };
        let dragon_koutsu = [tu8!(P), tu8!(F), tu8!(C)]
            .iter()
            .filter(|&&t| koutsu_of(t))
            .count();
        let concealed_koutsu = sets
            .iter()
            .filter(|s| matches!(s.mentsu, Mentsu::Koutsu(_)) && s.concealed)
            .count();
        let all_koutsu = sets.iter().all(|s| matches!(s.mentsu, Mentsu::Koutsu(_)));

        let mut han: u8 = 0;
        let mut yakuman = false;

        if dragon_koutsu == 3 {
            yakuman = true;
        }
        if concealed_koutsu == 4 {
            yakuman = true;
        }

        let pinfu = is_menzen
            && melds.is_empty()
            && div.body.iter().all(|m| matches!(m, Mentsu::Shuntsu(_)))
            && !self.is_yakuhai(div.head)
            && is_ryanmen_wait(div, wg, win_tile.as_u8());

        if yakuman {
            han = YAKUMAN_HAN;
        } else {
            if is_riichi && is_menzen {
                han += 1;
            }
            if is_menzen && is_self_draw {
                han += 1;
            }
            if pinfu {
                han += 1;
            }
            if is_tanyao(full) {
                han += 1;
            }
            for &t in &[
                tu8!(P),
                tu8!(F),
                tu8!(C),
                self.round_wind.as_u8(),
                self.seat_wind.as_u8(),
            ] {
                if t >= tu8!(E) && koutsu_of(t) {
                    han += 1;
                }
            }
            if is_menzen {
                let mut runs: Vec<u8> = div
                    .body
                    .iter()
                    .filter_map(|m| match m {
                        Mentsu::Shuntsu(t) => Some(*t),
                        Mentsu::Koutsu(_) => None,
                    })
                    .collect();
                runs.sort_unstable();
                let mut identical = 0;
                let mut i = 0;
                while i + 1 < runs.len() {
                    if runs[i] == runs[i + 1] {
                        identical += 1;
                        i += 2;
                    } else {
                        i += 1;
                    }
                }
                match identical {
                    2 => han += 3,
                    1 => han += 1,
                    _ => {}
                }
            }
            let run_of = |tid: u8| {
                sets.iter()
                    .any(|s| matches!(s.mentsu, Mentsu::Shuntsu(t) if t == tid))
            };
            for base in [0, 9, 18] {
                if run_of(base) && run_of(base + 3) && run_of(base + 6) {
                    han += if is_menzen { 2 } else { 1 };
                    break;
                }
            }
            for rank in 0..7 {
                if run_of(rank) && run_of(rank + 9) && run_of(rank + 18) {
                    han += if is_menzen { 2 } else { 1 };
                    break;
                }
            }
            for rank in 0..9 {
                if koutsu_of(rank) && koutsu_of(rank + 9) && koutsu_of(rank + 18) {
                    han += 2;
                    break;
                }
            }
            if all_koutsu {
                han += 2;
            }
            if concealed_koutsu == 3 {
                han += 2;
            }
            if dragon_koutsu == 2 && Tile::new_unchecked(div.head).is_sangenpai() {
                han += 2;
            }
            let head_tile = Tile::new_unchecked(div.head);
            if is_honroutou(full) {
                han += 2;
            } else if sets.iter().all(|s| s.mentsu.has_yaokyuu()) && head_tile.is_yaokyuu() {
                let junchan = !head_tile.is_jihai()
                    && sets.iter().all(|s| match s.mentsu {
                        Mentsu::Shuntsu(_) => true,
                        Mentsu::Koutsu(t) => !Tile::new_unchecked(t).is_jihai(),
                    });
                han += match (junchan, is_menzen) {
                    (true, true) => 3,
                    (true, false) | (false, true) => 2,
                    (false, false) => 1,
                };
            }
            if is_chinitsu(full) {
                han += if is_menzen { 6 } else { 5 };
            } else if is_honitsu(full) {
                han += if is_menzen { 3 } else { 2 };
            }
        }

        if han == 0 {
            return None;
        }

        let fu = if yakuman {
            0
        } else if pinfu {
            if is_self_draw { 20 } else { 30 }
        } else {
            let mut fu = 20_u8;
            if is_self_draw {
                fu += 2;
            } else if is_menzen {
                fu += 10;
            }

            if div.head == self.round_wind.as_u8() {
                fu += 2;
            }
            if div.head == self.seat_wind.as_u8() {
                fu += 2;
            }
            if Tile::new_unchecked(div.head).is_sangenpai() {
                fu += 2;
            }

            match wg {
                None => fu += 2, // tanki
                Some(idx) => {
                    if let Mentsu::Shuntsu(t) = div.body[idx] {
                        let w = win_tile.as_u8();
                        if w == t + 1 {
                            fu += 2; // kanchan
                        } else if (w == t + 2 && t % 9 == 0) || (w == t && t % 9 == 6) {
                            fu += 2; // penchan
                        }
                    }
                }
            }

            for s in &sets {
                if let Mentsu::Koutsu(t) = s.mentsu {
                    let mut f: u8 = if s.concealed { 4 } else { 2 };
                    if s.kan {
                        f *= 4;
                    }
                    if Tile::new_unchecked(t).is_yaokyuu() {
                        f *= 2;
                    }
                    fu += f;
                }
            }

            if fu == 20 && !is_self_draw {
                fu = 30;
            }
            fu.div_ceil(10) * 10
        };

        Some(self.tally(han, fu, is_self_draw))
    }

    fn tally(&self, han: u8, fu: u8, is_self_draw: bool) -> Scored {
        Scored {
            han,
            fu,
            points: points_total(han, fu, self.is_dealer(), is_self_draw),
        }
    }

    fn is_yakuhai(&self, tid: u8) -> bool {
        tid == self.round_wind.as_u8()
            || tid == self.seat_wind.as_u8()
            || Tile::new_unchecked(tid).is_sangenpai()
    }
}

fn consider(best: &mut Option<Scored>, scored: Scored) {
    let better = match best {
        None => true,
        Some(b) => {
            scored.points > b.points
                || (scored.points == b.points
                    && (scored.han, scored.fu) > (b.han, b.fu))
        }
    };
    if better {
        *best = Some(scored);
    }
}

fn is_ryanmen_wait(div: &Division, wg: Option<usize>, win: u8) -> bool {
    match wg {
        Some(idx) => match div.body[idx] {
            Mentsu::Shuntsu(t) => {
                (win == t && t % 9 != 6) || (win == t + 2 && t % 9 != 0)
            }
            Mentsu::Koutsu(_) => false,
        },
        None => false,
    }
}

fn is_tanyao(full: &TileCounts) -> bool {
    shanten::YAOKYUU_IDS.iter().all(|&i| full[i] == 0)
}

fn is_honroutou(full: &TileCounts) -> bool {
    full.iter()
        .enumerate()
        .all(|(i, &c)| c == 0 || shanten::YAOKYUU_IDS.contains(&i))
}

fn is_chinitsu(full: &TileCounts) -> bool {
    let suits = suits_present(full);
    suits.iter().take(3).filter(|&&p| p).count() == 1 && !suits[3]
}

fn is_honitsu(full: &TileCounts) -> bool {
    let suits = suits_present(full);
    suits.iter().take(3).filter(|&&p| p).count() == 1 && suits[3]
}

fn suits_present(full: &TileCounts) -> [bool; 4] {
    let mut present = [false; 4];
    for (i, &c) in full.iter().enumerate() {
        if c > 0 {
            present[Tile::new_unchecked(i as u8).suit() as usize] = true;
        }
    }
    present
}

/// Convert han/fu to the winner's point total.
#[must_use]
pub fn points_total(han: u8, fu: u8, is_dealer: bool, is_self_draw: bool) -> u32 {
    let base = if han >= 5 {
        match han {
            5 => 2000,
            6 | 7 => 3000,
            8..=10 => 4000,
            11 | 12 => 6000,
            _ => 8000 * (han as u32 / 13),
        }
    } else {
        (u32::from(fu) << (2 + u32::from(han))).min(2000)
    };

    if is_self_draw {
        if is_dealer {
            3 * ceil_100(base * 2)
        } else {
            ceil_100(base * 2) + 2 * ceil_100(base)
        }
    } else if is_dealer {
        ceil_100(base * 6)
    } else {
        ceil_100(base * 4)
    }
}

fn ceil_100(val: u32) -> u32 {
    val.div_ceil(100) * 100
}
