//! Best-five hand evaluation.
//!
//! Terminal showdowns rank an 8-card pool (2 hole cards plus the full
//! 6-card board), so the evaluator takes any 2..=8 cards and reports the
//! strongest 5-card subset. Comparison is the derived lexicographic order
//! on `(category, kickers)`, which reproduces standard poker ranking.

use arrayvec::ArrayVec;

use crate::poker::{Card, RANK_ACE};

/// Hand categories in ascending strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HandCategory {
    HighCard,
    OnePair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
}

/// A comparable hand strength: category plus tie-break kickers.
///
/// Kickers are ranks in descending tie-break order; unused slots are zero.
/// The wheel (A-2-3-4-5) is a straight with high card 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandValue {
    pub category: HandCategory,
    pub kickers: [u8; 5],
}

/// Rank multiset entry: `(count, rank)`, sorted descending.
type Groups = ArrayVec<(u8, u8), 5>;

/// Evaluate exactly five cards.
#[must_use]
pub fn evaluate_five(cards: [Card; 5]) -> HandValue {
    let mut ranks = [0u8; 5];
    for (slot, card) in ranks.iter_mut().zip(cards.iter()) {
        *slot = card.rank();
    }
    ranks.sort_unstable_by(|a, b| b.cmp(a));

    let is_flush = cards.iter().all(|c| c.suit() == cards[0].suit());
    let groups = rank_groups(&ranks);
    let straight_high = straight_high(&ranks);

    if let Some(high) = straight_high {
        if is_flush {
            return HandValue {
                category: HandCategory::StraightFlush,
                kickers: [high, 0, 0, 0, 0],
            };
        }
    }
    if groups[0].0 == 4 {
        return HandValue {
            category: HandCategory::FourOfAKind,
            kickers: [groups[0].1, groups[1].1, 0, 0, 0],
        };
    }
    if groups[0].0 == 3 && groups.len() > 1 && groups[1].0 == 2 {
        return HandValue {
            category: HandCategory::FullHouse,
            kickers: [groups[0].1, groups[1].1, 0, 0, 0],
        };
    }
    if is_flush {
        return HandValue {
            category: HandCategory::Flush,
            kickers: ranks,
        };
    }
    if let Some(high) = straight_high {
        return HandValue {
            category: HandCategory::Straight,
            kickers: [high, 0, 0, 0, 0],
        };
    }
    if groups[0].0 == 3 {
        let mut kickers = [groups[0].1, 0, 0, 0, 0];
        fill_singles(&groups, &mut kickers[1..3]);
        return HandValue {
            category: HandCategory::ThreeOfAKind,
            kickers,
        };
    }
    if groups[0].0 == 2 && groups.len() > 1 && groups[1].0 == 2 {
        let mut kickers = [groups[0].1, groups[1].1, 0, 0, 0];
        fill_singles(&groups, &mut kickers[2..3]);
        return HandValue {
            category: HandCategory::TwoPair,
            kickers,
        };
    }
    if groups[0].0 == 2 {
        let mut kickers = [groups[0].1, 0, 0, 0, 0];
        fill_singles(&groups, &mut kickers[1..4]);
        return HandValue {
            category: HandCategory::OnePair,
            kickers,
        };
    }
    HandValue {
        category: HandCategory::HighCard,
        kickers: ranks,
    }
}

/// Evaluate the best 5-card hand from 2..=8 cards.
///
/// Fewer than five cards degenerate to a well-ordered high-card value over
/// the available ranks.
#[must_use]
pub fn evaluate_best(cards: &[Card]) -> HandValue {
    let n = cards.len();
    debug_assert!((2..=8).contains(&n), "evaluator takes 2..=8 cards, got {n}");

    if n < 5 {
        let mut ranks: ArrayVec<u8, 5> = cards.iter().map(|c| c.rank()).collect();
        ranks.sort_unstable_by(|a, b| b.cmp(a));
        let mut kickers = [0u8; 5];
        kickers[..ranks.len()].copy_from_slice(&ranks);
        return HandValue {
            category: HandCategory::HighCard,
            kickers,
        };
    }

    let mut best: Option<HandValue> = None;
    for a in 0..n - 4 {
        for b in a + 1..n - 3 {
            for c in b + 1..n - 2 {
                for d in c + 1..n - 1 {
                    for e in d + 1..n {
                        let value =
                            evaluate_five([cards[a], cards[b], cards[c], cards[d], cards[e]]);
                        if best.map_or(true, |current| value > current) {
                            best = Some(value);
                        }
                    }
                }
            }
        }
    }
    best.expect("at least one 5-card subset")
}

/// Rank multiset of a descending-sorted rank array, ordered by
/// `(count, rank)` descending.
fn rank_groups(ranks: &[u8; 5]) -> Groups {
    let mut counts = [0u8; 13];
    for &r in ranks {
        counts[r as usize] += 1;
    }
    let mut groups = Groups::new();
    for r in (0..13u8).rev() {
        if counts[r as usize] > 0 {
            groups.push((counts[r as usize], r));
        }
    }
    groups.sort_unstable_by(|a, b| b.cmp(a));
    groups
}

/// Straight high card for a descending-sorted rank array, if any.
///
/// The 5-high wheel A-2-3-4-5 counts with high card 3.
fn straight_high(ranks: &[u8; 5]) -> Option<u8> {
    let mut unique: ArrayVec<u8, 5> = ArrayVec::new();
    for &r in ranks {
        if unique.last() != Some(&r) {
            unique.push(r);
        }
    }
    if unique.len() != 5 {
        return None;
    }
    if unique[0] - unique[4] == 4 {
        return Some(unique[0]);
    }
    if unique[0] == RANK_ACE && unique[1] == 3 && unique[2] == 2 && unique[3] == 1 && unique[4] == 0
    {
        return Some(3);
    }
    None
}

/// Copy single-card ranks (descending) into the kicker slots.
fn fill_singles(groups: &Groups, slots: &mut [u8]) {
    let mut singles = groups.iter().filter(|g| g.0 == 1).map(|g| g.1);
    for slot in slots {
        *slot = singles.next().unwrap_or(0);
    }
}
