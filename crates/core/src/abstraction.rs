//! Information-set abstraction.
//!
//! Concrete game states collapse onto a small hashable [`InfoKey`] by
//! bucketing hole cards, board texture, pot size, and betting history.
//! Every bucketer is a pure function of its inputs; two states that bucket
//! identically share one policy node.

use crate::game::{Action, Player};
use crate::poker::{Card, NUM_RANKS, NUM_SUITS, RANK_TEN};

/// Streets of a Toss'em hand.
///
/// `Flop` is the post-flop betting round. The discard streets are decision
/// points but never learning targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Street {
    Preflop,
    Flop,
    BbDiscard,
    SbDiscard,
    Turn,
    River,
}

impl Street {
    /// The persisted street code.
    ///
    /// The artifact uses the 7-value form in which 1 is the transient flop
    /// deal (never a decision, never written) and post-flop betting is 4.
    #[must_use]
    pub const fn wire_code(self) -> u8 {
        match self {
            Self::Preflop => 0,
            Self::BbDiscard => 2,
            Self::SbDiscard => 3,
            Self::Flop => 4,
            Self::Turn => 5,
            Self::River => 6,
        }
    }

    /// Inverse of [`wire_code`](Self::wire_code).
    #[must_use]
    pub const fn from_wire_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Preflop),
            2 => Some(Self::BbDiscard),
            3 => Some(Self::SbDiscard),
            4 => Some(Self::Flop),
            5 => Some(Self::Turn),
            6 => Some(Self::River),
            _ => None,
        }
    }

    /// Whether this is one of the two discard streets.
    #[must_use]
    pub const fn is_discard(self) -> bool {
        matches!(self, Self::BbDiscard | Self::SbDiscard)
    }
}

/// Bits of the legal-action mask that survive into the key (and artifact).
pub const LEGAL_MASK_BITS: u8 = 0x3F;

/// Fixed-layout information-set fingerprint.
///
/// The `street` field always holds the wire code so keys serialize as a
/// plain field copy. Two states with equal keys share a policy node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InfoKey {
    pub player: u8,
    pub street: u8,
    pub hole_bucket: u16,
    pub board_bucket: u16,
    pub pot_bucket: u8,
    pub hist_bucket: u8,
    pub bb_discarded: bool,
    pub sb_discarded: bool,
    pub legal_mask: u8,
}

/// Combine the bucketed features of a decision point into its key.
#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn info_key(
    player: Player,
    street: Street,
    hole: &[Card],
    board: &[Card],
    pot: u32,
    history: &[(Player, Action)],
    bb_discarded: bool,
    sb_discarded: bool,
    legal_mask: u8,
) -> InfoKey {
    #[allow(clippy::cast_possible_truncation)]
    let player = player.index() as u8;
    InfoKey {
        player,
        street: street.wire_code(),
        hole_bucket: hole_bucket(hole),
        board_bucket: board_bucket(board),
        pot_bucket: pot_bucket(pot),
        hist_bucket: history_bucket(history),
        bb_discarded,
        sb_discarded,
        legal_mask: legal_mask & LEGAL_MASK_BITS,
    }
}

/// Bucket a 2- or 3-card holding.
///
/// Two cards (post-discard) map onto the 169 canonical hand classes;
/// three cards (pre-discard) map onto 40 heuristic-strength bins.
#[must_use]
pub fn hole_bucket(hole: &[Card]) -> u16 {
    match hole {
        [a, b] => hole_bucket_two(*a, *b),
        [a, b, c] => hole_bucket_three(*a, *b, *c),
        _ => unreachable!("hole holdings are 2 or 3 cards, got {}", hole.len()),
    }
}

/// The 169 canonical two-card classes: 13 pairs, then 78 off-suit and 78
/// suited non-pairs keyed by `(high, low)`.
fn hole_bucket_two(a: Card, b: Card) -> u16 {
    let hi = a.rank().max(b.rank());
    let lo = a.rank().min(b.rank());
    if hi == lo {
        return u16::from(hi);
    }
    let mut bucket = 13 + u16::from(hi) * (u16::from(hi) - 1) / 2 + u16::from(lo);
    if a.suit() == b.suit() {
        bucket += 78;
    }
    bucket
}

/// Heuristic strength bins for the pre-discard three-card holding.
fn hole_bucket_three(a: Card, b: Card, c: Card) -> u16 {
    let mut ranks = [a.rank(), b.rank(), c.rank()];
    ranks.sort_unstable_by(|x, y| y.cmp(x));
    let [hi, mid, lo] = ranks;

    let trips = hi == mid && mid == lo;
    let pair = hi == mid || mid == lo;

    let mut suit_counts = [0u8; NUM_SUITS as usize];
    for card in [a, b, c] {
        suit_counts[card.suit() as usize] += 1;
    }
    let flush_count = suit_counts.iter().copied().max().unwrap_or(1);

    let mut straight_potential = 0u16;
    for window in ranks.windows(2) {
        if window[0] != window[1] && window[0] - window[1] <= 2 {
            straight_potential += 1;
        }
    }

    let mut strength =
        2 * u16::from(hi) + u16::from(mid) + u16::from(lo) + u16::from(flush_count - 1) * 8;
    if trips {
        strength += 30;
    } else if pair {
        strength += 15;
    }
    strength += straight_potential * 5;

    (strength / 6).min(39)
}

/// Coarse board texture in at most 25 buckets.
///
/// Features: paired board, flush-draw level, straight-draw level, and
/// whether the high card is broadway.
#[must_use]
pub fn board_bucket(board: &[Card]) -> u16 {
    if board.is_empty() {
        return 0;
    }

    let mut rank_counts = [0u8; NUM_RANKS as usize];
    let mut suit_counts = [0u8; NUM_SUITS as usize];
    let mut high_card = 0u8;
    for card in board {
        rank_counts[card.rank() as usize] += 1;
        suit_counts[card.suit() as usize] += 1;
        high_card = high_card.max(card.rank());
    }
    let max_rank_count = rank_counts.iter().copied().max().unwrap_or(0);
    let max_suit_count = suit_counts.iter().copied().max().unwrap_or(0);

    let paired = u16::from(max_rank_count >= 2);
    let flush_draw = u16::from((max_suit_count - 1).min(2));
    let straight_draw = u16::from(straight_window(&rank_counts).saturating_sub(2).min(2));
    let broadway = u16::from(high_card >= RANK_TEN);

    (paired * 12 + flush_draw * 4 + straight_draw * 2 + broadway).min(24)
}

/// Most distinct ranks that fit inside a straight-sized window (span <= 4).
fn straight_window(rank_counts: &[u8; NUM_RANKS as usize]) -> u8 {
    let mut best = 0u8;
    for low in 0..NUM_RANKS {
        let mut in_window = 0u8;
        for rank in low..NUM_RANKS.min(low + 5) {
            if rank_counts[rank as usize] > 0 {
                in_window += 1;
            }
        }
        best = best.max(in_window);
    }
    best
}

/// Six pot-size bins with thresholds {4, 10, 25, 60, 140, inf}.
#[must_use]
pub fn pot_bucket(pot: u32) -> u8 {
    match pot {
        0..=4 => 0,
        5..=10 => 1,
        11..=25 => 2,
        26..=60 => 3,
        61..=140 => 4,
        _ => 5,
    }
}

/// Six bins summarizing the betting history by raise count and size.
#[must_use]
pub fn history_bucket(history: &[(Player, Action)]) -> u8 {
    if history.is_empty() {
        return 0;
    }

    let mut raises = 0u32;
    let mut large_raises = 0u32;
    for &(_, action) in history {
        match action {
            Action::RaiseSmall => raises += 1,
            Action::RaiseLarge => {
                raises += 1;
                large_raises += 1;
            }
            _ => {}
        }
    }

    match (raises, large_raises) {
        (0, _) => 1,
        (1, 0) => 2,
        (1, _) => 3,
        (2, _) => 4,
        _ => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cards(spec: &str) -> Vec<Card> {
        spec.split_whitespace()
            .map(|s| Card::parse(s).expect("valid card"))
            .collect()
    }

    #[test]
    fn wire_codes_roundtrip() {
        for street in [
            Street::Preflop,
            Street::Flop,
            Street::BbDiscard,
            Street::SbDiscard,
            Street::Turn,
            Street::River,
        ] {
            assert_eq!(Street::from_wire_code(street.wire_code()), Some(street));
        }
        // 1 is the transient flop deal and never persisted.
        assert_eq!(Street::from_wire_code(1), None);
        assert_eq!(Street::from_wire_code(7), None);
    }

    #[test]
    fn flop_betting_persists_as_four() {
        assert_eq!(Street::Flop.wire_code(), 4);
        assert_eq!(Street::Turn.wire_code(), 5);
        assert_eq!(Street::River.wire_code(), 6);
    }

    #[test]
    fn pair_buckets_are_ranks() {
        assert_eq!(hole_bucket(&cards("2c 2d")), 0);
        assert_eq!(hole_bucket(&cards("8h 8s")), 6);
        assert_eq!(hole_bucket(&cards("Ac Ah")), 12);
    }

    #[test]
    fn nonpair_buckets_cover_169_classes() {
        // Lowest off-suit combo: 32o.
        assert_eq!(hole_bucket(&cards("3c 2d")), 13);
        // Highest off-suit combo: AKo.
        assert_eq!(hole_bucket(&cards("Ac Kd")), 90);
        // Suited shifts by 78: AKs is the top bucket.
        assert_eq!(hole_bucket(&cards("As Ks")), 168);
    }

    #[test]
    fn two_card_bucket_ignores_card_order() {
        assert_eq!(hole_bucket(&cards("Kd 7c")), hole_bucket(&cards("7c Kd")));
        assert_eq!(hole_bucket(&cards("Qh 9h")), hole_bucket(&cards("9h Qh")));
    }

    #[test]
    fn three_card_buckets_stay_in_range() {
        for spec in ["2c 3d 7h", "As Ah Ad", "Ks Qs Js", "2c 2d 2h", "Ac Kc 2d"] {
            let bucket = hole_bucket(&cards(spec));
            assert!(bucket <= 39, "{spec} bucketed to {bucket}");
        }
        // Premium trips should outrank junk.
        assert!(hole_bucket(&cards("As Ah Ad")) > hole_bucket(&cards("2c 7d 3h")));
    }

    #[test]
    fn empty_board_is_bucket_zero() {
        assert_eq!(board_bucket(&[]), 0);
    }

    #[test]
    fn board_buckets_stay_in_range() {
        assert!(board_bucket(&cards("2c 7d")) <= 24);
        assert!(board_bucket(&cards("As Ks Qs Js Ts 9s")) <= 24);
        assert!(board_bucket(&cards("2c 2d 2h 2s")) <= 24);
    }

    #[test]
    fn board_features_compose() {
        // Paired, no flush draw, no straight draw, no broadway.
        assert_eq!(board_bucket(&cards("2c 2d 8h")), 12);
        // Broadway high card alone.
        assert_eq!(board_bucket(&cards("Ac 2d 8h")), 1);
        // Two-card flush draw.
        assert_eq!(board_bucket(&cards("2c 8c")), 4);
    }

    #[test]
    fn pot_bucket_thresholds() {
        assert_eq!(pot_bucket(0), 0);
        assert_eq!(pot_bucket(4), 0);
        assert_eq!(pot_bucket(5), 1);
        assert_eq!(pot_bucket(10), 1);
        assert_eq!(pot_bucket(11), 2);
        assert_eq!(pot_bucket(25), 2);
        assert_eq!(pot_bucket(26), 3);
        assert_eq!(pot_bucket(60), 3);
        assert_eq!(pot_bucket(61), 4);
        assert_eq!(pot_bucket(140), 4);
        assert_eq!(pot_bucket(141), 5);
        assert_eq!(pot_bucket(800), 5);
    }

    #[test]
    fn history_buckets_classify_aggression() {
        let sb = Player::SmallBlind;
        let bb = Player::BigBlind;
        assert_eq!(history_bucket(&[]), 0);
        assert_eq!(history_bucket(&[(sb, Action::CheckCall)]), 1);
        assert_eq!(
            history_bucket(&[(sb, Action::RaiseSmall), (bb, Action::CheckCall)]),
            2
        );
        assert_eq!(history_bucket(&[(sb, Action::RaiseLarge)]), 3);
        assert_eq!(
            history_bucket(&[(sb, Action::RaiseSmall), (bb, Action::RaiseLarge)]),
            4
        );
        assert_eq!(
            history_bucket(&[
                (sb, Action::RaiseSmall),
                (bb, Action::RaiseLarge),
                (sb, Action::RaiseLarge),
            ]),
            5
        );
    }

    #[test]
    fn info_key_is_pure() {
        let hole = cards("As Ks");
        let board = cards("2c 7d Th");
        let history = [
            (Player::SmallBlind, Action::RaiseSmall),
            (Player::BigBlind, Action::CheckCall),
        ];
        let build = || {
            info_key(
                Player::BigBlind,
                Street::Flop,
                &hole,
                &board,
                12,
                &history,
                true,
                false,
                0b1111,
            )
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn info_key_masks_to_six_bits() {
        let key = info_key(
            Player::SmallBlind,
            Street::Preflop,
            &cards("As Ks Qs"),
            &[],
            3,
            &[],
            false,
            false,
            0xFF,
        );
        assert_eq!(key.legal_mask, 0x3F);
        assert_eq!(key.street, 0);
        assert_eq!(key.board_bucket, 0);
    }
}
