//! Card representation for the 52-card deck.
//!
//! A card is a single byte `rank * 4 + suit`, with rank 0 (deuce) through
//! 12 (ace) and suit 0 through 3. The abstraction layer and the binary
//! artifact are specified directly against this encoding.

use std::fmt;

/// Number of distinct ranks (deuce through ace).
pub const NUM_RANKS: u8 = 13;
/// Number of suits.
pub const NUM_SUITS: u8 = 4;
/// Cards in a full deck.
pub const DECK_SIZE: usize = 52;

/// Rank of a ten; ranks at or above this are broadway cards.
pub const RANK_TEN: u8 = 8;
/// Rank of an ace, the highest rank.
pub const RANK_ACE: u8 = 12;

const RANK_CHARS: [char; 13] = [
    '2', '3', '4', '5', '6', '7', '8', '9', 'T', 'J', 'Q', 'K', 'A',
];
const SUIT_CHARS: [char; 4] = ['c', 'd', 'h', 's'];

/// A playing card packed into one byte as `rank * 4 + suit`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Card(u8);

impl Card {
    /// Build a card from a rank (0 = deuce .. 12 = ace) and a suit (0..=3).
    #[must_use]
    pub const fn new(rank: u8, suit: u8) -> Self {
        Self(rank * NUM_SUITS + suit)
    }

    /// Reinterpret a raw deck index (0..52) as a card.
    #[must_use]
    pub const fn from_index(index: u8) -> Self {
        Self(index)
    }

    /// Rank in 0..=12, 0 = deuce, 12 = ace.
    #[must_use]
    pub const fn rank(self) -> u8 {
        self.0 / NUM_SUITS
    }

    /// Suit in 0..=3.
    #[must_use]
    pub const fn suit(self) -> u8 {
        self.0 % NUM_SUITS
    }

    /// The raw byte encoding.
    #[must_use]
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Parse two-character notation such as `As`, `Td`, `2c`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn parse(s: &str) -> Option<Self> {
        let mut chars = s.chars();
        let rank_char = chars.next()?;
        let suit_char = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        let rank = RANK_CHARS.iter().position(|&c| c == rank_char)?;
        let suit = SUIT_CHARS.iter().position(|&c| c == suit_char)?;
        Some(Self::new(rank as u8, suit as u8))
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            RANK_CHARS[self.rank() as usize],
            SUIT_CHARS[self.suit() as usize]
        )
    }
}

impl fmt::Debug for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// All 52 cards in encoding order.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn full_deck() -> [Card; DECK_SIZE] {
    let mut deck = [Card::default(); DECK_SIZE];
    for (i, card) in deck.iter_mut().enumerate() {
        *card = Card::from_index(i as u8);
    }
    deck
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_and_suit_roundtrip() {
        for rank in 0..NUM_RANKS {
            for suit in 0..NUM_SUITS {
                let card = Card::new(rank, suit);
                assert_eq!(card.rank(), rank);
                assert_eq!(card.suit(), suit);
            }
        }
    }

    #[test]
    fn full_deck_is_distinct() {
        let deck = full_deck();
        let unique: std::collections::HashSet<_> = deck.iter().map(|c| c.index()).collect();
        assert_eq!(unique.len(), DECK_SIZE);
    }

    #[test]
    fn parse_display_roundtrip() {
        for card in full_deck() {
            let text = card.to_string();
            assert_eq!(Card::parse(&text), Some(card), "roundtrip failed for {text}");
        }
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(Card::parse(""), None);
        assert_eq!(Card::parse("A"), None);
        assert_eq!(Card::parse("Ax"), None);
        assert_eq!(Card::parse("1s"), None);
        assert_eq!(Card::parse("Asx"), None);
    }

    #[test]
    fn ace_of_spades_encoding() {
        let card = Card::parse("As").unwrap();
        assert_eq!(card.rank(), RANK_ACE);
        assert_eq!(card.index(), 51);
    }
}
