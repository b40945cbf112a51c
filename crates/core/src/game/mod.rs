//! Toss'em Hold'em game model.
//!
//! Players, the closed action space, table stakes, and the hand state
//! machine ([`TossemState`]).

mod tossem;

pub use tossem::{TossemState, Undo};

use arrayvec::ArrayVec;

/// Chips each player starts the hand with.
pub const STARTING_STACK: u32 = 400;
/// Small blind, posted by the first player to act preflop.
pub const SMALL_BLIND: u32 = 1;
/// Big blind.
pub const BIG_BLIND: u32 = 2;

/// Betting actions tracked by the regret tables.
pub const NUM_BET_ACTIONS: usize = 4;
/// Maximum number of legal actions at any decision point.
pub const MAX_ACTIONS: usize = 4;

/// Stack-allocated action list returned by [`TossemState::legal_actions`].
pub type Actions = ArrayVec<Action, MAX_ACTIONS>;

/// A player position in the heads-up game.
///
/// The small blind is player 0 and acts first preflop; the big blind is
/// player 1 and acts first on every later street.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    SmallBlind,
    BigBlind,
}

impl Player {
    /// Both positions, in index order.
    pub const ALL: [Self; 2] = [Self::SmallBlind, Self::BigBlind];

    /// The other player.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::SmallBlind => Self::BigBlind,
            Self::BigBlind => Self::SmallBlind,
        }
    }

    /// Index into per-player arrays: SB = 0, BB = 1.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::SmallBlind => 0,
            Self::BigBlind => 1,
        }
    }
}

/// One move in the hand.
///
/// The betting actions carry the distinct-action indices 0..=3 used by the
/// regret tables and the legal mask; `Discard(slot)` exposes hole card
/// `slot` and occupies indices 4..=6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Fold,
    CheckCall,
    RaiseSmall,
    RaiseLarge,
    Discard(u8),
}

impl Action {
    /// Distinct-action index: betting 0..=3, discards 4..=6.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Fold => 0,
            Self::CheckCall => 1,
            Self::RaiseSmall => 2,
            Self::RaiseLarge => 3,
            Self::Discard(slot) => 4 + slot as usize,
        }
    }

    /// Whether this is a discard rather than a betting action.
    #[must_use]
    pub const fn is_discard(self) -> bool {
        matches!(self, Self::Discard(_))
    }
}
