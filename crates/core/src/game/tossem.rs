//! The Toss'em Hold'em hand state machine.
//!
//! Each player is dealt three hole cards. Betting runs preflop and on every
//! later betting street; after flop betting settles, the big blind and then
//! the small blind each move one hole card face-up onto the board, and the
//! turn card is dealt immediately after the second discard. Showdown ranks
//! each player's two remaining hole cards against the full six-card board
//! (an 8-card pool, best five).
//!
//! The search recursion mutates one live state in place: [`TossemState::apply_action`]
//! returns an [`Undo`] snapshot and [`TossemState::undo_action`] consumes it.
//! Histories and the board only ever append, so restoring the recorded
//! lengths plus the scalar snapshot reverses any action without heap traffic.

use arrayvec::ArrayVec;
use rand::prelude::SliceRandom;
use rand::Rng;

use crate::abstraction::{self, InfoKey, Street};
use crate::hand_eval::evaluate_best;
use crate::poker::{full_deck, Card, DECK_SIZE};

use super::{Action, Actions, Player, BIG_BLIND, SMALL_BLIND, STARTING_STACK};

// ---------------------------------------------------------------------------
// Capacities and raise sizing
// ---------------------------------------------------------------------------

/// Cards left in the deck buffer after dealing both 3-card hands.
const DECK_REMAINDER: usize = DECK_SIZE - 6;

/// A re-raise at least doubles the continue cost once it reaches the big
/// blind, so a street exhausts 400-chip stacks in well under 32 actions.
const MAX_STREET_ACTIONS: usize = 32;
const MAX_HAND_ACTIONS: usize = 96;

/// Pot fraction targeted by [`Action::RaiseSmall`].
const RAISE_SMALL_FRACTION: f64 = 0.55;
/// Pot fraction targeted by [`Action::RaiseLarge`].
const RAISE_LARGE_FRACTION: f64 = 1.0;

type HistoryEntry = (Player, Action);

// ---------------------------------------------------------------------------
// Undo record
// ---------------------------------------------------------------------------

/// Snapshot sufficient to reverse one [`TossemState::apply_action`].
///
/// Holds every scalar plus the prior lengths of the append-only sequences.
/// Hands are captured in full: discarding swaps the chosen card with the
/// last hand slot, and restoring both 3-slot arrays makes that swap exactly
/// reversible.
#[derive(Debug, Clone)]
pub struct Undo {
    street: Street,
    current_player: Player,
    pips: [u32; 2],
    stacks: [u32; 2],
    bb_discarded: bool,
    sb_discarded: bool,
    is_terminal: bool,
    payoffs: [f64; 2],
    history_len: usize,
    street_history_len: usize,
    deck_idx: usize,
    hands: [[Card; 3]; 2],
    hand_sizes: [u8; 2],
    board_len: usize,
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Complete state of one Toss'em hand.
#[derive(Debug, Clone, PartialEq)]
pub struct TossemState {
    hands: [[Card; 3]; 2],
    hand_sizes: [u8; 2],
    board: ArrayVec<Card, 6>,
    deck: [Card; DECK_REMAINDER],
    deck_idx: usize,
    street: Street,
    pips: [u32; 2],
    stacks: [u32; 2],
    current_player: Player,
    history: ArrayVec<HistoryEntry, MAX_HAND_ACTIONS>,
    street_history: ArrayVec<HistoryEntry, MAX_STREET_ACTIONS>,
    bb_discarded: bool,
    sb_discarded: bool,
    is_terminal: bool,
    payoffs: [f64; 2],
}

impl TossemState {
    /// Deal a fresh hand from a shuffled deck.
    #[must_use]
    pub fn new<R: Rng>(rng: &mut R) -> Self {
        let mut deck = full_deck();
        deck.shuffle(rng);
        Self::from_deck(deck)
    }

    /// Deal a hand from an explicit card order: the first three cards go to
    /// the small blind, the next three to the big blind, the rest to the
    /// deck buffer in draw order.
    #[must_use]
    pub fn from_deck(cards: [Card; DECK_SIZE]) -> Self {
        let mut deck = [Card::default(); DECK_REMAINDER];
        deck.copy_from_slice(&cards[6..]);
        Self {
            hands: [
                [cards[0], cards[1], cards[2]],
                [cards[3], cards[4], cards[5]],
            ],
            hand_sizes: [3, 3],
            board: ArrayVec::new(),
            deck,
            deck_idx: 0,
            street: Street::Preflop,
            pips: [SMALL_BLIND, BIG_BLIND],
            stacks: [STARTING_STACK - SMALL_BLIND, STARTING_STACK - BIG_BLIND],
            current_player: Player::SmallBlind,
            history: ArrayVec::new(),
            street_history: ArrayVec::new(),
            bb_discarded: false,
            sb_discarded: false,
            is_terminal: false,
            payoffs: [0.0, 0.0],
        }
    }

    /// Reinitialize in place from a new deal.
    pub fn reset<R: Rng>(&mut self, rng: &mut R) {
        *self = Self::new(rng);
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Total chips contributed by both players.
    #[must_use]
    pub fn pot(&self) -> u32 {
        (STARTING_STACK - self.stacks[0]) + (STARTING_STACK - self.stacks[1])
    }

    /// Chips the current player must add to match the opponent's pip.
    #[must_use]
    pub fn continue_cost(&self) -> u32 {
        self.pips[self.current_player.opponent().index()] - self.pips[self.current_player.index()]
    }

    /// Current street.
    #[must_use]
    pub fn street(&self) -> Street {
        self.street
    }

    /// Player to act.
    #[must_use]
    pub fn current_player(&self) -> Player {
        self.current_player
    }

    /// Whether the hand has ended.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.is_terminal
    }

    /// Terminal payoff for one player, in chips.
    #[must_use]
    pub fn payoff(&self, player: Player) -> f64 {
        self.payoffs[player.index()]
    }

    /// Both terminal payoffs, SB first.
    #[must_use]
    pub fn payoffs(&self) -> [f64; 2] {
        self.payoffs
    }

    /// Per-street contributions, SB first.
    #[must_use]
    pub fn pips(&self) -> [u32; 2] {
        self.pips
    }

    /// Remaining stacks, SB first.
    #[must_use]
    pub fn stacks(&self) -> [u32; 2] {
        self.stacks
    }

    /// Visible board cards.
    #[must_use]
    pub fn board(&self) -> &[Card] {
        &self.board
    }

    /// A player's current hole cards.
    #[must_use]
    pub fn hand(&self, player: Player) -> &[Card] {
        let idx = player.index();
        &self.hands[idx][..self.hand_sizes[idx] as usize]
    }

    /// Full betting history of the hand.
    #[must_use]
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Whether the big blind has already discarded.
    #[must_use]
    pub fn bb_discarded(&self) -> bool {
        self.bb_discarded
    }

    /// Whether the small blind has already discarded.
    #[must_use]
    pub fn sb_discarded(&self) -> bool {
        self.sb_discarded
    }

    /// Whether the current player owes a discard.
    #[must_use]
    pub fn is_discard_phase(&self) -> bool {
        match self.street {
            Street::BbDiscard => !self.bb_discarded,
            Street::SbDiscard => !self.sb_discarded,
            _ => false,
        }
    }

    // -----------------------------------------------------------------------
    // Legal actions
    // -----------------------------------------------------------------------

    /// Legal actions for the current player.
    ///
    /// Empty when terminal. During a discard phase the three discard
    /// actions. Otherwise check/call is always available, fold only when
    /// facing a bet, and the raises only while both sides have chips and
    /// the current player can put in strictly more than the call.
    #[must_use]
    pub fn legal_actions(&self) -> Actions {
        let mut actions = Actions::new();
        if self.is_terminal {
            return actions;
        }
        if self.is_discard_phase() {
            actions.push(Action::Discard(0));
            actions.push(Action::Discard(1));
            actions.push(Action::Discard(2));
            return actions;
        }

        let cost = self.continue_cost();
        if cost == 0 {
            actions.push(Action::CheckCall);
            if self.stacks[0] > 0 && self.stacks[1] > 0 {
                actions.push(Action::RaiseSmall);
                actions.push(Action::RaiseLarge);
            }
        } else {
            actions.push(Action::Fold);
            actions.push(Action::CheckCall);
            let idx = self.current_player.index();
            if cost < self.stacks[idx] && self.stacks[self.current_player.opponent().index()] > 0 {
                actions.push(Action::RaiseSmall);
                actions.push(Action::RaiseLarge);
            }
        }
        actions
    }

    // -----------------------------------------------------------------------
    // Apply / undo
    // -----------------------------------------------------------------------

    /// Apply one action in place, returning the snapshot that reverses it.
    pub fn apply_action(&mut self, action: Action) -> Undo {
        debug_assert!(!self.is_terminal, "apply_action on a terminal state");
        let undo = self.snapshot();

        if self.is_discard_phase() {
            let Action::Discard(slot) = action else {
                unreachable!("betting action {action:?} during discard phase");
            };
            self.apply_discard(slot);
            return undo;
        }

        match action {
            Action::Fold => {
                self.apply_fold();
                return undo;
            }
            Action::CheckCall => self.apply_check_call(),
            Action::RaiseSmall => self.apply_raise(RAISE_SMALL_FRACTION),
            Action::RaiseLarge => self.apply_raise(RAISE_LARGE_FRACTION),
            Action::Discard(_) => unreachable!("discard outside discard phase"),
        }

        self.history.push((self.current_player, action));
        self.street_history.push((self.current_player, action));

        if self.street_settled() {
            self.advance_street();
        } else {
            self.current_player = self.current_player.opponent();
        }
        undo
    }

    /// Reverse the most recent action recorded in `undo`.
    pub fn undo_action(&mut self, undo: Undo) {
        self.street = undo.street;
        self.current_player = undo.current_player;
        self.pips = undo.pips;
        self.stacks = undo.stacks;
        self.bb_discarded = undo.bb_discarded;
        self.sb_discarded = undo.sb_discarded;
        self.is_terminal = undo.is_terminal;
        self.payoffs = undo.payoffs;
        self.history.truncate(undo.history_len);
        self.street_history.truncate(undo.street_history_len);
        self.deck_idx = undo.deck_idx;
        self.hands = undo.hands;
        self.hand_sizes = undo.hand_sizes;
        self.board.truncate(undo.board_len);
    }

    fn snapshot(&self) -> Undo {
        Undo {
            street: self.street,
            current_player: self.current_player,
            pips: self.pips,
            stacks: self.stacks,
            bb_discarded: self.bb_discarded,
            sb_discarded: self.sb_discarded,
            is_terminal: self.is_terminal,
            payoffs: self.payoffs,
            history_len: self.history.len(),
            street_history_len: self.street_history.len(),
            deck_idx: self.deck_idx,
            hands: self.hands,
            hand_sizes: self.hand_sizes,
            board_len: self.board.len(),
        }
    }

    // -----------------------------------------------------------------------
    // Betting actions
    // -----------------------------------------------------------------------

    /// The folder forfeits its total contribution to the opponent.
    fn apply_fold(&mut self) {
        self.is_terminal = true;
        let folder = self.current_player.index();
        let forfeited = f64::from(STARTING_STACK - self.stacks[folder]);
        self.payoffs[folder] = -forfeited;
        self.payoffs[1 - folder] = forfeited;
    }

    fn apply_check_call(&mut self) {
        let cost = self.continue_cost();
        if cost > 0 {
            let idx = self.current_player.index();
            let paid = cost.min(self.stacks[idx]);
            self.pips[idx] += paid;
            self.stacks[idx] -= paid;
        }
    }

    /// Raise toward `round(pot * fraction)`, subject to the minimum raise
    /// `cost + max(cost, BIG_BLIND)` and capped by the remaining stack.
    fn apply_raise(&mut self, fraction: f64) {
        let idx = self.current_player.index();
        let cost = self.continue_cost();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let target = (f64::from(self.pot()) * fraction).round() as u32;
        let min_raise = cost + cost.max(BIG_BLIND);
        let raise = target.max(min_raise).min(self.stacks[idx]);
        let contribution = (cost + raise).min(self.stacks[idx]);
        self.pips[idx] += contribution;
        self.stacks[idx] -= contribution;
    }

    // -----------------------------------------------------------------------
    // Street advancement
    // -----------------------------------------------------------------------

    /// A betting street settles once both players have acted, pips match,
    /// and the closing action was a check/call.
    fn street_settled(&self) -> bool {
        if self.street_history.len() < 2 || self.pips[0] != self.pips[1] {
            return false;
        }
        matches!(self.street_history.last(), Some((_, Action::CheckCall)))
    }

    fn advance_street(&mut self) {
        self.pips = [0, 0];
        self.street_history.clear();

        match self.street {
            Street::Preflop => {
                self.deal_to_board(2);
                self.street = Street::Flop;
                self.current_player = Player::BigBlind;
            }
            Street::Flop => {
                self.street = Street::BbDiscard;
                self.current_player = Player::BigBlind;
            }
            Street::Turn => {
                self.deal_to_board(1);
                self.street = Street::River;
                self.current_player = Player::BigBlind;
            }
            Street::River => self.showdown(),
            Street::BbDiscard | Street::SbDiscard => {
                unreachable!("discard streets settle through apply_discard")
            }
        }
    }

    fn deal_to_board(&mut self, count: usize) {
        for _ in 0..count {
            self.board.push(self.deck[self.deck_idx]);
            self.deck_idx += 1;
        }
    }

    // -----------------------------------------------------------------------
    // Discards
    // -----------------------------------------------------------------------

    /// Expose hole card `slot` on the board. The BB discard hands the turn
    /// to the SB discard; the SB discard immediately deals the turn card and
    /// opens turn betting with the big blind first.
    fn apply_discard(&mut self, slot: u8) {
        let idx = self.current_player.index();
        let slot = slot as usize;
        debug_assert_eq!(self.hand_sizes[idx], 3, "discard from a 2-card hand");
        debug_assert!(slot < 3, "discard slot out of range");

        let card = self.hands[idx][slot];
        let last = self.hand_sizes[idx] as usize - 1;
        self.hands[idx][slot] = self.hands[idx][last];
        self.hand_sizes[idx] = 2;
        self.board.push(card);

        match self.street {
            Street::BbDiscard => {
                self.bb_discarded = true;
                self.street = Street::SbDiscard;
                self.current_player = Player::SmallBlind;
            }
            Street::SbDiscard => {
                self.sb_discarded = true;
                self.deal_to_board(1);
                self.street = Street::Turn;
                self.current_player = Player::BigBlind;
                self.pips = [0, 0];
                self.street_history.clear();
            }
            _ => unreachable!("apply_discard outside discard phase"),
        }
    }

    // -----------------------------------------------------------------------
    // Showdown
    // -----------------------------------------------------------------------

    fn showdown(&mut self) {
        self.is_terminal = true;
        debug_assert_eq!(self.board.len(), 6, "showdown before the river");
        debug_assert_eq!(self.hand_sizes, [2, 2], "showdown with undischarged hand");

        let values = [
            evaluate_best(&self.showdown_pool(Player::SmallBlind)),
            evaluate_best(&self.showdown_pool(Player::BigBlind)),
        ];
        let half_pot = f64::from(self.pot()) / 2.0;
        self.payoffs = match values[0].cmp(&values[1]) {
            std::cmp::Ordering::Greater => [half_pot, -half_pot],
            std::cmp::Ordering::Less => [-half_pot, half_pot],
            std::cmp::Ordering::Equal => [0.0, 0.0],
        };
    }

    fn showdown_pool(&self, player: Player) -> ArrayVec<Card, 8> {
        let mut pool = ArrayVec::new();
        pool.extend(self.hand(player).iter().copied());
        pool.extend(self.board.iter().copied());
        pool
    }

    // -----------------------------------------------------------------------
    // Information sets
    // -----------------------------------------------------------------------

    /// The information-set key for `player` at this decision point.
    #[must_use]
    pub fn info_key(&self, player: Player, legal: &[Action]) -> InfoKey {
        let mut mask = 0u8;
        for action in legal {
            mask |= 1u8 << action.index();
        }
        abstraction::info_key(
            player,
            self.street,
            self.hand(player),
            &self.board,
            self.pot(),
            &self.history,
            self.bb_discarded,
            self.sb_discarded,
            mask,
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
