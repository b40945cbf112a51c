//! External-sampling CFR traversal.
//!
//! Preflop nodes are fully expanded for both players: the preflop
//! information-set fan-in is large relative to typical iteration budgets,
//! and full expansion gives unbiased on-policy averages at the root. On
//! later streets the non-update player's action is sampled from the
//! current matched strategy, which keeps traversal cost linear in the
//! opponent's branching.
//!
//! Discard nodes are never learned: the update player averages uniformly
//! over the three discards, the opponent samples one, and no discard-street
//! key ever enters the table.

use rand::Rng;

use crate::abstraction::Street;
use crate::game::{Action, Player, TossemState, NUM_BET_ACTIONS};

use super::regret::regret_match;
use super::table::Table;

/// One outer iteration: a fresh deal traversed once per update player,
/// both from unit reach.
pub fn run_iteration<R: Rng>(state: &mut TossemState, rng: &mut R, table: &mut Table) {
    state.reset(rng);
    for player in Player::ALL {
        cfr_traverse(state, player, 1.0, 1.0, rng, table);
    }
}

/// Recursive traversal returning the counterfactual value of `state` for
/// `update_player`.
///
/// `reach_sb` / `reach_bb` are the products of each player's own action
/// probabilities along the path from the root. The state is restored before
/// returning; the net effect of a call is confined to `table` and `rng`.
pub fn cfr_traverse<R: Rng>(
    state: &mut TossemState,
    update_player: Player,
    reach_sb: f64,
    reach_bb: f64,
    rng: &mut R,
    table: &mut Table,
) -> f64 {
    if state.is_terminal() {
        return state.payoff(update_player);
    }

    let player = state.current_player();
    let legal = state.legal_actions();

    if state.is_discard_phase() {
        if player == update_player {
            // Discards are not learned: average the three branches uniformly.
            #[allow(clippy::cast_precision_loss)]
            let weight = 1.0 / legal.len() as f64;
            let mut total = 0.0;
            for &action in &legal {
                let undo = state.apply_action(action);
                total += weight * cfr_traverse(state, update_player, reach_sb, reach_bb, rng, table);
                state.undo_action(undo);
            }
            return total;
        }
        let action = legal[rng.gen_range(0..legal.len())];
        let undo = state.apply_action(action);
        let value = cfr_traverse(state, update_player, reach_sb, reach_bb, rng, table);
        state.undo_action(undo);
        return value;
    }

    let key = state.info_key(player, &legal);
    let strategy = {
        let node = table.node_mut(key);
        let strategy = regret_match(&node.regret, &legal);
        let reach = match player {
            Player::SmallBlind => reach_sb,
            Player::BigBlind => reach_bb,
        };
        for &action in &legal {
            node.strat_sum[action.index()] += reach * strategy[action.index()];
        }
        strategy
    };

    if state.street() == Street::Preflop || player == update_player {
        // Full expansion.
        let mut action_values = [0.0; NUM_BET_ACTIONS];
        for &action in &legal {
            let undo = state.apply_action(action);
            let (next_sb, next_bb) =
                scale_reach(player, reach_sb, reach_bb, strategy[action.index()]);
            action_values[action.index()] =
                cfr_traverse(state, update_player, next_sb, next_bb, rng, table);
            state.undo_action(undo);
        }

        let node_value: f64 = legal
            .iter()
            .map(|a| strategy[a.index()] * action_values[a.index()])
            .sum();

        if player == update_player {
            let node = table.node_mut(key);
            for &action in &legal {
                node.regret[action.index()] += action_values[action.index()] - node_value;
            }
        }
        node_value
    } else {
        // External sampling of the opponent.
        let action = sample_action(&strategy, &legal, rng);
        let undo = state.apply_action(action);
        let (next_sb, next_bb) = scale_reach(player, reach_sb, reach_bb, strategy[action.index()]);
        let value = cfr_traverse(state, update_player, next_sb, next_bb, rng, table);
        state.undo_action(undo);
        value
    }
}

/// Multiply the acting player's reach by its action probability.
fn scale_reach(actor: Player, reach_sb: f64, reach_bb: f64, probability: f64) -> (f64, f64) {
    match actor {
        Player::SmallBlind => (reach_sb * probability, reach_bb),
        Player::BigBlind => (reach_sb, reach_bb * probability),
    }
}

/// Draw one legal action from the matched strategy.
///
/// The strategy already sums to one over `legal`; the final clause absorbs
/// floating-point rounding.
fn sample_action<R: Rng>(
    strategy: &[f64; NUM_BET_ACTIONS],
    legal: &[Action],
    rng: &mut R,
) -> Action {
    let draw: f64 = rng.gen();
    let mut cumulative = 0.0;
    for &action in legal {
        cumulative += strategy[action.index()];
        if draw < cumulative {
            return action;
        }
    }
    legal[legal.len() - 1]
}
