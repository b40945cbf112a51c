//! Regret matching.

use crate::game::{Action, NUM_BET_ACTIONS};

/// Convert accumulated regrets into a strategy over the legal actions.
///
/// Positive regrets are normalized to probabilities; when no legal action
/// carries positive regret the strategy is uniform over `legal`. Actions
/// outside `legal` always get probability zero.
#[must_use]
pub fn regret_match(regrets: &[f64; NUM_BET_ACTIONS], legal: &[Action]) -> [f64; NUM_BET_ACTIONS] {
    debug_assert!(!legal.is_empty(), "regret matching with no legal actions");
    debug_assert!(
        legal.iter().all(|a| !a.is_discard()),
        "regret matching over discard actions"
    );

    let mut strategy = [0.0; NUM_BET_ACTIONS];
    let mut positive_sum = 0.0;
    for &action in legal {
        let regret = regrets[action.index()];
        if regret > 0.0 {
            strategy[action.index()] = regret;
            positive_sum += regret;
        }
    }

    if positive_sum > 0.0 {
        for probability in &mut strategy {
            *probability /= positive_sum;
        }
    } else {
        #[allow(clippy::cast_precision_loss)]
        let uniform = 1.0 / legal.len() as f64;
        for &action in legal {
            strategy[action.index()] = uniform;
        }
    }
    strategy
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_BETS: [Action; 4] = [
        Action::Fold,
        Action::CheckCall,
        Action::RaiseSmall,
        Action::RaiseLarge,
    ];

    #[test]
    fn positive_regrets_normalize() {
        let strategy = regret_match(&[1.0, 2.0, 3.0, 4.0], &ALL_BETS);
        assert!((strategy[0] - 0.1).abs() < 1e-12);
        assert!((strategy[1] - 0.2).abs() < 1e-12);
        assert!((strategy[2] - 0.3).abs() < 1e-12);
        assert!((strategy[3] - 0.4).abs() < 1e-12);
        assert!((strategy.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn negative_regrets_are_ignored() {
        let strategy = regret_match(&[-5.0, 2.0, 0.0, 2.0], &ALL_BETS);
        assert_eq!(strategy[0], 0.0);
        assert!((strategy[1] - 0.5).abs() < 1e-12);
        assert_eq!(strategy[2], 0.0);
        assert!((strategy[3] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn all_nonpositive_regrets_give_uniform_over_legal() {
        let legal = [Action::Fold, Action::CheckCall];
        let strategy = regret_match(&[-1.0, -2.0, 3.0, 3.0], &legal);
        assert!((strategy[0] - 0.5).abs() < 1e-12);
        assert!((strategy[1] - 0.5).abs() < 1e-12);
        // Raises are illegal here, whatever their regret says.
        assert_eq!(strategy[2], 0.0);
        assert_eq!(strategy[3], 0.0);
    }

    #[test]
    fn illegal_actions_get_zero_probability() {
        let legal = [Action::CheckCall, Action::RaiseSmall];
        let strategy = regret_match(&[10.0, 1.0, 1.0, 10.0], &legal);
        assert_eq!(strategy[0], 0.0);
        assert_eq!(strategy[3], 0.0);
        assert!((strategy[1] - 0.5).abs() < 1e-12);
        assert!((strategy[2] - 0.5).abs() < 1e-12);
        assert!((strategy.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn single_legal_action_is_certain() {
        let strategy = regret_match(&[0.0, -3.0, 0.0, 0.0], &[Action::CheckCall]);
        assert_eq!(strategy[1], 1.0);
    }
}
