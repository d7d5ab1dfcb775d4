//! Epsilon-greedy action selection with random tie-breaking

use std::fmt;

use rand::{Rng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};

use super::q_table::{ActionValues, max_of};
use crate::gridworld::Action;

/// How an action was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelectionMethod {
    /// Uniformly random action, taken with probability epsilon
    Exploration,
    /// Greedy action, ties broken uniformly at random
    Exploitation,
}

impl fmt::Display for SelectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionMethod::Exploration => f.write_str("Exploration"),
            SelectionMethod::Exploitation => f.write_str("Exploitation"),
        }
    }
}

/// Selected action together with the way it was selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub action: Action,
    pub method: SelectionMethod,
}

/// Every action whose value equals the maximum, in index order
pub fn greedy_actions(values: &ActionValues) -> Vec<Action> {
    let best = max_of(values);
    Action::ALL
        .into_iter()
        .filter(|action| values[action.index()] == best)
        .collect()
}

/// ε-greedy action selection
///
/// With probability `epsilon` a uniformly random action is returned.
/// Otherwise one action is drawn uniformly from the tie set of maximal
/// values.
pub fn choose_action<R: Rng + ?Sized>(values: &ActionValues, epsilon: f64, rng: &mut R) -> Choice {
    if rng.random::<f64>() < epsilon {
        // Explore: random action
        let action = Action::ALL[rng.random_range(0..Action::COUNT)];
        return Choice {
            action,
            method: SelectionMethod::Exploration,
        };
    }

    let ties = greedy_actions(values);
    // The tie set of a finite vector is never empty; fall back to UP otherwise.
    let action = ties.choose(rng).copied().unwrap_or(Action::Up);
    Choice {
        action,
        method: SelectionMethod::Exploitation,
    }
}
