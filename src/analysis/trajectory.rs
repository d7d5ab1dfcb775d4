//! Deterministic rollout of the greedy policy

use serde::{Deserialize, Serialize};

use crate::{
    gridworld::{Action, Cell, Grid, transition},
    q_learning::{QTable, max_of},
};

/// How a greedy rollout ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RolloutEnd {
    ReachedGoal,
    FellInPit,
    /// Revisited a cell or ran out of steps without reaching a terminal
    Stalled,
}

/// Path taken by the greedy policy from the start cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rollout {
    /// Visited cells, starting with the start cell
    pub path: Vec<Cell>,
    pub actions: Vec<Action>,
    pub total_reward: f64,
    pub end: RolloutEnd,
}

/// Follow the greedy policy (first maximal action) from the start cell.
///
/// No learning happens. The rollout stops at a terminal cell, on the first
/// revisit of a cell (a deterministic policy would loop forever) or after
/// `max_steps` moves.
pub fn greedy_rollout(grid: &Grid, q_table: &QTable, max_steps: usize) -> Rollout {
    let mut position = grid.start();
    let mut path = vec![position];
    let mut actions = Vec::new();
    let mut total_reward = 0.0;

    for _ in 0..max_steps {
        let values = q_table.values(position);
        let best = max_of(&values);
        let action = Action::ALL
            .into_iter()
            .find(|action| values[action.index()] == best)
            .unwrap_or(Action::Up);

        let next = transition(grid, position, action).next;
        let arrival = grid.evaluate(next);
        total_reward += arrival.reward;
        actions.push(action);

        if arrival.terminal {
            path.push(next);
            let end = if grid.is_goal(next) {
                RolloutEnd::ReachedGoal
            } else {
                RolloutEnd::FellInPit
            };
            return Rollout {
                path,
                actions,
                total_reward,
                end,
            };
        }
        if path.contains(&next) {
            path.push(next);
            break;
        }
        path.push(next);
        position = next;
    }

    Rollout {
        path,
        actions,
        total_reward,
        end: RolloutEnd::Stalled,
    }
}
