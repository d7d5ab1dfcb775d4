//! Greedy policy extraction

use serde::{Deserialize, Serialize};

use crate::{
    gridworld::{Action, Cell, Grid},
    q_learning::{QTable, max_of},
};

/// Values with a magnitude below this are treated as "not learned yet"
pub const POLICY_THRESHOLD: f64 = 0.01;

/// Greedy decision of one non-wall, non-terminal cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolicyCell {
    pub cell: Cell,
    /// Best action, first in index order among ties; `None` while undecided
    pub action: Option<Action>,
    pub value: f64,
}

/// Greedy action for every cell the agent can act from.
///
/// Walls and terminal cells are skipped. A cell whose best value is
/// within [`POLICY_THRESHOLD`] of zero has no action yet.
pub fn greedy_policy(grid: &Grid, q_table: &QTable) -> Vec<PolicyCell> {
    grid.cells()
        .filter(|&cell| !grid.is_wall(cell) && !grid.is_terminal(cell))
        .map(|cell| {
            let values = q_table.values(cell);
            let value = max_of(&values);
            let action = if value.abs() < POLICY_THRESHOLD {
                None
            } else {
                Action::ALL
                    .into_iter()
                    .find(|action| values[action.index()] == value)
            };
            PolicyCell {
                cell,
                action,
                value,
            }
        })
        .collect()
}

/// `max_a Q(cell, a)` for every non-wall cell in row-major order
pub fn state_values(grid: &Grid, q_table: &QTable) -> Vec<(Cell, f64)> {
    grid.cells()
        .filter(|&cell| !grid.is_wall(cell))
        .map(|cell| (cell, q_table.max_value(cell)))
        .collect()
}
