//! Deterministic transition rule

use serde::{Deserialize, Serialize};

use super::{
    cell::{Action, Cell},
    grid::Grid,
};

/// Result of applying an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub next: Cell,
    /// Set when the grid edge or a wall blocked the move
    pub hit_wall: bool,
}

/// Apply `action` at `cell`.
///
/// Leaving the grid or entering a wall keeps the agent in place with
/// `hit_wall` set; otherwise the agent moves by the action's unit
/// displacement. The bounds check runs before the wall check.
pub fn transition(grid: &Grid, cell: Cell, action: Action) -> Move {
    let blocked = Move {
        next: cell,
        hit_wall: true,
    };

    let Some(candidate) = cell.offset(action.delta()) else {
        return blocked;
    };
    if !grid.contains(candidate) || grid.is_wall(candidate) {
        return blocked;
    }

    Move {
        next: candidate,
        hit_wall: false,
    }
}
