//! Cell coordinates and the closed action set

use std::fmt;

use serde::{Deserialize, Serialize};

/// A cell on the grid, addressed by column `x` and row `y`
///
/// Row 0 is the top of the grid, so moving `Up` decreases `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
}

impl Cell {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Apply a unit displacement, returning `None` if a coordinate would go negative.
    ///
    /// The upper bound is not checked here; the transition rule owns that.
    pub fn offset(self, (dx, dy): (isize, isize)) -> Option<Cell> {
        Some(Cell {
            x: self.x.checked_add_signed(dx)?,
            y: self.y.checked_add_signed(dy)?,
        })
    }
}

impl From<(usize, usize)> for Cell {
    fn from((x, y): (usize, usize)) -> Self {
        Cell::new(x, y)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One of the four moves available in every cell
///
/// The discriminant is the index of the action inside a Q-value vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Action {
    Up = 0,
    Right = 1,
    Down = 2,
    Left = 3,
}

impl Action {
    /// Number of actions in the closed set
    pub const COUNT: usize = 4;

    /// All actions in index order
    pub const ALL: [Action; Action::COUNT] = [Action::Up, Action::Right, Action::Down, Action::Left];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Action> {
        Action::ALL.get(index).copied()
    }

    /// Unit displacement `(dx, dy)` of this action
    pub fn delta(self) -> (isize, isize) {
        match self {
            Action::Up => (0, -1),
            Action::Right => (1, 0),
            Action::Down => (0, 1),
            Action::Left => (-1, 0),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Action::Up => "UP",
            Action::Right => "RIGHT",
            Action::Down => "DOWN",
            Action::Left => "LEFT",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
