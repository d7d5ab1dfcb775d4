//! Immutable grid description and the reward/termination contract

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use super::cell::Cell;
use crate::{Error, Result};

/// Reward for arriving at the goal cell
pub const GOAL_REWARD: f64 = 100.0;
/// Reward for falling into a pit
pub const PIT_REWARD: f64 = -50.0;
/// Living cost paid on every other arrival
pub const STEP_REWARD: f64 = -1.0;

/// Outcome of arriving at a cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arrival {
    pub reward: f64,
    pub terminal: bool,
}

/// Validated, immutable grid world
///
/// Start, goal, walls and pits are pairwise distinct and all inside the
/// `cols x rows` bounds. The only way to obtain a `Grid` is through
/// [`Grid::new`], [`GridBuilder::build`] or deserialization, all of which
/// run the same validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GridSpec", into = "GridSpec")]
pub struct Grid {
    name: String,
    rows: usize,
    cols: usize,
    start: Cell,
    goal: Cell,
    walls: BTreeSet<Cell>,
    pits: BTreeSet<Cell>,
}

/// Unvalidated grid description, the serialized form of [`Grid`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    #[serde(default)]
    pub name: String,
    pub rows: usize,
    pub cols: usize,
    pub start: Cell,
    pub goal: Cell,
    #[serde(default)]
    pub walls: Vec<Cell>,
    #[serde(default)]
    pub pits: Vec<Cell>,
}

impl Grid {
    /// Create a grid, failing fast on any invalid configuration.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidDimensions`] if `rows` or `cols` is zero
    /// - [`Error::CellOutOfBounds`] if any special cell lies outside the grid
    /// - [`Error::OverlappingCells`] if one cell plays two roles
    pub fn new(
        name: impl Into<String>,
        rows: usize,
        cols: usize,
        start: Cell,
        goal: Cell,
        walls: impl IntoIterator<Item = Cell>,
        pits: impl IntoIterator<Item = Cell>,
    ) -> Result<Self> {
        let grid = Self {
            name: name.into(),
            rows,
            cols,
            start,
            goal,
            walls: walls.into_iter().collect(),
            pits: pits.into_iter().collect(),
        };
        grid.validate()?;
        Ok(grid)
    }

    /// Start building a grid with the given dimensions
    pub fn builder(rows: usize, cols: usize) -> GridBuilder {
        GridBuilder::new(rows, cols)
    }

    fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(Error::InvalidDimensions {
                rows: self.rows,
                cols: self.cols,
            });
        }

        let roles = [("start", self.start), ("goal", self.goal)]
            .into_iter()
            .chain(self.walls.iter().map(|&cell| ("wall", cell)))
            .chain(self.pits.iter().map(|&cell| ("pit", cell)));

        let mut seen: HashMap<Cell, &'static str> = HashMap::new();
        for (role, cell) in roles {
            if !self.contains(cell) {
                return Err(Error::CellOutOfBounds {
                    role: role.to_string(),
                    cell,
                    rows: self.rows,
                    cols: self.cols,
                });
            }
            if let Some(first) = seen.insert(cell, role) {
                return Err(Error::OverlappingCells {
                    cell,
                    first: first.to_string(),
                    second: role.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn start(&self) -> Cell {
        self.start
    }

    pub fn goal(&self) -> Cell {
        self.goal
    }

    pub fn walls(&self) -> &BTreeSet<Cell> {
        &self.walls
    }

    pub fn pits(&self) -> &BTreeSet<Cell> {
        &self.pits
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.x < self.cols && cell.y < self.rows
    }

    pub fn is_wall(&self, cell: Cell) -> bool {
        self.walls.contains(&cell)
    }

    pub fn is_pit(&self, cell: Cell) -> bool {
        self.pits.contains(&cell)
    }

    pub fn is_goal(&self, cell: Cell) -> bool {
        cell == self.goal
    }

    /// Goal and pits end the episode
    pub fn is_terminal(&self, cell: Cell) -> bool {
        self.is_goal(cell) || self.is_pit(cell)
    }

    /// Every in-bounds cell in row-major order, walls included
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.rows).flat_map(move |y| (0..self.cols).map(move |x| Cell::new(x, y)))
    }

    /// Reward and termination for arriving at `cell`
    ///
    /// Walls are never evaluated in practice because the transition rule
    /// never places the agent on one.
    pub fn evaluate(&self, cell: Cell) -> Arrival {
        if self.is_goal(cell) {
            Arrival {
                reward: GOAL_REWARD,
                terminal: true,
            }
        } else if self.is_pit(cell) {
            Arrival {
                reward: PIT_REWARD,
                terminal: true,
            }
        } else {
            Arrival {
                reward: STEP_REWARD,
                terminal: false,
            }
        }
    }
}

impl TryFrom<GridSpec> for Grid {
    type Error = Error;

    fn try_from(spec: GridSpec) -> Result<Self> {
        Grid::new(
            spec.name, spec.rows, spec.cols, spec.start, spec.goal, spec.walls, spec.pits,
        )
    }
}

impl From<Grid> for GridSpec {
    fn from(grid: Grid) -> Self {
        GridSpec {
            name: grid.name,
            rows: grid.rows,
            cols: grid.cols,
            start: grid.start,
            goal: grid.goal,
            walls: grid.walls.into_iter().collect(),
            pits: grid.pits.into_iter().collect(),
        }
    }
}

/// Fluent construction of a [`Grid`]
///
/// Start defaults to the top-left corner and goal to the bottom-right.
#[derive(Debug, Clone)]
pub struct GridBuilder {
    name: String,
    rows: usize,
    cols: usize,
    start: Cell,
    goal: Cell,
    walls: Vec<Cell>,
    pits: Vec<Cell>,
}

impl GridBuilder {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            name: format!("Custom ({cols}x{rows})"),
            rows,
            cols,
            start: Cell::new(0, 0),
            goal: Cell::new(cols.saturating_sub(1), rows.saturating_sub(1)),
            walls: Vec::new(),
            pits: Vec::new(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn start(mut self, x: usize, y: usize) -> Self {
        self.start = Cell::new(x, y);
        self
    }

    pub fn goal(mut self, x: usize, y: usize) -> Self {
        self.goal = Cell::new(x, y);
        self
    }

    pub fn wall(mut self, x: usize, y: usize) -> Self {
        self.walls.push(Cell::new(x, y));
        self
    }

    pub fn pit(mut self, x: usize, y: usize) -> Self {
        self.pits.push(Cell::new(x, y));
        self
    }

    /// Validate and build the grid.
    ///
    /// # Errors
    ///
    /// Same as [`Grid::new`].
    pub fn build(self) -> Result<Grid> {
        Grid::new(
            self.name, self.rows, self.cols, self.start, self.goal, self.walls, self.pits,
        )
    }
}
