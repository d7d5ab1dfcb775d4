//! Q-table implementation for temporal difference learning

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::gridworld::{Action, Cell, Grid};

/// Action-value vector of a single cell, indexed by [`Action::index`]
pub type ActionValues = [f64; Action::COUNT];

/// Numbers produced by one Q-learning backup
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TdUpdate {
    /// Q(s,a) before the write
    pub old_q: f64,
    /// max_a' Q(s',a') read before the write
    pub max_next_q: f64,
    /// r + γ max_a' Q(s',a')
    pub target: f64,
    /// target - Q(s,a)
    pub error: f64,
    /// Q(s,a) after the write
    pub new_q: f64,
}

/// Q-table mapping cells to their four action-values
///
/// Cells without an entry read as the zero vector, so a partially
/// initialized table behaves exactly like a zero-filled one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<QEntry>", into = "Vec<QEntry>")]
pub struct QTable {
    values: BTreeMap<Cell, ActionValues>,
}

/// Serialized form of one Q-table row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QEntry {
    pub cell: Cell,
    pub values: ActionValues,
}

impl QTable {
    /// Zero-fill every cell of a `cols x rows` grid
    pub fn initialize(rows: usize, cols: usize) -> Self {
        let values = (0..rows)
            .flat_map(|y| (0..cols).map(move |x| (Cell::new(x, y), [0.0; Action::COUNT])))
            .collect();
        Self { values }
    }

    /// Zero-fill every cell of `grid`
    pub fn for_grid(grid: &Grid) -> Self {
        Self::initialize(grid.rows(), grid.cols())
    }

    /// Action-values of `cell`, or zeros if the cell has no entry
    pub fn values(&self, cell: Cell) -> ActionValues {
        self.values
            .get(&cell)
            .copied()
            .unwrap_or([0.0; Action::COUNT])
    }

    /// Q-value for a state-action pair
    pub fn get(&self, cell: Cell, action: Action) -> f64 {
        self.values(cell)[action.index()]
    }

    /// Set Q-value for a state-action pair
    pub fn set(&mut self, cell: Cell, action: Action, value: f64) {
        self.values.entry(cell).or_insert([0.0; Action::COUNT])[action.index()] = value;
    }

    /// Maximum action-value of `cell`
    pub fn max_value(&self, cell: Cell) -> f64 {
        max_of(&self.values(cell))
    }

    /// Q-learning update: off-policy TD control
    ///
    /// Q(s,a) ← Q(s,a) + α[r + γ max_a' Q(s',a') - Q(s,a)]
    ///
    /// `max_a' Q(s',a')` is read before the write, so a self-loop
    /// (`next == cell`) bootstraps from the pre-update vector. Only the
    /// single entry `(cell, action)` changes.
    pub fn td_update(
        &mut self,
        cell: Cell,
        action: Action,
        reward: f64,
        next: Cell,
        alpha: f64,
        gamma: f64,
    ) -> TdUpdate {
        let old_q = self.get(cell, action);
        let max_next_q = self.max_value(next);
        let target = reward + gamma * max_next_q;
        let error = target - old_q;
        let new_q = old_q + alpha * error;
        self.set(cell, action, new_q);
        TdUpdate {
            old_q,
            max_next_q,
            target,
            error,
            new_q,
        }
    }

    /// Number of cells with an entry
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Entries in cell order
    pub fn iter(&self) -> impl Iterator<Item = (Cell, &ActionValues)> {
        self.values.iter().map(|(cell, values)| (*cell, values))
    }
}

/// Maximum of an action-value vector
pub fn max_of(values: &ActionValues) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

impl From<Vec<QEntry>> for QTable {
    fn from(entries: Vec<QEntry>) -> Self {
        Self {
            values: entries
                .into_iter()
                .map(|entry| (entry.cell, entry.values))
                .collect(),
        }
    }
}

impl From<QTable> for Vec<QEntry> {
    fn from(table: QTable) -> Self {
        table
            .values
            .into_iter()
            .map(|(cell, values)| QEntry { cell, values })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_covers_every_cell() {
        let table = QTable::initialize(3, 5);
        assert_eq!(table.len(), 15);
        assert!(table.iter().all(|(_, values)| *values == [0.0; 4]));
    }

    #[test]
    fn test_missing_cell_reads_as_zero() {
        let table = QTable::default();
        assert_eq!(table.values(Cell::new(7, 7)), [0.0; 4]);
        assert_eq!(table.max_value(Cell::new(7, 7)), 0.0);
    }

    #[test]
    fn test_set_get() {
        let mut table = QTable::initialize(2, 2);
        table.set(Cell::new(1, 0), Action::Left, 1.5);
        assert_eq!(table.get(Cell::new(1, 0), Action::Left), 1.5);
        assert_eq!(table.get(Cell::new(1, 0), Action::Up), 0.0);
    }

    #[test]
    fn test_td_update_arithmetic() {
        let mut table = QTable::initialize(2, 2);
        let state = Cell::new(0, 0);
        let next = Cell::new(1, 0);
        table.set(state, Action::Right, 2.0);
        table.set(next, Action::Down, 5.0);
        table.set(next, Action::Up, 3.0);

        let update = table.td_update(state, Action::Right, -1.0, next, 0.1, 0.9);

        // 2.0 + 0.1 * (-1 + 0.9 * 5.0 - 2.0) = 2.15
        assert!((update.new_q - 2.15).abs() < 1e-12);
        assert!((table.get(state, Action::Right) - 2.15).abs() < 1e-12);
        assert_eq!(update.old_q, 2.0);
        assert_eq!(update.max_next_q, 5.0);
        assert!((update.target - 3.5).abs() < 1e-12);
        assert!((update.error - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_update_touches_single_entry() {
        let mut table = QTable::initialize(3, 3);
        table.set(Cell::new(2, 2), Action::Left, 4.0);
        let before = table.clone();

        table.td_update(Cell::new(1, 1), Action::Up, -1.0, Cell::new(2, 2), 0.5, 0.9);

        for (cell, values) in before.iter() {
            for action in Action::ALL {
                if cell == Cell::new(1, 1) && action == Action::Up {
                    continue;
                }
                assert_eq!(table.get(cell, action).to_bits(), values[action.index()].to_bits());
            }
        }
    }

    #[test]
    fn test_self_loop_reads_before_write() {
        let mut table = QTable::initialize(1, 1);
        let cell = Cell::new(0, 0);
        table.set(cell, Action::Up, 10.0);

        let update = table.td_update(cell, Action::Up, -1.0, cell, 0.5, 1.0);

        // max read before the write: 10.0 + 0.5 * (-1 + 10 - 10) = 9.5
        assert_eq!(update.max_next_q, 10.0);
        assert!((update.new_q - 9.5).abs() < 1e-12);
    }

    #[test]
    fn test_update_on_absent_cell_inserts_entry() {
        let mut table = QTable::default();
        table.td_update(Cell::new(4, 4), Action::Down, -1.0, Cell::new(4, 5), 1.0, 0.9);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(Cell::new(4, 4), Action::Down), -1.0);
    }

    #[test]
    fn test_json_round_trip_keeps_entries() {
        let mut table = QTable::initialize(2, 1);
        table.set(Cell::new(0, 1), Action::Right, 0.25);
        let json = serde_json::to_string(&table).unwrap();
        let decoded: QTable = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, table);
    }
}
