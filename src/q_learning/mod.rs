//! Tabular Q-learning and Dyna-Q
//!
//! This module holds the learned artifacts and the rules that change them:
//!
//! - [`QTable`]: cell → four action-values, the only learned quantity
//! - [`ForwardModel`]: last observed `(reward, next)` per `(cell, action)`
//! - [`choose_action`]: ε-greedy selection with random tie-breaking
//! - [`plan`]: Dyna-Q replay of remembered transitions
//!
//! ## Update rule
//!
//! ```text
//! target   = r + γ · max_a' Q(s', a')
//! error    = target − Q(s, a)
//! Q(s, a) ← Q(s, a) + α · error
//! ```
//!
//! | Mode | Real backups per step | Simulated backups per step |
//! |------|-----------------------|----------------------------|
//! | Model-free (Q-learning) | 1 | 0 |
//! | Model-based (Dyna-Q) | 1 | `planning_steps` |
//!
//! ## Usage Example
//!
//! ```
//! use qgrid::gridworld::{Action, Cell};
//! use qgrid::q_learning::QTable;
//!
//! let mut table = QTable::initialize(4, 4);
//! table.set(Cell::new(0, 0), Action::Right, 2.0);
//! table.set(Cell::new(1, 0), Action::Down, 5.0);
//!
//! let update = table.td_update(Cell::new(0, 0), Action::Right, -1.0, Cell::new(1, 0), 0.1, 0.9);
//! assert!((update.new_q - 2.15).abs() < 1e-12);
//! ```

pub mod model;
pub mod params;
pub mod planning;
pub mod policy;
pub mod q_table;

// Public re-exports
pub use model::{ForwardModel, ModelKey, Transition};
pub use params::{AgentParams, LearningMode, MODEL_BASED_PLANNING_STEPS};
pub use planning::plan;
pub use policy::{Choice, SelectionMethod, choose_action, greedy_actions};
pub use q_table::{ActionValues, QEntry, QTable, TdUpdate, max_of};
