//! Grid-world environment: cells, actions, the validated grid and its transition rule

pub mod cell;
pub mod grid;
pub mod presets;
pub mod transition;

pub use cell::{Action, Cell};
pub use grid::{Arrival, GOAL_REWARD, Grid, GridBuilder, GridSpec, PIT_REWARD, STEP_REWARD};
pub use presets::{GridPreset, small_grid, standard_grid};
pub use transition::{Move, transition};
