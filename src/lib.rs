//! Tabular Q-learning and Dyna-Q on small grid worlds
//!
//! This crate provides:
//! - Validated grid worlds with walls, pits and a goal, plus two presets
//! - The Q-learning update, ε-greedy selection and Dyna-Q planning
//! - A step engine that explains every update it makes
//! - Episode sessions with bounded history and owned snapshots
//! - Observer adapters for metrics, JSONL logs and progress bars
//! - A background auto-run scheduler and a command-line front end

pub mod analysis;
pub mod app;
pub mod cli;
pub mod engine;
pub mod error;
pub mod gridworld;
pub mod history;
pub mod observers;
pub mod ports;
pub mod q_learning;
pub mod scheduler;
pub mod session;

pub use app::SessionConfig;
pub use engine::{StepOutcome, StepRecord};
pub use error::{Error, Result};
pub use gridworld::{Action, Cell, Grid, GridPreset};
pub use history::{EpisodeHistory, EpisodeStat};
pub use q_learning::{AgentParams, ForwardModel, LearningMode, QTable};
pub use session::{Session, SessionSnapshot, StepEvent};
