//! Shared session arguments for CLI commands

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::{
    app::SessionConfig, gridworld::GridPreset, q_learning::LearningMode, session::Session,
};

/// Options that describe the session every command runs on.
///
/// Values are resolved in order: defaults, then `--config` file, then the
/// individual flags.
#[derive(Args, Debug, Clone, Default)]
pub struct SessionArgs {
    /// JSON session configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Built-in grid (small or standard)
    #[arg(long, short = 'p')]
    pub preset: Option<GridPreset>,

    /// Learning rate α (0.0-1.0)
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Discount factor γ (0.0-1.0)
    #[arg(long)]
    pub gamma: Option<f64>,

    /// Exploration rate ε (0.0-1.0)
    #[arg(long)]
    pub epsilon: Option<f64>,

    /// Simulated backups per real step (0 = plain Q-learning)
    #[arg(long, conflicts_with = "mode")]
    pub planning_steps: Option<usize>,

    /// Learning mode (model-free or model-based)
    #[arg(long)]
    pub mode: Option<LearningMode>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of completed episodes kept in the history
    #[arg(long)]
    pub history: Option<usize>,
}

impl SessionArgs {
    /// Resolve the effective configuration
    pub fn to_config(&self) -> Result<SessionConfig> {
        let mut config = match &self.config {
            Some(path) => SessionConfig::from_json_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => SessionConfig::default(),
        };

        if let Some(preset) = self.preset {
            config.preset = preset;
            config.grid = None;
        }
        if let Some(mode) = self.mode {
            config = config.with_mode(mode);
        }
        if let Some(alpha) = self.alpha {
            config.params.alpha = alpha;
        }
        if let Some(gamma) = self.gamma {
            config.params.gamma = gamma;
        }
        if let Some(epsilon) = self.epsilon {
            config.params.epsilon = epsilon;
        }
        if let Some(steps) = self.planning_steps {
            config.params.planning_steps = steps;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(history) = self.history {
            config.history_capacity = history;
        }

        config.validate().context("invalid session configuration")?;
        Ok(config)
    }

    /// Build a fresh session from the resolved configuration
    pub fn build_session(&self) -> Result<Session> {
        let config = self.to_config()?;
        Session::new(config).context("failed to create session")
    }
}
