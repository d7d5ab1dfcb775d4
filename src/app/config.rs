//! Configuration types for session creation.

use std::{fs::File, io::BufReader, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    gridworld::{Grid, GridPreset},
    history::DEFAULT_HISTORY_CAPACITY,
    q_learning::{AgentParams, LearningMode},
};

/// Configuration for creating a [`Session`](crate::session::Session).
///
/// This type provides a builder-style API and can also be read from a
/// JSON file. Missing JSON fields take their default values.
///
/// # Examples
///
/// ```
/// use qgrid::app::SessionConfig;
/// use qgrid::gridworld::GridPreset;
/// use qgrid::q_learning::LearningMode;
///
/// let config = SessionConfig::new(GridPreset::Standard)
///     .with_seed(42)
///     .with_mode(LearningMode::ModelBased);
/// assert_eq!(config.params.planning_steps, 20);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Built-in layout used when no custom grid is given
    pub preset: GridPreset,
    /// Custom layout; takes precedence over `preset`
    pub grid: Option<Grid>,
    /// Learning hyperparameters
    pub params: AgentParams,
    /// Random seed for reproducibility (None = non-deterministic)
    pub seed: Option<u64>,
    /// Number of completed episodes kept in memory
    pub history_capacity: usize,
}

impl SessionConfig {
    /// Create a configuration for a built-in grid.
    ///
    /// Uses default values for other parameters:
    /// - Params: α = 0.1, γ = 0.9, ε = 0.1, no planning
    /// - Seed: None (non-deterministic)
    /// - History: the 100 most recent episodes
    pub fn new(preset: GridPreset) -> Self {
        Self {
            preset,
            grid: None,
            params: AgentParams::default(),
            seed: None,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }

    /// Use a custom grid instead of a preset.
    pub fn with_grid(mut self, grid: Grid) -> Self {
        self.grid = Some(grid);
        self
    }

    /// Set the learning hyperparameters.
    pub fn with_params(mut self, params: AgentParams) -> Self {
        self.params = params;
        self
    }

    /// Set planning steps from a learning mode.
    pub fn with_mode(mut self, mode: LearningMode) -> Self {
        self.params = self.params.with_mode(mode);
        self
    }

    /// Set the random seed for deterministic behavior.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// The grid this configuration describes
    pub fn resolve_grid(&self) -> Grid {
        self.grid.clone().unwrap_or_else(|| self.preset.grid())
    }

    /// Check parameter ranges and history capacity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] for out-of-range values.
    pub fn validate(&self) -> Result<()> {
        self.params.validate()?;
        if self.history_capacity == 0 {
            return Err(Error::invalid_parameter(
                "history_capacity",
                0.0,
                "at least 1",
            ));
        }
        Ok(())
    }

    /// Load and validate a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, holds
    /// an invalid grid, or has out-of-range parameters.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open config file {}", path.display()),
            source,
        })?;
        let config: SessionConfig = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(GridPreset::default())
    }
}
