//! Learning hyperparameters

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Planning steps used by [`LearningMode::ModelBased`]
pub const MODEL_BASED_PLANNING_STEPS: usize = 20;

/// Hyperparameters of the Q-learning / Dyna-Q agent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentParams {
    /// Learning rate α in (0, 1]
    pub alpha: f64,
    /// Discount factor γ in (0, 1]
    pub gamma: f64,
    /// Exploration probability ε in [0, 1]
    pub epsilon: f64,
    /// Simulated backups per real step; 0 is plain Q-learning
    pub planning_steps: usize,
}

impl Default for AgentParams {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            gamma: 0.9,
            epsilon: 0.1,
            planning_steps: 0,
        }
    }
}

impl AgentParams {
    /// Create validated parameters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if any value is out of range.
    pub fn new(alpha: f64, gamma: f64, epsilon: f64, planning_steps: usize) -> Result<Self> {
        let params = Self {
            alpha,
            gamma,
            epsilon,
            planning_steps,
        };
        params.validate()?;
        Ok(params)
    }

    /// Check every value against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] naming the first offending value.
    pub fn validate(&self) -> Result<()> {
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(Error::invalid_parameter("alpha", self.alpha, "(0, 1]"));
        }
        if !(self.gamma > 0.0 && self.gamma <= 1.0) {
            return Err(Error::invalid_parameter("gamma", self.gamma, "(0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.epsilon) {
            return Err(Error::invalid_parameter("epsilon", self.epsilon, "[0, 1]"));
        }
        Ok(())
    }

    /// Set planning steps to match a learning mode
    pub fn with_mode(mut self, mode: LearningMode) -> Self {
        self.planning_steps = mode.planning_steps();
        self
    }

    pub fn mode(&self) -> LearningMode {
        if self.planning_steps == 0 {
            LearningMode::ModelFree
        } else {
            LearningMode::ModelBased
        }
    }
}

/// Plain Q-learning or Dyna-Q
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LearningMode {
    #[default]
    ModelFree,
    ModelBased,
}

impl LearningMode {
    pub fn planning_steps(self) -> usize {
        match self {
            LearningMode::ModelFree => 0,
            LearningMode::ModelBased => MODEL_BASED_PLANNING_STEPS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LearningMode::ModelFree => "model-free",
            LearningMode::ModelBased => "model-based",
        }
    }
}

impl fmt::Display for LearningMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LearningMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "model-free" | "q-learning" | "free" => Ok(LearningMode::ModelFree),
            "model-based" | "dyna-q" | "dyna" => Ok(LearningMode::ModelBased),
            other => Err(format!(
                "invalid learning mode '{other}'. Expected one of: model-free, model-based"
            )),
        }
    }
}
