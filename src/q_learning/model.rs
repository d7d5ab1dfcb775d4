//! Deterministic forward model used for Dyna-Q replay

use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::gridworld::{Action, Cell};

/// Composite key of the forward model
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ModelKey {
    pub cell: Cell,
    pub action: Action,
}

impl ModelKey {
    pub fn new(cell: Cell, action: Action) -> Self {
        Self { cell, action }
    }
}

/// Last observed outcome of a state-action pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub reward: f64,
    pub next: Cell,
}

/// Last-write-wins map from `(cell, action)` to the observed transition
///
/// Keys keep their first-observation order, which makes sampling with a
/// seeded RNG reproducible. Overwriting an entry keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<(ModelKey, Transition)>", into = "Vec<(ModelKey, Transition)>")]
pub struct ForwardModel {
    entries: Vec<(ModelKey, Transition)>,
    index: HashMap<ModelKey, usize>,
}

impl ForwardModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of taking `action` in `cell`, replacing any
    /// earlier outcome for the same pair.
    pub fn record(&mut self, cell: Cell, action: Action, reward: f64, next: Cell) {
        let key = ModelKey::new(cell, action);
        let transition = Transition { reward, next };
        match self.index.get(&key) {
            Some(&slot) => self.entries[slot].1 = transition,
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push((key, transition));
            }
        }
    }

    pub fn get(&self, cell: Cell, action: Action) -> Option<&Transition> {
        self.index
            .get(&ModelKey::new(cell, action))
            .map(|&slot| &self.entries[slot].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Observed keys in first-observation order
    pub fn keys(&self) -> impl Iterator<Item = ModelKey> + '_ {
        self.entries.iter().map(|(key, _)| *key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(ModelKey, Transition)> {
        self.entries.iter()
    }

    /// Draw one observed pair uniformly over unique keys.
    ///
    /// Returns `None` when nothing has been observed yet.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<(ModelKey, Transition)> {
        if self.entries.is_empty() {
            return None;
        }
        let slot = rng.random_range(0..self.entries.len());
        Some(self.entries[slot])
    }
}

impl From<Vec<(ModelKey, Transition)>> for ForwardModel {
    fn from(entries: Vec<(ModelKey, Transition)>) -> Self {
        let mut model = ForwardModel::new();
        for (key, transition) in entries {
            model.record(key.cell, key.action, transition.reward, transition.next);
        }
        model
    }
}

impl From<ForwardModel> for Vec<(ModelKey, Transition)> {
    fn from(model: ForwardModel) -> Self {
        model.entries
    }
}
