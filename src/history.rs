//! Bounded history of completed episodes

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Number of completed episodes retained by default
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Window used for the "recent average reward" headline figure
pub const RECENT_WINDOW: usize = 10;

/// Totals of one completed episode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpisodeStat {
    /// 1-based index of the episode within the session
    pub episode: usize,
    pub total_reward: f64,
    pub steps: usize,
}

/// Aggregate figures over the retained window
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HistorySummary {
    pub episodes: usize,
    pub mean_reward: f64,
    pub reward_std_dev: f64,
    pub mean_steps: f64,
    pub best_reward: Option<f64>,
}

/// Most recent episodes, oldest evicted first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeHistory {
    capacity: usize,
    entries: VecDeque<EpisodeStat>,
}

impl Default for EpisodeHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl EpisodeHistory {
    /// Create an empty history; a zero capacity is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, stat: EpisodeStat) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(stat);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn last(&self) -> Option<&EpisodeStat> {
        self.entries.back()
    }

    /// Retained episodes, oldest first
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &EpisodeStat> {
        self.entries.iter()
    }

    /// Mean total reward of the last `min(window, len)` episodes; 0.0 when empty
    pub fn recent_average(&self, window: usize) -> f64 {
        let take = window.min(self.entries.len());
        if take == 0 {
            return 0.0;
        }
        self.entries
            .iter()
            .rev()
            .take(take)
            .map(|stat| stat.total_reward)
            .collect::<Vec<_>>()
            .mean()
    }

    pub fn summary(&self) -> HistorySummary {
        if self.entries.is_empty() {
            return HistorySummary::default();
        }
        let rewards: Vec<f64> = self.entries.iter().map(|s| s.total_reward).collect();
        let steps: Vec<f64> = self.entries.iter().map(|s| s.steps as f64).collect();
        let reward_std_dev = if rewards.len() > 1 {
            rewards.iter().std_dev()
        } else {
            0.0
        };
        HistorySummary {
            episodes: self.entries.len(),
            mean_reward: rewards.iter().mean(),
            reward_std_dev,
            mean_steps: steps.iter().mean(),
            best_reward: rewards.iter().copied().reduce(f64::max),
        }
    }
}
