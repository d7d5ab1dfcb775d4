//! Observer adapters for session telemetry
//!
//! Observers allow composable data collection while a session runs without
//! coupling the engine to specific output formats.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::{
    Error, Result,
    engine::StepRecord,
    gridworld::GOAL_REWARD,
    history::{EpisodeHistory, EpisodeStat, RECENT_WINDOW},
    ports::Observer,
    q_learning::SelectionMethod,
};

/// Metrics observer - counts what the agent did
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsObserver {
    pub steps: usize,
    pub explorations: usize,
    pub wall_hits: usize,
    pub planning_updates: usize,
    pub episodes: usize,
    pub goals: usize,
    pub pits: usize,
    pub restarts: usize,
}

impl MetricsObserver {
    /// Create a new metrics observer
    pub fn new() -> Self {
        Self::default()
    }

    /// Share of steps chosen by exploration
    pub fn exploration_rate(&self) -> f64 {
        if self.steps == 0 {
            0.0
        } else {
            self.explorations as f64 / self.steps as f64
        }
    }

    /// Share of finished episodes that ended at the goal
    pub fn goal_rate(&self) -> f64 {
        if self.episodes == 0 {
            0.0
        } else {
            self.goals as f64 / self.episodes as f64
        }
    }
}

impl Observer for MetricsObserver {
    fn on_step(&mut self, record: &StepRecord) -> Result<()> {
        self.steps += 1;
        if record.method == SelectionMethod::Exploration {
            self.explorations += 1;
        }
        if record.hit_wall {
            self.wall_hits += 1;
        }
        self.planning_updates += record.planning_updates;
        if record.terminal {
            if record.reward == GOAL_REWARD {
                self.goals += 1;
            } else {
                self.pits += 1;
            }
        }
        Ok(())
    }

    fn on_episode_end(&mut self, _stat: &EpisodeStat) -> Result<()> {
        self.episodes += 1;
        Ok(())
    }

    fn on_episode_restart(&mut self) -> Result<()> {
        self.restarts += 1;
        Ok(())
    }

    fn on_reset(&mut self) -> Result<()> {
        *self = Self::default();
        Ok(())
    }
}

/// JSONL observer - writes one JSON object per step
pub struct JsonlObserver<W: Write + Send> {
    writer: W,
    lines: usize,
}

impl JsonlObserver<BufWriter<File>> {
    /// Create an observer writing to a new file at `path`
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create observation file {}", path.display()),
            source,
        })?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write + Send> JsonlObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, lines: 0 }
    }

    /// Number of records written so far
    pub fn lines(&self) -> usize {
        self.lines
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> Observer for JsonlObserver<W> {
    fn on_step(&mut self, record: &StepRecord) -> Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.lines += 1;
        Ok(())
    }

    fn on_episode_end(&mut self, _stat: &EpisodeStat) -> Result<()> {
        self.flush()
    }
}

/// Progress bar observer - shows episodes completed out of a known total
pub struct ProgressObserver {
    progress_bar: ProgressBar,
    recent: EpisodeHistory,
}

impl ProgressObserver {
    /// Create a progress bar for `total_episodes`
    ///
    /// # Errors
    ///
    /// Returns an error if the bar template is rejected.
    pub fn new(total_episodes: usize) -> Result<Self> {
        let progress_bar = ProgressBar::new(total_episodes as u64);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes ({msg})")
                .map_err(|e| Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        Ok(Self {
            progress_bar,
            recent: EpisodeHistory::with_capacity(RECENT_WINDOW),
        })
    }

    /// A bar that draws nothing, for quiet runs
    pub fn hidden() -> Self {
        Self {
            progress_bar: ProgressBar::hidden(),
            recent: EpisodeHistory::with_capacity(RECENT_WINDOW),
        }
    }

    pub fn finish(&self) {
        self.progress_bar.finish_with_message(self.message());
    }

    fn message(&self) -> String {
        format!("avg reward {:.1}", self.recent.recent_average(RECENT_WINDOW))
    }
}

impl Observer for ProgressObserver {
    fn on_episode_end(&mut self, stat: &EpisodeStat) -> Result<()> {
        self.recent.push(*stat);
        self.progress_bar.inc(1);
        self.progress_bar.set_message(self.message());
        Ok(())
    }
}
