//! Episode state machine around the step engine
//!
//! A [`Session`] owns the grid, the learned stores, the agent position and
//! the episode bookkeeping. Episodes move between two states:
//!
//! ```text
//!            step (non-terminal)
//!              ┌─────┐
//!              ▼     │
//!          ┌─────────┴┐  step reaches goal/pit  ┌──────────┐
//!  start ─▶│ Running  │────────────────────────▶│ Finished │
//!          └──────────┘◀────────────────────────┴──────────┘
//!                        step: back to start,
//!                        no interaction consumed
//! ```
//!
//! After a terminal step the agent stays on the terminal cell so it can be
//! shown; only the next step command moves it back to the start.

use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    Result,
    app::SessionConfig,
    engine::{self, StepRecord},
    gridworld::{Cell, Grid},
    history::{EpisodeHistory, EpisodeStat, RECENT_WINDOW},
    ports::Observer,
    q_learning::{AgentParams, ForwardModel, LearningMode, QTable},
};

/// Upper bound on steps taken by one [`Session::finish_episode`] call
pub const FINISH_SAFETY_BOUND: usize = 1000;

/// Whether the current episode can still take steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpisodeStatus {
    Running,
    Finished,
}

/// What a single step command did
#[derive(Debug, Clone, PartialEq)]
pub enum StepEvent {
    /// A real interaction happened; `completed` is set if it ended the episode
    Stepped {
        record: Box<StepRecord>,
        completed: Option<EpisodeStat>,
    },
    /// The episode was finished, so the agent went back to the start instead
    EpisodeRestarted,
}

/// Result of [`Session::finish_episode`]
#[derive(Debug, Clone, PartialEq)]
pub struct FinishOutcome {
    /// False when the safety bound ran out before a terminal cell
    pub terminated: bool,
    /// Steps taken by this call
    pub steps_taken: usize,
    /// Episode totals including steps taken before this call
    pub episode_reward: f64,
    pub episode_steps: usize,
    /// Recorded statistics, present only when `terminated`
    pub stat: Option<EpisodeStat>,
    pub last_record: Option<StepRecord>,
}

/// Owned view of a session, safe to hand to a display layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub grid: Grid,
    pub params: AgentParams,
    pub position: Cell,
    pub status: EpisodeStatus,
    pub episodes_completed: usize,
    pub episode_reward: f64,
    pub episode_steps: usize,
    pub recent_average_reward: f64,
    pub q_table: QTable,
    pub model_size: usize,
    pub last_record: Option<StepRecord>,
}

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Interactive learning session on one grid
#[derive(Debug, Clone)]
pub struct Session {
    grid: Grid,
    params: AgentParams,
    q_table: QTable,
    model: ForwardModel,
    position: Cell,
    status: EpisodeStatus,
    episode_reward: f64,
    episode_steps: usize,
    episodes_completed: usize,
    history: EpisodeHistory,
    last_record: Option<StepRecord>,
    rng: StdRng,
    seed: Option<u64>,
}

impl Session {
    /// Create a session at the start cell of the configured grid.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation.
    pub fn new(config: SessionConfig) -> Result<Self> {
        config.validate()?;
        let grid = config.resolve_grid();
        Ok(Self {
            q_table: QTable::for_grid(&grid),
            model: ForwardModel::new(),
            position: grid.start(),
            status: EpisodeStatus::Running,
            episode_reward: 0.0,
            episode_steps: 0,
            episodes_completed: 0,
            history: EpisodeHistory::with_capacity(config.history_capacity),
            last_record: None,
            rng: build_rng(config.seed),
            seed: config.seed,
            params: config.params,
            grid,
        })
    }

    /// Execute one step command.
    ///
    /// While the episode is running this performs a real interaction. On a
    /// finished episode it only moves the agent back to the start.
    ///
    /// # Errors
    ///
    /// Propagates observer errors.
    pub fn step(&mut self, observer: &mut dyn Observer) -> Result<StepEvent> {
        if self.status == EpisodeStatus::Finished {
            self.restart_episode(observer)?;
            return Ok(StepEvent::EpisodeRestarted);
        }
        let (record, completed) = self.advance(observer)?;
        Ok(StepEvent::Stepped {
            record: Box::new(record),
            completed,
        })
    }

    /// Step until a terminal cell or [`FINISH_SAFETY_BOUND`] steps.
    ///
    /// A finished episode is restarted first. One [`EpisodeStat`] is
    /// recorded only if a terminal cell is reached during this call; running
    /// out of steps is reported through `terminated == false`.
    ///
    /// # Errors
    ///
    /// Propagates observer errors.
    pub fn finish_episode(&mut self, observer: &mut dyn Observer) -> Result<FinishOutcome> {
        if self.status == EpisodeStatus::Finished {
            self.restart_episode(observer)?;
        }

        let mut steps_taken = 0;
        let mut stat = None;
        let mut last_record = None;
        while steps_taken < FINISH_SAFETY_BOUND {
            let (record, completed) = self.advance(observer)?;
            steps_taken += 1;
            last_record = Some(record);
            if completed.is_some() {
                stat = completed;
                break;
            }
        }

        let terminated = stat.is_some();
        if !terminated {
            warn!(
                steps = steps_taken,
                position = %self.position,
                "episode did not terminate within the safety bound"
            );
        }

        Ok(FinishOutcome {
            terminated,
            steps_taken,
            episode_reward: self.episode_reward,
            episode_steps: self.episode_steps,
            stat,
            last_record,
        })
    }

    /// Discard everything learned and start over on the same grid.
    ///
    /// # Errors
    ///
    /// Propagates observer errors.
    pub fn reset(&mut self, observer: &mut dyn Observer) -> Result<()> {
        self.q_table = QTable::for_grid(&self.grid);
        self.model = ForwardModel::new();
        self.position = self.grid.start();
        self.status = EpisodeStatus::Running;
        self.episode_reward = 0.0;
        self.episode_steps = 0;
        self.episodes_completed = 0;
        self.history.clear();
        self.last_record = None;
        if let Some(seed) = self.seed {
            self.rng = StdRng::seed_from_u64(seed);
        }
        info!(grid = self.grid.name(), "session reset");
        observer.on_reset()
    }

    /// Replace the grid and reset the session.
    ///
    /// # Errors
    ///
    /// Propagates observer errors.
    pub fn switch_grid(&mut self, grid: Grid, observer: &mut dyn Observer) -> Result<()> {
        info!(from = self.grid.name(), to = grid.name(), "switching grid");
        self.grid = grid;
        self.reset(observer)
    }

    /// Change hyperparameters; learned values are kept.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidParameter`] if `params` is out of range.
    pub fn set_params(&mut self, params: AgentParams) -> Result<()> {
        params.validate()?;
        self.params = params;
        Ok(())
    }

    /// Switch between plain Q-learning and Dyna-Q.
    pub fn set_mode(&mut self, mode: LearningMode) {
        self.params = self.params.with_mode(mode);
    }

    fn restart_episode(&mut self, observer: &mut dyn Observer) -> Result<()> {
        self.position = self.grid.start();
        self.status = EpisodeStatus::Running;
        self.episode_reward = 0.0;
        self.episode_steps = 0;
        self.last_record = None;
        debug!(start = %self.position, "episode restarted");
        observer.on_episode_restart()
    }

    fn advance(
        &mut self,
        observer: &mut dyn Observer,
    ) -> Result<(StepRecord, Option<EpisodeStat>)> {
        let outcome = engine::step(
            self.position,
            &self.q_table,
            &self.model,
            &self.grid,
            &self.params,
            &mut self.rng,
        );

        self.q_table = outcome.q_table;
        self.model = outcome.model;
        self.position = outcome.next_state;
        self.episode_reward += outcome.reward;
        self.episode_steps += 1;
        self.last_record = Some(outcome.record.clone());
        let completed = outcome.terminal.then(|| self.complete_episode());

        // Observers run only once the session itself is consistent.
        observer.on_step(&outcome.record)?;
        if let Some(stat) = &completed {
            observer.on_episode_end(stat)?;
        }
        Ok((outcome.record, completed))
    }

    fn complete_episode(&mut self) -> EpisodeStat {
        self.episodes_completed += 1;
        self.status = EpisodeStatus::Finished;
        let stat = EpisodeStat {
            episode: self.episodes_completed,
            total_reward: self.episode_reward,
            steps: self.episode_steps,
        };
        self.history.push(stat);
        info!(
            episode = stat.episode,
            reward = stat.total_reward,
            steps = stat.steps,
            end = %self.position,
            "episode finished"
        );
        stat
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn params(&self) -> &AgentParams {
        &self.params
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    pub fn model(&self) -> &ForwardModel {
        &self.model
    }

    pub fn position(&self) -> Cell {
        self.position
    }

    pub fn status(&self) -> EpisodeStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status == EpisodeStatus::Finished
    }

    pub fn episode_reward(&self) -> f64 {
        self.episode_reward
    }

    pub fn episode_steps(&self) -> usize {
        self.episode_steps
    }

    pub fn episodes_completed(&self) -> usize {
        self.episodes_completed
    }

    pub fn history(&self) -> &EpisodeHistory {
        &self.history
    }

    pub fn last_record(&self) -> Option<&StepRecord> {
        self.last_record.as_ref()
    }

    /// Owned copy of the display-relevant state
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            grid: self.grid.clone(),
            params: self.params,
            position: self.position,
            status: self.status,
            episodes_completed: self.episodes_completed,
            episode_reward: self.episode_reward,
            episode_steps: self.episode_steps,
            recent_average_reward: self.history.recent_average(RECENT_WINDOW),
            q_table: self.q_table.clone(),
            model_size: self.model.len(),
            last_record: self.last_record.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;
    use crate::{Error, gridworld::GridPreset, ports::observer::NoopObserver};

    /// Fails on the step that reaches a terminal cell, like a log sink with a full disk.
    struct FailOnTerminal;

    impl Observer for FailOnTerminal {
        fn on_step(&mut self, record: &StepRecord) -> Result<()> {
            if record.terminal {
                return Err(Error::from(io::Error::other("disk full")));
            }
            Ok(())
        }
    }

    fn seeded(seed: u64) -> Session {
        Session::new(SessionConfig::new(GridPreset::Small).with_seed(seed)).unwrap()
    }

    /// A 1x2 corridor whose only non-terminal cell is next to the goal.
    fn corridor() -> Session {
        let grid = Grid::builder(1, 2).build().unwrap();
        let params = AgentParams::new(0.5, 0.9, 0.0, 0).unwrap();
        Session::new(
            SessionConfig::default()
                .with_grid(grid)
                .with_params(params)
                .with_seed(1),
        )
        .unwrap()
    }

    #[test]
    fn test_new_session_starts_running_at_start() {
        let session = seeded(1);
        assert_eq!(session.status(), EpisodeStatus::Running);
        assert_eq!(session.position(), session.grid().start());
        assert_eq!(session.q_table().len(), 16);
        assert!(session.model().is_empty());
    }

    #[test]
    fn test_terminal_step_keeps_agent_on_terminal_cell() {
        let mut session = corridor();
        let mut observer = NoopObserver;

        // Step until the goal; bumps into the edges just keep the agent in place.
        let stat = loop {
            match session.step(&mut observer).unwrap() {
                StepEvent::Stepped {
                    completed: Some(stat),
                    ..
                } => break stat,
                StepEvent::Stepped { .. } => continue,
                StepEvent::EpisodeRestarted => panic!("episode was not finished"),
            }
        };

        assert!(session.is_finished());
        assert_eq!(session.position(), session.grid().goal());
        assert_eq!(stat.episode, 1);
        assert_eq!(stat.steps, session.episode_steps());
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_observer_error_on_terminal_step_still_finishes_episode() {
        let mut session = corridor();
        let mut observer = FailOnTerminal;

        let error = loop {
            match session.step(&mut observer) {
                Ok(StepEvent::Stepped { .. }) => continue,
                Ok(StepEvent::EpisodeRestarted) => panic!("episode was not finished"),
                Err(error) => break error,
            }
        };

        assert!(matches!(error, Error::Io { .. }));
        assert_eq!(session.status(), EpisodeStatus::Finished);
        assert_eq!(session.position(), session.grid().goal());
        assert_eq!(session.episodes_completed(), 1);
        assert_eq!(session.history().len(), 1);
        let steps = session.episode_steps();

        // The next command restarts instead of moving off the goal.
        let event = session.step(&mut observer).unwrap();
        assert_eq!(event, StepEvent::EpisodeRestarted);
        assert_eq!(session.position(), session.grid().start());
        assert_eq!(session.history().last().unwrap().steps, steps);
    }

    #[test]
    fn test_step_on_finished_episode_restarts_without_interaction() {
        let mut session = corridor();
        let mut observer = NoopObserver;
        let outcome = session.finish_episode(&mut observer).unwrap();
        assert!(outcome.terminated);

        let table = session.q_table().clone();
        let model_len = session.model().len();
        let event = session.step(&mut observer).unwrap();

        assert_eq!(event, StepEvent::EpisodeRestarted);
        assert_eq!(session.status(), EpisodeStatus::Running);
        assert_eq!(session.position(), session.grid().start());
        assert_eq!(session.episode_reward(), 0.0);
        assert_eq!(session.episode_steps(), 0);
        assert!(session.last_record().is_none());
        assert_eq!(session.q_table(), &table);
        assert_eq!(session.model().len(), model_len);
        assert_eq!(session.episodes_completed(), 1);
    }

    #[test]
    fn test_finish_episode_records_one_stat() {
        let mut session = seeded(17);
        let mut observer = NoopObserver;

        let outcome = session.finish_episode(&mut observer).unwrap();

        assert!(outcome.terminated);
        assert_eq!(session.history().len(), 1);
        let stat = outcome.stat.unwrap();
        assert_eq!(stat.steps, outcome.steps_taken);
        assert_eq!(stat.total_reward, outcome.episode_reward);
        assert!(session.grid().is_terminal(session.position()));

        // A second call restarts first and records the next episode.
        let second = session.finish_episode(&mut observer).unwrap();
        assert!(second.terminated);
        assert_eq!(second.stat.unwrap().episode, 2);
        assert_eq!(session.history().len(), 2);
    }

    #[test]
    fn test_finish_episode_includes_prior_steps() {
        let mut session = seeded(23);
        let mut observer = NoopObserver;
        let mut taken = 0;
        // Take a few manual steps that do not end the episode.
        while taken < 3 {
            match session.step(&mut observer).unwrap() {
                StepEvent::Stepped {
                    completed: None, ..
                } => taken += 1,
                _ => break,
            }
        }
        assert!(!session.is_finished());

        let outcome = session.finish_episode(&mut observer).unwrap();
        assert!(outcome.terminated);
        assert_eq!(outcome.episode_steps, taken + outcome.steps_taken);
        assert_eq!(outcome.stat.unwrap().steps, outcome.episode_steps);
    }

    #[test]
    fn test_finish_episode_hits_safety_bound() {
        // The start cell is boxed in by walls, so no terminal is reachable.
        let grid = Grid::builder(3, 3)
            .start(0, 0)
            .goal(2, 2)
            .wall(1, 0)
            .wall(0, 1)
            .build()
            .unwrap();
        let mut session =
            Session::new(SessionConfig::default().with_grid(grid).with_seed(3)).unwrap();
        let mut observer = NoopObserver;

        let outcome = session.finish_episode(&mut observer).unwrap();

        assert!(!outcome.terminated);
        assert_eq!(outcome.steps_taken, FINISH_SAFETY_BOUND);
        assert!(outcome.stat.is_none());
        assert!(session.history().is_empty());
        assert_eq!(session.status(), EpisodeStatus::Running);
        assert_eq!(session.episode_steps(), FINISH_SAFETY_BOUND);
    }

    #[test]
    fn test_reset_clears_learning() {
        let mut session = seeded(5);
        let mut observer = NoopObserver;
        session.finish_episode(&mut observer).unwrap();

        session.reset(&mut observer).unwrap();

        assert_eq!(session.q_table(), &QTable::for_grid(session.grid()));
        assert!(session.model().is_empty());
        assert!(session.history().is_empty());
        assert_eq!(session.episodes_completed(), 0);
        assert_eq!(session.position(), session.grid().start());
    }

    #[test]
    fn test_switch_grid_resizes_table() {
        let mut session = seeded(5);
        let mut observer = NoopObserver;
        session.finish_episode(&mut observer).unwrap();

        session
            .switch_grid(GridPreset::Standard.grid(), &mut observer)
            .unwrap();

        assert_eq!(session.q_table().len(), 36);
        assert_eq!(session.grid().rows(), 6);
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_set_params_validates() {
        let mut session = seeded(1);
        let bad = AgentParams {
            epsilon: 1.5,
            ..AgentParams::default()
        };
        assert!(session.set_params(bad).is_err());
        session.set_mode(LearningMode::ModelBased);
        assert_eq!(session.params().planning_steps, 20);
    }

    #[test]
    fn test_snapshot_is_independent() {
        let mut session = seeded(9);
        let mut observer = NoopObserver;
        let snapshot = session.snapshot();
        session.step(&mut observer).unwrap();
        assert_eq!(snapshot.q_table, QTable::for_grid(session.grid()));
        assert_eq!(snapshot.model_size, 0);
        assert_ne!(session.q_table(), &snapshot.q_table);
    }

    #[test]
    fn test_seeded_sessions_are_reproducible() {
        let mut a = seeded(99);
        let mut b = seeded(99);
        let mut observer = NoopObserver;
        for _ in 0..5 {
            a.finish_episode(&mut observer).unwrap();
            b.finish_episode(&mut observer).unwrap();
        }
        assert_eq!(a.q_table(), b.q_table());
        assert_eq!(a.history(), b.history());
    }
}
