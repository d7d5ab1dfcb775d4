//! Observer port - abstraction for step and episode telemetry
//!
//! This port defines the interface for consuming what the simulation
//! does, so that explanation panels, charts, tutors and exporters stay
//! decoupled from the engine.

use crate::{Result, engine::StepRecord, history::EpisodeStat};

/// Observer trait for monitoring a session
///
/// # Design Philosophy
///
/// This trait represents a **port** in hexagonal architecture - a boundary
/// between the simulation and external consumers of its telemetry.
/// Metrics, progress bars and JSONL logs are **adapters** that implement it.
///
/// # Event Sequence
///
/// For each real interaction `on_step` is called once. When that step
/// reaches a terminal cell, `on_episode_end` follows it. A step command
/// issued on a finished episode calls `on_episode_restart` instead of
/// `on_step`. `on_reset` is called when the learned state is discarded.
///
/// # Examples
///
/// ```
/// use qgrid::{engine::StepRecord, ports::Observer};
///
/// struct Counter {
///     steps: usize,
/// }
///
/// impl Observer for Counter {
///     fn on_step(&mut self, _record: &StepRecord) -> qgrid::Result<()> {
///         self.steps += 1;
///         Ok(())
///     }
/// }
/// ```
pub trait Observer: Send {
    /// Called after every real step with its full record.
    ///
    /// # Default Implementation
    ///
    /// Does nothing.
    fn on_step(&mut self, _record: &StepRecord) -> Result<()> {
        Ok(())
    }

    /// Called once when an episode reaches a terminal cell.
    ///
    /// # Default Implementation
    ///
    /// Does nothing.
    fn on_episode_end(&mut self, _stat: &EpisodeStat) -> Result<()> {
        Ok(())
    }

    /// Called when a finished episode is restarted at the start cell.
    fn on_episode_restart(&mut self) -> Result<()> {
        Ok(())
    }

    /// Called when the session discards its learned state.
    fn on_reset(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Observer that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl Observer for NoopObserver {}

/// Fan-out to several borrowed observers in order
///
/// The observers stay owned by the caller, so collected state can be read
/// back once the set is dropped.
#[derive(Default)]
pub struct ObserverSet<'a> {
    observers: Vec<&'a mut dyn Observer>,
}

impl<'a> ObserverSet<'a> {
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    /// Add an observer to the set
    pub fn with(mut self, observer: &'a mut dyn Observer) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn push(&mut self, observer: &'a mut dyn Observer) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl Observer for ObserverSet<'_> {
    fn on_step(&mut self, record: &StepRecord) -> Result<()> {
        for observer in &mut self.observers {
            observer.on_step(record)?;
        }
        Ok(())
    }

    fn on_episode_end(&mut self, stat: &EpisodeStat) -> Result<()> {
        for observer in &mut self.observers {
            observer.on_episode_end(stat)?;
        }
        Ok(())
    }

    fn on_episode_restart(&mut self) -> Result<()> {
        for observer in &mut self.observers {
            observer.on_episode_restart()?;
        }
        Ok(())
    }

    fn on_reset(&mut self) -> Result<()> {
        for observer in &mut self.observers {
            observer.on_reset()?;
        }
        Ok(())
    }
}
