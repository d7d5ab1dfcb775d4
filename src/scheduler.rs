//! Timed auto-run of step commands on a background thread
//!
//! An [`AutoRunner`] issues one [`Session::step`] per tick until it is
//! cancelled or reaches its tick limit. The session is shared behind a
//! mutex so a caller can take snapshots between ticks.

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use tracing::{debug, info};

use crate::{Error, Result, ports::Observer, session::Session};

/// Shared stop flag
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Periodic step scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoRunner {
    interval: Duration,
    max_ticks: Option<usize>,
}

impl AutoRunner {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            max_ticks: None,
        }
    }

    /// Stop on its own after `ticks` step commands
    pub fn with_max_ticks(mut self, ticks: usize) -> Self {
        self.max_ticks = Some(ticks);
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn max_ticks(&self) -> Option<usize> {
        self.max_ticks
    }

    /// Start ticking on a new thread.
    ///
    /// The first step is issued immediately; later ones follow every
    /// `interval`. The session lock is held only for the duration of a step.
    pub fn spawn(
        self,
        session: Arc<Mutex<Session>>,
        mut observer: Box<dyn Observer>,
    ) -> AutoRunHandle {
        let token = CancellationToken::new();
        let worker_token = token.clone();
        info!(
            interval_ms = self.interval.as_millis() as u64,
            max_ticks = ?self.max_ticks,
            "auto-run started"
        );

        let thread = thread::spawn(move || -> Result<usize> {
            let mut ticks = 0;
            while !worker_token.is_cancelled() && self.max_ticks.is_none_or(|max| ticks < max) {
                {
                    let mut session = session.lock().map_err(|_| Error::SchedulerPoisoned)?;
                    session.step(observer.as_mut())?;
                }
                ticks += 1;
                debug!(tick = ticks, "auto-run tick");

                let deadline = Instant::now() + self.interval;
                loop {
                    let now = Instant::now();
                    if worker_token.is_cancelled() || now >= deadline {
                        break;
                    }
                    thread::park_timeout(deadline - now);
                }
            }
            Ok(ticks)
        });

        AutoRunHandle { token, thread }
    }
}

/// Handle to a running auto-run thread
#[derive(Debug)]
pub struct AutoRunHandle {
    token: CancellationToken,
    thread: JoinHandle<Result<usize>>,
}

impl AutoRunHandle {
    /// Token that stops this run when cancelled
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Cancel the run and wait for the thread, returning the ticks issued.
    ///
    /// A step already in progress completes first.
    ///
    /// # Errors
    ///
    /// Returns the error that ended the run early, or
    /// [`Error::SchedulerPanicked`] if the thread panicked.
    pub fn stop(self) -> Result<usize> {
        self.token.cancel();
        self.thread.thread().unpark();
        self.join()
    }

    /// Wait for the run to end by itself (tick limit or external cancel).
    ///
    /// # Errors
    ///
    /// Same as [`AutoRunHandle::stop`].
    pub fn join(self) -> Result<usize> {
        let ticks = self.thread.join().map_err(|_| Error::SchedulerPanicked)??;
        info!(ticks, "auto-run stopped");
        Ok(ticks)
    }
}
