//! Ports (trait boundaries) for external consumers.
//!
//! The simulation core owns these traits; display layers, loggers and
//! exporters implement them as adapters (see [`crate::observers`]).

pub mod observer;

pub use observer::{NoopObserver, Observer, ObserverSet};
