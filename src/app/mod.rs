//! Application layer: session configuration.
//!
//! ```
//! use qgrid::app::SessionConfig;
//! use qgrid::session::Session;
//!
//! let session = Session::new(SessionConfig::default().with_seed(42))?;
//! assert_eq!(session.position(), session.grid().start());
//! # Ok::<(), qgrid::Error>(())
//! ```

pub mod config;

pub use config::SessionConfig;
