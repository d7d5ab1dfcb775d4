//! Error types for the qgrid crate

use thiserror::Error;

use crate::gridworld::Cell;

/// Main error type for the qgrid crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid grid dimensions: {rows} rows x {cols} cols (both must be positive)")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("{role} cell {cell} is outside the {cols}x{rows} grid")]
    CellOutOfBounds {
        role: String,
        cell: Cell,
        rows: usize,
        cols: usize,
    },

    #[error("cell {cell} is used as both {first} and {second}")]
    OverlappingCells {
        cell: Cell,
        first: String,
        second: String,
    },

    #[error("invalid parameter {name} = {value} (expected {expected})")]
    InvalidParameter {
        name: String,
        value: f64,
        expected: String,
    },

    #[error("unknown grid preset '{name}'. Expected one of: {expected}")]
    UnknownPreset { name: String, expected: String },

    #[error("invalid progress bar template: {message}")]
    ProgressBarTemplate { message: String },

    #[error("auto-run scheduler lost access to the session: lock poisoned")]
    SchedulerPoisoned,

    #[error("auto-run scheduler thread panicked")]
    SchedulerPanicked,

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}

impl Error {
    pub(crate) fn invalid_parameter(name: &str, value: f64, expected: &str) -> Self {
        Error::InvalidParameter {
            name: name.to_string(),
            value,
            expected: expected.to_string(),
        }
    }
}
