//! CLI subcommands

pub mod autorun;
pub mod presets;
pub mod step;
pub mod train;
