//! CLI infrastructure for the qgrid simulator
//!
//! This module provides the command-line interface for training agents,
//! stepping through individual updates, auto-running a session and listing
//! the built-in grids.

pub mod commands;
pub mod config;
pub mod output;
