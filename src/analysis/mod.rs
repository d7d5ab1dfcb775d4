//! Analysis of learned Q-tables
//!
//! Tools for reading a policy back out of the learned values: the greedy
//! action and value of every cell, and a deterministic rollout that
//! follows that policy from the start cell.

pub mod policy;
pub mod trajectory;

pub use policy::{POLICY_THRESHOLD, PolicyCell, greedy_policy, state_values};
pub use trajectory::{Rollout, RolloutEnd, greedy_rollout};
