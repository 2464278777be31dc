//! Research run orchestration domain
//!
//! The run state machine, its configuration and what a run hands back to
//! the caller. The control loop that drives these types lives in the
//! application layer.

pub mod config;
pub mod outcome;
pub mod phase;
pub mod state;
