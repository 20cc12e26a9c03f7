// src/dag/mod.rs

//! Action graph and scheduling.
//!
//! - [`graph`] resolves `TargetId` dependencies into concrete edges, selects
//!   the closure of requested targets and rejects cycles.
//! - [`scheduler`] is the per-run state machine deciding which actions are
//!   ready, and halting dispatch after a failure or interrupt.
//! - [`action_info`] holds per-action run state and the scheduled-action
//!   type handed to executors.
//! - [`scheduler_step`] defines the result type for scheduler steps.
//! - [`state_manager`] manages per-run state transitions.

pub mod action_info;
pub mod graph;
pub mod scheduler;
pub mod scheduler_step;
pub mod state_manager;

pub use action_info::{RunState, ScheduledAction};
pub use graph::ActionGraph;
pub use scheduler::Scheduler;
pub use scheduler_step::SchedulerStep;
