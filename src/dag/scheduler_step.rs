// src/dag/scheduler_step.rs

//! Step-by-step execution result types for the scheduler.

use crate::action::ActionId;
use crate::dag::action_info::ScheduledAction;

/// Structured result of a single scheduler "step".
///
/// Tests use this to step the graph by hand and assert on what changed.
#[derive(Debug, Clone, Default)]
pub struct SchedulerStep {
    /// Actions that became ready to run as a result of this step.
    pub newly_scheduled: Vec<ScheduledAction>,
    /// Actions that were newly marked as failed in this step.
    pub newly_failed: Vec<ActionId>,
    /// Pending actions skipped because this step halted the run.
    pub newly_skipped: Vec<ActionId>,
    /// Whether every action is now in a terminal state.
    pub run_just_finished: bool,
}
