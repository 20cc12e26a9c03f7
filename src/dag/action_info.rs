// src/dag/action_info.rs

//! Per-run action state and the scheduled-action type.

use std::sync::Arc;
use std::time::Duration;

use crate::action::{Action, ActionId};

/// Per-run state of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Waiting on dependencies.
    Pending,
    /// Dispatched to the executor.
    Running,
    DoneSuccess,
    DoneFailed,
    /// Never dispatched because the run was halted.
    Skipped,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunState::DoneSuccess | RunState::DoneFailed | RunState::Skipped
        )
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ActionInfo {
    pub id: ActionId,
    pub action: Arc<dyn Action>,
    /// Concrete actions this one waits for.
    pub deps: Vec<ActionId>,
    pub run_state: RunState,
}

/// An action the scheduler wants the executor to run now.
#[derive(Debug, Clone)]
pub struct ScheduledAction {
    pub id: ActionId,
    pub action: Arc<dyn Action>,
    /// Deferral applied by the executor before the action body runs.
    pub initial_delay: Duration,
}

impl ScheduledAction {
    pub fn new(action: Arc<dyn Action>) -> Self {
        Self {
            id: action.id().clone(),
            initial_delay: action.spec().initial_delay(),
            action,
        }
    }

    /// The node this action runs against.
    pub fn node_name(&self) -> &str {
        self.id.scope()
    }
}
