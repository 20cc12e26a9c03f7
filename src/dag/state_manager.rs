// src/dag/state_manager.rs

//! Per-run state transitions for actions in the scheduler.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::action::ActionId;
use crate::dag::action_info::{ActionInfo, RunState, ScheduledAction};

/// Manages per-run state transitions for actions.
pub(crate) struct StateManager<'a> {
    actions: &'a mut BTreeMap<ActionId, ActionInfo>,
}

impl<'a> StateManager<'a> {
    pub fn new(actions: &'a mut BTreeMap<ActionId, ActionInfo>) -> Self {
        Self { actions }
    }

    /// Whether every dependency of `info` has completed successfully.
    fn deps_satisfied(actions: &BTreeMap<ActionId, ActionInfo>, info: &ActionInfo) -> bool {
        info.deps.iter().all(|dep| match actions.get(dep) {
            Some(dep_info) => dep_info.run_state == RunState::DoneSuccess,
            None => {
                warn!(action = %info.id, dep = %dep, "dependency missing from actions map");
                false
            }
        })
    }

    /// Mark `Pending` actions whose dependencies are satisfied as `Running`
    /// and return them for dispatch.
    pub fn collect_new_ready_actions(&mut self) -> Vec<ScheduledAction> {
        // Decide first, then mutate.
        let actions = &*self.actions;
        let candidates: Vec<ActionId> = actions
            .values()
            .filter(|info| info.run_state == RunState::Pending && Self::deps_satisfied(actions, info))
            .map(|info| info.id.clone())
            .collect();

        let mut ready = Vec::with_capacity(candidates.len());
        for id in candidates {
            if let Some(info) = self.actions.get_mut(&id) {
                info!(action = %info.id, "dependencies satisfied; scheduling");
                info.run_state = RunState::Running;
                ready.push(ScheduledAction::new(info.action.clone()));
            }
        }
        ready
    }

    /// Mark every `Pending` action `Skipped`, returning the ones changed.
    pub fn skip_pending(&mut self) -> Vec<ActionId> {
        let mut skipped = Vec::new();
        for info in self.actions.values_mut() {
            if info.run_state == RunState::Pending {
                debug!(action = %info.id, "skipping pending action");
                info.run_state = RunState::Skipped;
                skipped.push(info.id.clone());
            }
        }
        skipped
    }
}
