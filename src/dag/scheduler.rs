// src/dag/scheduler.rs

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::action::ActionId;
use crate::dag::action_info::{ActionInfo, RunState, ScheduledAction};
use crate::dag::graph::ActionGraph;
use crate::dag::scheduler_step::SchedulerStep;
use crate::dag::state_manager::StateManager;
use crate::engine::ActionOutcome;

/// Scheduler holds the immutable action graph plus mutable per-run state.
///
/// It is responsible for:
/// - deciding when an action is ready (every dependency succeeded)
/// - marking actions as succeeded or failed
/// - halting the run: after a failure or interrupt no new action is
///   dispatched, in-flight actions are left to finish and pending ones are
///   skipped
#[derive(Debug)]
pub struct Scheduler {
    graph: ActionGraph,
    actions: BTreeMap<ActionId, ActionInfo>,
    started: bool,
    halted: bool,
}

impl Scheduler {
    pub fn new(graph: ActionGraph) -> Self {
        let actions = graph
            .ids()
            .filter_map(|id| {
                let action = graph.action(id)?.clone();
                let info = ActionInfo {
                    id: id.clone(),
                    action,
                    deps: graph.dependencies_of(id).to_vec(),
                    run_state: RunState::Pending,
                };
                Some((id.clone(), info))
            })
            .collect();

        Self {
            graph,
            actions,
            started: false,
            halted: false,
        }
    }

    pub fn graph(&self) -> &ActionGraph {
        &self.graph
    }

    pub fn run_state_of(&self, id: &ActionId) -> Option<RunState> {
        self.actions.get(id).map(|info| info.run_state)
    }

    /// Every action with its current state, in id order.
    pub fn states(&self) -> impl Iterator<Item = (&ActionId, RunState)> {
        self.actions.iter().map(|(id, info)| (id, info.run_state))
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Whether every action has reached a terminal state.
    pub fn is_finished(&self) -> bool {
        self.actions.values().all(|info| info.run_state.is_terminal())
    }

    pub fn has_running(&self) -> bool {
        self.actions
            .values()
            .any(|info| info.run_state == RunState::Running)
    }

    /// Start the run: schedule every action without dependencies.
    pub fn handle_start(&mut self) -> Vec<ScheduledAction> {
        self.start_step_internal().newly_scheduled
    }

    pub fn handle_completion(&mut self, id: &ActionId, outcome: ActionOutcome) -> Vec<ScheduledAction> {
        self.completion_step_internal(id, outcome).newly_scheduled
    }

    /// Manual-step variant of `handle_completion`.
    pub fn step_completion(&mut self, id: &ActionId, outcome: ActionOutcome) -> SchedulerStep {
        self.completion_step_internal(id, outcome)
    }

    /// Stop dispatching. Pending actions become `Skipped`; running ones are
    /// left to report completion.
    pub fn halt(&mut self) -> SchedulerStep {
        let newly_skipped = if self.halted {
            Vec::new()
        } else {
            self.halted = true;
            StateManager::new(&mut self.actions).skip_pending()
        };

        if !newly_skipped.is_empty() {
            info!(skipped = newly_skipped.len(), "run halted; pending actions skipped");
        }

        SchedulerStep {
            newly_skipped,
            run_just_finished: self.is_finished(),
            ..SchedulerStep::default()
        }
    }

    fn start_step_internal(&mut self) -> SchedulerStep {
        if self.started {
            warn!("scheduler already started; ignoring");
            return SchedulerStep::default();
        }
        self.started = true;
        debug!(actions = self.actions.len(), "scheduler: starting run");

        let newly_scheduled = if self.halted {
            Vec::new()
        } else {
            StateManager::new(&mut self.actions).collect_new_ready_actions()
        };

        SchedulerStep {
            newly_scheduled,
            run_just_finished: self.is_finished(),
            ..SchedulerStep::default()
        }
    }

    fn completion_step_internal(&mut self, id: &ActionId, outcome: ActionOutcome) -> SchedulerStep {
        let Some(info) = self.actions.get_mut(id) else {
            warn!(action = %id, "completion for unknown action; ignoring");
            return SchedulerStep::default();
        };

        if info.run_state != RunState::Running {
            warn!(action = %id, state = ?info.run_state, "completion for action that is not running; ignoring");
            return SchedulerStep::default();
        }

        let mut step = SchedulerStep::default();
        match outcome {
            ActionOutcome::Success => {
                info.run_state = RunState::DoneSuccess;
                debug!(action = %id, "action completed successfully");
                if !self.halted {
                    step.newly_scheduled = StateManager::new(&mut self.actions).collect_new_ready_actions();
                }
            }
            ActionOutcome::Failed(code) => {
                info.run_state = RunState::DoneFailed;
                warn!(action = %id, code, "action failed; halting further dispatch");
                step.newly_failed.push(id.clone());
                step.newly_skipped = self.halt().newly_skipped;
            }
            ActionOutcome::Skipped => {
                info.run_state = RunState::Skipped;
                debug!(action = %id, "action skipped before it started");
                step.newly_skipped.push(id.clone());
            }
        }

        step.run_just_finished = self.is_finished();
        if step.run_just_finished {
            info!("scheduler: all actions terminal");
        }
        step
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::action::{Action, ActionSpec};
    use crate::cluster::{CastleCluster, CastleNode};
    use crate::errors::Result;
    use crate::types::BoxFuture;

    #[derive(Debug)]
    struct Noop(ActionSpec);

    impl Action for Noop {
        fn spec(&self) -> &ActionSpec {
            &self.0
        }

        fn call<'a>(&'a self, _: &'a CastleCluster, _: &'a CastleNode) -> BoxFuture<'a, Result<()>> {
            Box::pin(async { Ok(()) })
        }
    }

    fn id(s: &str) -> ActionId {
        ActionId::new(s, "n")
    }

    /// a <- b <- c, plus an independent d.
    fn scheduler() -> Scheduler {
        let spec = |name: &str, deps: &[&str]| -> Arc<dyn Action> {
            let spec = deps
                .iter()
                .fold(ActionSpec::new(id(name)), |s, d| s.after(crate::action::TargetId::exact(*d, "n")));
            Arc::new(Noop(spec))
        };
        let graph = ActionGraph::build([
            spec("a", &[]),
            spec("b", &["a"]),
            spec("c", &["b"]),
            spec("d", &[]),
        ])
        .unwrap();
        Scheduler::new(graph)
    }

    fn ids(scheduled: &[ScheduledAction]) -> Vec<String> {
        scheduled.iter().map(|s| s.id.action_type().to_string()).collect()
    }

    #[test]
    fn start_dispatches_roots_only() {
        let mut s = scheduler();
        assert_eq!(ids(&s.handle_start()), vec!["a", "d"]);
        assert_eq!(s.run_state_of(&id("b")), Some(RunState::Pending));
    }

    #[test]
    fn completion_unblocks_dependents_in_order() {
        let mut s = scheduler();
        s.handle_start();
        assert_eq!(ids(&s.handle_completion(&id("a"), ActionOutcome::Success)), vec!["b"]);
        assert!(s.handle_completion(&id("d"), ActionOutcome::Success).is_empty());
        assert_eq!(ids(&s.handle_completion(&id("b"), ActionOutcome::Success)), vec!["c"]);

        let step = s.step_completion(&id("c"), ActionOutcome::Success);
        assert!(step.run_just_finished);
        assert!(s.is_finished());
    }

    #[test]
    fn failure_halts_dispatch_but_lets_running_actions_finish() {
        let mut s = scheduler();
        s.handle_start();

        let step = s.step_completion(&id("a"), ActionOutcome::Failed(3));
        assert_eq!(step.newly_failed, vec![id("a")]);
        assert_eq!(step.newly_skipped, vec![id("b"), id("c")]);
        assert!(!step.run_just_finished, "d is still running");

        let step = s.step_completion(&id("d"), ActionOutcome::Success);
        assert!(step.newly_scheduled.is_empty());
        assert!(step.run_just_finished);
        assert_eq!(s.run_state_of(&id("d")), Some(RunState::DoneSuccess));
    }

    #[test]
    fn runner_reported_skip_is_terminal_without_failing() {
        let mut s = scheduler();
        s.handle_start();

        s.step_completion(&id("a"), ActionOutcome::Failed(3));
        let step = s.step_completion(&id("d"), ActionOutcome::Skipped);
        assert_eq!(step.newly_skipped, vec![id("d")]);
        assert!(step.newly_failed.is_empty());
        assert!(step.run_just_finished);
        assert_eq!(s.run_state_of(&id("d")), Some(RunState::Skipped));
    }

    #[test]
    fn completion_of_unknown_or_idle_action_is_ignored() {
        let mut s = scheduler();
        s.handle_start();
        let step = s.step_completion(&id("c"), ActionOutcome::Success);
        assert!(step.newly_scheduled.is_empty());
        assert_eq!(s.run_state_of(&id("c")), Some(RunState::Pending));
    }
}
