// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! This module contains a synchronous, deterministic "core runtime" that
//! consumes [`RuntimeEvent`]s and produces:
//! - an updated core state
//! - a list of "commands" describing what the IO shell should do next
//!
//! The async/IO-heavy shell (`engine::runtime::Runtime`) is responsible for
//! reading events from channels and handing `ScheduledAction`s to the
//! executor. The core is unit tested without Tokio, channels or nodes.

use crate::dag::Scheduler;
use crate::engine::event_handlers::{
    CoreStep, handle_action_completion, handle_run_start, handle_shutdown,
};
use crate::engine::{RunReport, RuntimeEvent};

/// Pure core runtime state.
///
/// It has **no** channels, no Tokio types, and does not perform any IO.
#[derive(Debug)]
pub struct CoreRuntime {
    scheduler: Scheduler,
    interrupted: bool,
}

impl CoreRuntime {
    pub fn new(scheduler: Scheduler) -> Self {
        Self {
            scheduler,
            interrupted: false,
        }
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn is_finished(&self) -> bool {
        self.scheduler.is_finished()
    }

    /// Begin the run. Must be called once before feeding events.
    pub fn start(&mut self) -> CoreStep {
        handle_run_start(&mut self.scheduler)
    }

    /// Handle a single runtime event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::ActionCompleted { id, outcome } => {
                handle_action_completion(&mut self.scheduler, id, outcome)
            }
            RuntimeEvent::ShutdownRequested => {
                self.interrupted = true;
                handle_shutdown(&mut self.scheduler)
            }
        }
    }

    pub fn report(&self) -> RunReport {
        RunReport::from_scheduler(&self.scheduler, self.interrupted)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::action::{Action, ActionId, ActionSpec, TargetId};
    use crate::cluster::{CastleCluster, CastleNode};
    use crate::dag::ActionGraph;
    use crate::engine::{ActionOutcome, CoreCommand};
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

    fn core() -> CoreRuntime {
        let a: Arc<dyn Action> = Arc::new(Noop(ActionSpec::new(ActionId::new("a", "n"))));
        let b: Arc<dyn Action> = Arc::new(Noop(
            ActionSpec::new(ActionId::new("b", "n")).after(TargetId::all("a")),
        ));
        CoreRuntime::new(Scheduler::new(ActionGraph::build([a, b]).unwrap()))
    }

    fn dispatched(step: &CoreStep) -> Vec<String> {
        step.commands
            .iter()
            .filter_map(|c| match c {
                CoreCommand::DispatchActions(actions) => Some(actions),
                CoreCommand::HaltDispatch | CoreCommand::RequestExit => None,
            })
            .flatten()
            .map(|s| s.id.to_string())
            .collect()
    }

    #[test]
    fn runs_to_completion_then_requests_exit() {
        let mut core = core();
        assert_eq!(dispatched(&core.start()), vec!["a:n"]);

        let step = core.step(RuntimeEvent::ActionCompleted {
            id: ActionId::new("a", "n"),
            outcome: ActionOutcome::Success,
        });
        assert_eq!(dispatched(&step), vec!["b:n"]);
        assert!(step.keep_running);

        let step = core.step(RuntimeEvent::ActionCompleted {
            id: ActionId::new("b", "n"),
            outcome: ActionOutcome::Success,
        });
        assert!(!step.keep_running);
        assert!(matches!(step.commands.last(), Some(CoreCommand::RequestExit)));
        assert!(core.report().is_success());
    }

    #[test]
    fn failure_halts_dispatch_once() {
        let mut core = core();
        core.start();

        let step = core.step(RuntimeEvent::ActionCompleted {
            id: ActionId::new("a", "n"),
            outcome: ActionOutcome::Failed(4),
        });
        let halts = step
            .commands
            .iter()
            .filter(|c| matches!(c, CoreCommand::HaltDispatch))
            .count();
        assert_eq!(halts, 1);
        assert!(!step.keep_running);
        assert_eq!(core.report().skipped, vec![ActionId::new("b", "n")]);
    }

    #[test]
    fn interrupt_skips_pending_and_waits_for_running() {
        let mut core = core();
        core.start();

        let step = core.step(RuntimeEvent::ShutdownRequested);
        assert!(step.keep_running, "a is still in flight");
        assert!(matches!(step.commands.first(), Some(CoreCommand::HaltDispatch)));

        let step = core.step(RuntimeEvent::ActionCompleted {
            id: ActionId::new("a", "n"),
            outcome: ActionOutcome::Success,
        });
        assert!(dispatched(&step).is_empty());
        assert!(!step.keep_running);

        let report = core.report();
        assert!(report.interrupted);
        assert_eq!(report.succeeded, vec![ActionId::new("a", "n")]);
        assert_eq!(report.skipped, vec![ActionId::new("b", "n")]);
    }
}
