// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use tracing::info;

use crate::action::ActionId;
use crate::dag::{ScheduledAction, Scheduler};
use crate::engine::ActionOutcome;

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone)]
pub enum CoreCommand {
    /// Send these actions to the executor.
    DispatchActions(Vec<ScheduledAction>),
    /// The run halted: runners that have not started their action yet must
    /// not start it.
    HaltDispatch,
    /// Every action is terminal; the run is over.
    RequestExit,
}

/// Decision returned by the core after handling a single event.
#[derive(Debug, Clone)]
pub struct CoreStep {
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    fn from_ready(scheduler: &Scheduler, ready: Vec<ScheduledAction>) -> Self {
        Self::build(scheduler, ready, false)
    }

    fn build(scheduler: &Scheduler, ready: Vec<ScheduledAction>, halt: bool) -> Self {
        let mut commands = Vec::new();
        if halt {
            commands.push(CoreCommand::HaltDispatch);
        }
        if !ready.is_empty() {
            commands.push(CoreCommand::DispatchActions(ready));
        }

        let keep_running = !scheduler.is_finished();
        if !keep_running {
            commands.push(CoreCommand::RequestExit);
        }

        CoreStep {
            commands,
            keep_running,
        }
    }
}

/// Seed the run with every action that has no dependencies.
pub fn handle_run_start(scheduler: &mut Scheduler) -> CoreStep {
    let ready = scheduler.handle_start();
    CoreStep::from_ready(scheduler, ready)
}

/// Handle an action completion event.
pub fn handle_action_completion(
    scheduler: &mut Scheduler,
    id: ActionId,
    outcome: ActionOutcome,
) -> CoreStep {
    let was_halted = scheduler.is_halted();
    let ready = scheduler.handle_completion(&id, outcome);
    CoreStep::build(scheduler, ready, !was_halted && scheduler.is_halted())
}

/// Handle an interrupt: halt dispatch and wait for in-flight actions.
pub fn handle_shutdown(scheduler: &mut Scheduler) -> CoreStep {
    scheduler.halt();
    if scheduler.has_running() {
        info!("interrupt received; waiting for running actions to finish");
    }
    CoreStep::build(scheduler, Vec::new(), true)
}
