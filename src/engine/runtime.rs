// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::dag::ScheduledAction;
use crate::errors::Result;
use crate::exec::ExecutorBackend;

use super::core::CoreRuntime;
use super::{CoreCommand, CoreStep, RunReport, RuntimeEvent};

/// Drives the scheduler in response to `RuntimeEvent`s and delegates action
/// execution to an `ExecutorBackend`.
///
/// This is a pure IO shell around `CoreRuntime`, which contains all the
/// runtime semantics.
pub struct Runtime<E: ExecutorBackend> {
    core: CoreRuntime,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    executor: E,
}

impl<E: ExecutorBackend> fmt::Debug for Runtime<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<E: ExecutorBackend> Runtime<E> {
    pub fn new(core: CoreRuntime, event_rx: mpsc::Receiver<RuntimeEvent>, executor: E) -> Self {
        Self {
            core,
            event_rx,
            executor,
        }
    }

    /// Main event loop. Returns once every action is terminal.
    pub async fn run(mut self) -> Result<RunReport> {
        info!(actions = self.core.scheduler().graph().len(), "castle runtime started");

        let mut step = self.core.start();
        loop {
            if !self.apply(step).await? {
                break;
            }

            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    warn!("runtime event channel closed with actions outstanding");
                    break;
                }
            };

            debug!(?event, "runtime received event");
            step = self.core.step(event);
        }

        let report = self.core.report();
        info!(%report, "runtime exiting");
        Ok(report)
    }

    /// Execute the commands of one core step; returns `keep_running`.
    async fn apply(&mut self, step: CoreStep) -> Result<bool> {
        for command in step.commands {
            match command {
                CoreCommand::DispatchActions(actions) => self.spawn_ready(actions).await?,
                CoreCommand::HaltDispatch => {
                    debug!("core halted dispatch");
                    self.executor.halt_dispatch();
                }
                CoreCommand::RequestExit => debug!("core issued RequestExit command"),
            }
        }
        Ok(step.keep_running)
    }

    async fn spawn_ready(&mut self, actions: Vec<ScheduledAction>) -> Result<()> {
        if actions.is_empty() {
            return Ok(());
        }

        let ids: Vec<String> = actions.iter().map(|a| a.id.to_string()).collect();
        debug!(?ids, "spawning ready actions");

        self.executor.spawn_ready_actions(actions).await
    }
}
