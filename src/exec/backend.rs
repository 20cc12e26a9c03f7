// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! The runtime talks to an `ExecutorBackend` instead of a raw mpsc sender,
//! so tests can swap in a fake executor that records dispatches and emits
//! `ActionCompleted` events directly.

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::{mpsc, watch};

use crate::cluster::CastleCluster;
use crate::dag::ScheduledAction;
use crate::engine::RuntimeEvent;
use crate::errors::Result;
use crate::types::BoxFuture;

use super::executor_loop::spawn_executor;

/// Trait abstracting how scheduled actions are executed.
pub trait ExecutorBackend: Send {
    /// Dispatch the given actions for execution.
    ///
    /// Must not wait for the actions themselves; completion is reported
    /// asynchronously as `RuntimeEvent::ActionCompleted`.
    fn spawn_ready_actions(&mut self, actions: Vec<ScheduledAction>) -> BoxFuture<'_, Result<()>>;

    /// Stop starting actions that were dispatched but have not begun yet.
    ///
    /// Such actions still report completion, as `ActionOutcome::Skipped`.
    fn halt_dispatch(&mut self) {}
}

/// Real executor backend used in production.
///
/// Forwards scheduled actions to the background loop started by
/// [`spawn_executor`].
pub struct RealExecutorBackend {
    tx: mpsc::Sender<ScheduledAction>,
    halt: Arc<watch::Sender<bool>>,
}

impl RealExecutorBackend {
    /// Spawns the background executor loop immediately.
    pub fn new(
        cluster: Arc<CastleCluster>,
        max_concurrency: usize,
        runtime_tx: mpsc::Sender<RuntimeEvent>,
    ) -> Self {
        let halt = Arc::new(watch::Sender::new(false));
        let tx = spawn_executor(cluster, max_concurrency, Arc::clone(&halt), runtime_tx);
        Self { tx, halt }
    }
}

impl ExecutorBackend for RealExecutorBackend {
    fn spawn_ready_actions(&mut self, actions: Vec<ScheduledAction>) -> BoxFuture<'_, Result<()>> {
        // Clone the sender so the future doesn't borrow `self` across `await`.
        let tx = self.tx.clone();

        Box::pin(async move {
            for action in actions {
                tx.send(action)
                    .await
                    .context("executor loop is gone")?;
            }
            Ok(())
        })
    }

    fn halt_dispatch(&mut self) {
        self.halt.send_replace(true);
    }
}
