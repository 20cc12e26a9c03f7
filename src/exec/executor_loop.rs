// src/exec/executor_loop.rs

//! Background loop that turns scheduled actions into running Tokio tasks.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::action::ActionId;
use crate::cluster::CastleCluster;
use crate::dag::ScheduledAction;
use crate::engine::RuntimeEvent;
use crate::exec::action_runner::run_action;

/// Spawn the background executor loop.
///
/// Each scheduled action runs in its own Tokio task; at most
/// `max_concurrency` action bodies run at once, and **per action id there is
/// never more than one runner at the same time**. Once `halt` is set,
/// runners that have not started their action report it skipped.
pub fn spawn_executor(
    cluster: Arc<CastleCluster>,
    max_concurrency: usize,
    halt: Arc<watch::Sender<bool>>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> mpsc::Sender<ScheduledAction> {
    let (tx, mut rx) = mpsc::channel::<ScheduledAction>(32);
    let permits = Arc::new(Semaphore::new(max_concurrency.max(1)));

    tokio::spawn(async move {
        info!(max_concurrency, "executor loop started");

        let mut active: HashMap<ActionId, JoinHandle<()>> = HashMap::new();
        while let Some(scheduled) = rx.recv().await {
            active.retain(|_, handle| !handle.is_finished());

            if active.contains_key(&scheduled.id) {
                warn!(action = %scheduled.id, "action already running; ignoring duplicate dispatch");
                continue;
            }

            debug!(action = %scheduled.id, "spawning action runner");
            let id = scheduled.id.clone();
            let handle = tokio::spawn(run_action(
                scheduled,
                Arc::clone(&cluster),
                Arc::clone(&permits),
                Arc::clone(&halt),
                runtime_tx.clone(),
            ));
            active.insert(id, handle);
        }

        info!("executor loop finished (channel closed)");
    });

    tx
}
