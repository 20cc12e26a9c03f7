// src/exec/action_runner.rs

//! Individual action runner.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, anyhow};
use tokio::sync::{Semaphore, mpsc, watch};
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::cluster::CastleCluster;
use crate::dag::ScheduledAction;
use crate::engine::{ActionOutcome, RuntimeEvent};
use crate::errors::{CastleError, Result};

/// Run a single action and emit exactly one `ActionCompleted` event.
///
/// Errors (including panics inside the action) are logged with the action
/// id and node, recorded in the cluster status register, and reported as
/// `ActionOutcome::Failed` with the error's exit code. A failure also sets
/// `halt` before the concurrency permit is released, so queued runners never
/// start after it. A runner that finds `halt` set once its delay has passed
/// or its permit is granted reports `ActionOutcome::Skipped` instead.
pub async fn run_action(
    scheduled: ScheduledAction,
    cluster: Arc<CastleCluster>,
    permits: Arc<Semaphore>,
    halt: Arc<watch::Sender<bool>>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) {
    let id = scheduled.id.clone();
    let node = scheduled.node_name().to_string();

    let outcome = match run_action_inner(scheduled, Arc::clone(&cluster), &permits, &halt).await {
        Ok(outcome) => outcome,
        Err(err) => {
            let code = err.exit_code();
            error!(action = %id, node = %node, code, error = %err, "action failed");
            cluster.status().record_failure(code);
            ActionOutcome::Failed(code)
        }
    };

    if runtime_tx
        .send(RuntimeEvent::ActionCompleted {
            id: id.clone(),
            outcome,
        })
        .await
        .is_err()
    {
        warn!(action = %id, "runtime gone; completion dropped");
    }
}

async fn run_action_inner(
    scheduled: ScheduledAction,
    cluster: Arc<CastleCluster>,
    permits: &Semaphore,
    halt: &watch::Sender<bool>,
) -> Result<ActionOutcome> {
    let mut halted = halt.subscribe();

    if !scheduled.initial_delay.is_zero() {
        debug!(
            action = %scheduled.id,
            delay_ms = scheduled.initial_delay.as_millis() as u64,
            "deferring action"
        );
        sleep_unless_halted(scheduled.initial_delay, &mut halted).await;
    }
    if *halted.borrow() {
        info!(action = %scheduled.id, "run halted during delay; skipping");
        return Ok(ActionOutcome::Skipped);
    }

    let _permit = permits
        .acquire()
        .await
        .context("executor concurrency limiter closed")?;
    if *halted.borrow() {
        info!(action = %scheduled.id, "run halted while queued; skipping");
        return Ok(ActionOutcome::Skipped);
    }

    let result = call_action(scheduled, cluster).await;
    if result.is_err() {
        halt.send_replace(true);
    }
    result.map(|()| ActionOutcome::Success)
}

/// Sleep for `delay`, returning early if the run halts first.
async fn sleep_unless_halted(delay: Duration, halted: &mut watch::Receiver<bool>) {
    tokio::select! {
        _ = tokio::time::sleep(delay) => {}
        _ = halted.wait_for(|halted| *halted) => {}
    }
}

async fn call_action(scheduled: ScheduledAction, cluster: Arc<CastleCluster>) -> Result<()> {
    let node_name = scheduled.node_name().to_string();
    if cluster.node(&node_name).is_none() {
        return Err(CastleError::UnknownNode(node_name));
    }

    let span = info_span!("action", id = %scheduled.id, node = %node_name);
    let action = scheduled.action;

    // Run on its own task so a panicking action surfaces as a JoinError.
    let handle = tokio::spawn(
        async move {
            let node = cluster
                .node(&node_name)
                .ok_or_else(|| CastleError::UnknownNode(node_name.clone()))?;

            info!("starting");
            let started = Instant::now();
            action.call(&cluster, node).await?;
            info!(elapsed_ms = started.elapsed().as_millis() as u64, "finished");
            Ok::<(), CastleError>(())
        }
        .instrument(span),
    );

    match handle.await {
        Ok(result) => result,
        Err(join_err) => Err(anyhow!("action task aborted: {join_err}").into()),
    }
}
