// src/lib.rs

pub mod action;
pub mod cli;
pub mod cluster;
pub mod command;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod template;
pub mod types;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::action::create_actions;
use crate::cli::CliArgs;
use crate::cluster::CastleCluster;
use crate::config::load_and_validate;
use crate::dag::{ActionGraph, Scheduler};
use crate::engine::report::INTERRUPT_EXIT_CODE;
use crate::engine::{CoreRuntime, RunReport, Runtime, RuntimeEvent};
use crate::errors::{GENERIC_FAILURE_CODE, Result};
use crate::exec::RealExecutorBackend;

/// High-level entry point used by `main.rs`. Returns the process exit code.
///
/// This wires together:
/// - cluster file loading and cluster construction
/// - action creation, target selection and placement checks
/// - scheduler / runtime / executor
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> anyhow::Result<i32> {
    let cluster_path = PathBuf::from(&args.cluster);
    let overrides: BTreeMap<String, String> = args.vars.iter().cloned().collect();
    let cfg = load_and_validate(&cluster_path, &overrides)
        .with_context(|| format!("loading cluster file '{}'", cluster_path.display()))?;

    let cluster = Arc::new(CastleCluster::from_config(&cfg, &config_root_dir(&cluster_path))?);

    let graph = ActionGraph::select(create_actions(&cluster), &args.targets)?;
    cluster.check_placement(graph.actions())?;

    if args.dry_run {
        print_dry_run(&graph);
        return Ok(0);
    }

    let max_concurrency = args
        .max_concurrency
        .map(|n| n.get())
        .or(cluster.env().max_concurrency)
        .unwrap_or(cluster.len());

    let report = execute_inner(Arc::clone(&cluster), graph, max_concurrency, true).await?;
    Ok(exit_code(&cluster, &report))
}

/// Run every action of `graph` against `cluster`, at most
/// `max_concurrency` at a time, and report what happened.
pub async fn execute(
    cluster: Arc<CastleCluster>,
    graph: ActionGraph,
    max_concurrency: usize,
) -> Result<RunReport> {
    execute_inner(cluster, graph, max_concurrency, false).await
}

async fn execute_inner(
    cluster: Arc<CastleCluster>,
    graph: ActionGraph,
    max_concurrency: usize,
    handle_ctrl_c: bool,
) -> Result<RunReport> {
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    if handle_ctrl_c {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl+C");
                return;
            }
            info!("interrupt received; no further actions will be started");
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    let executor = RealExecutorBackend::new(cluster, max_concurrency, rt_tx);
    let core = CoreRuntime::new(Scheduler::new(graph));
    Runtime::new(core, rt_rx, executor).run().await
}

/// Aggregate status of a finished run.
///
/// The cluster status register already holds action failures and status
/// probes; an interrupt contributes 130 and a failure that somehow left the
/// register clean contributes 1.
pub fn exit_code(cluster: &CastleCluster, report: &RunReport) -> i32 {
    if report.interrupted {
        cluster.status().record_failure(INTERRUPT_EXIT_CODE);
    }
    if !report.failed.is_empty() || !report.unfinished.is_empty() {
        cluster.status().record_failure(GENERIC_FAILURE_CODE);
    }
    cluster.status().return_code()
}

/// Directory that anchors a relative `working_directory`.
///
/// - If the cluster path has a non-empty parent (e.g. "conf/Castle.toml"),
///   we use that directory.
/// - If it's just a bare filename like "Castle.toml" (parent = ""),
///   we fall back to the current working directory "."
fn config_root_dir(cluster_path: &Path) -> PathBuf {
    match cluster_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Dry-run output: execution order with dependencies and delays.
fn print_dry_run(graph: &ActionGraph) {
    println!("castle dry-run");
    println!();
    println!("actions ({}):", graph.len());

    for id in graph.topological_order() {
        println!("  - {id}");
        let deps = graph.dependencies_of(id);
        if !deps.is_empty() {
            let deps: Vec<String> = deps.iter().map(ToString::to_string).collect();
            println!("      after: {}", deps.join(", "));
        }
        if let Some(action) = graph.action(id) {
            let delay = action.spec().initial_delay();
            if !delay.is_zero() {
                println!("      initial delay: {}ms", delay.as_millis());
            }
        }
    }

    debug!("dry-run complete (no execution)");
}
