// tests/executor_ordering.rs

use std::sync::Arc;
use std::time::{Duration, Instant};

use castle::action::{Action, ActionId, ActionSpec, TargetId};
use castle::cluster::CastleCluster;
use castle::dag::ActionGraph;
use castle::{execute, exit_code};
use castle_test_utils::{ClusterBuilder, EventLog, RecordingAction, init_tracing, with_timeout};

fn cluster(nodes: &[&str]) -> Arc<CastleCluster> {
    let dir = std::env::temp_dir();
    nodes
        .iter()
        .fold(ClusterBuilder::new(dir), |b, n| b.with_node(n, &[]))
        .build()
}

fn id(ty: &str, node: &str) -> ActionId {
    ActionId::new(ty, node)
}

fn recording(log: &Arc<EventLog>, ty: &str, node: &str, deps: &[TargetId]) -> RecordingAction {
    let spec = deps
        .iter()
        .cloned()
        .fold(ActionSpec::new(id(ty, node)), ActionSpec::after);
    RecordingAction::new(spec, Arc::clone(log))
}

#[tokio::test]
async fn dependencies_finish_before_dependents_start() {
    init_tracing();
    let log = EventLog::new();
    let actions: Vec<Arc<dyn Action>> = vec![
        Arc::new(recording(&log, "a", "n1", &[]).with_sleep(Duration::from_millis(20))),
        Arc::new(recording(&log, "a", "n2", &[]).with_sleep(Duration::from_millis(40))),
        Arc::new(recording(&log, "b", "n1", &[TargetId::all("a")])),
        Arc::new(recording(&log, "c", "n2", &[TargetId::exact("b", "n1")])),
    ];

    let graph = ActionGraph::build(actions).unwrap();
    let report = with_timeout(execute(cluster(&["n1", "n2"]), graph, 4)).await.unwrap();

    assert!(report.is_success(), "{report}");
    assert_eq!(report.succeeded.len(), 4);

    let b_start = log.started(&id("b", "n1")).unwrap();
    assert!(log.finished(&id("a", "n1")).unwrap() < b_start);
    assert!(log.finished(&id("a", "n2")).unwrap() < b_start);
    assert!(log.finished(&id("b", "n1")).unwrap() < log.started(&id("c", "n2")).unwrap());
}

#[tokio::test]
async fn unrelated_actions_run_concurrently() {
    init_tracing();
    let log = EventLog::new();
    let actions: Vec<Arc<dyn Action>> = vec![
        Arc::new(recording(&log, "x", "n1", &[]).with_sleep(Duration::from_millis(200))),
        Arc::new(recording(&log, "y", "n2", &[]).with_sleep(Duration::from_millis(200))),
    ];

    let graph = ActionGraph::build(actions).unwrap();
    let report = with_timeout(execute(cluster(&["n1", "n2"]), graph, 2)).await.unwrap();
    assert!(report.is_success());

    let (x, y) = (id("x", "n1"), id("y", "n2"));
    assert!(log.started(&x).unwrap() < log.finished(&y).unwrap());
    assert!(log.started(&y).unwrap() < log.finished(&x).unwrap());
}

#[tokio::test]
async fn concurrency_limit_of_one_serializes_actions() {
    init_tracing();
    let log = EventLog::new();
    let actions: Vec<Arc<dyn Action>> = vec![
        Arc::new(recording(&log, "x", "n1", &[]).with_sleep(Duration::from_millis(30))),
        Arc::new(recording(&log, "y", "n2", &[]).with_sleep(Duration::from_millis(30))),
        Arc::new(recording(&log, "z", "n1", &[]).with_sleep(Duration::from_millis(30))),
    ];

    let graph = ActionGraph::build(actions).unwrap();
    with_timeout(execute(cluster(&["n1", "n2"]), graph, 1)).await.unwrap();

    let events = log.events();
    for pair in events.chunks(2) {
        assert_eq!(pair[0].id, pair[1].id, "actions overlapped: {events:?}");
    }
}

#[tokio::test]
async fn failure_skips_pending_actions_and_sets_status() {
    init_tracing();
    let log = EventLog::new();
    let actions: Vec<Arc<dyn Action>> = vec![
        Arc::new(recording(&log, "a", "n1", &[]).failing(7)),
        Arc::new(recording(&log, "b", "n1", &[TargetId::all("a")])),
        Arc::new(recording(&log, "c", "n2", &[]).with_sleep(Duration::from_millis(100))),
    ];

    let cluster = cluster(&["n1", "n2"]);
    let graph = ActionGraph::build(actions).unwrap();
    let report = with_timeout(execute(Arc::clone(&cluster), graph, 4)).await.unwrap();

    assert_eq!(report.failed, vec![id("a", "n1")]);
    assert_eq!(report.skipped, vec![id("b", "n1")]);
    assert_eq!(report.succeeded, vec![id("c", "n2")], "in-flight work finishes");
    assert!(log.started(&id("b", "n1")).is_none());

    assert_eq!(cluster.status().return_code(), 7);
    assert_eq!(exit_code(&cluster, &report), 7);
}

#[tokio::test]
async fn failure_skips_actions_still_waiting_for_a_permit() {
    init_tracing();
    let log = EventLog::new();
    let actions: Vec<Arc<dyn Action>> = vec![
        Arc::new(recording(&log, "a", "n1", &[]).failing(7)),
        Arc::new(recording(&log, "b", "n1", &[])),
        Arc::new(recording(&log, "c", "n2", &[])),
    ];

    let cluster = cluster(&["n1", "n2"]);
    let graph = ActionGraph::build(actions).unwrap();
    let report = with_timeout(execute(Arc::clone(&cluster), graph, 1)).await.unwrap();

    let mut skipped = report.skipped.clone();
    skipped.sort();
    assert_eq!(report.failed, vec![id("a", "n1")]);
    assert_eq!(skipped, vec![id("b", "n1"), id("c", "n2")]);
    assert!(report.succeeded.is_empty(), "{report}");
    assert!(log.started(&id("b", "n1")).is_none());
    assert!(log.started(&id("c", "n2")).is_none());
    assert_eq!(exit_code(&cluster, &report), 7);
}

#[tokio::test]
async fn failure_skips_actions_still_in_their_initial_delay() {
    init_tracing();
    let log = EventLog::new();
    let late = ActionSpec::new(id("late", "n2")).with_initial_delay(Duration::from_secs(2));
    let actions: Vec<Arc<dyn Action>> = vec![
        Arc::new(recording(&log, "a", "n1", &[]).failing(7)),
        Arc::new(RecordingAction::new(late, Arc::clone(&log))),
    ];

    let started = Instant::now();
    let graph = ActionGraph::build(actions).unwrap();
    let report = with_timeout(execute(cluster(&["n1", "n2"]), graph, 4)).await.unwrap();

    assert_eq!(report.failed, vec![id("a", "n1")]);
    assert_eq!(report.skipped, vec![id("late", "n2")]);
    assert!(log.started(&id("late", "n2")).is_none());
    assert!(started.elapsed() < Duration::from_secs(1), "delay was not cut short");
}

#[tokio::test]
async fn initial_delay_defers_the_action() {
    init_tracing();
    let log = EventLog::new();
    let spec = ActionSpec::new(id("late", "n1")).with_initial_delay(Duration::from_millis(150));
    let actions: Vec<Arc<dyn Action>> = vec![Arc::new(RecordingAction::new(spec, Arc::clone(&log)))];

    let started = Instant::now();
    let graph = ActionGraph::build(actions).unwrap();
    with_timeout(execute(cluster(&["n1"]), graph, 1)).await.unwrap();

    assert!(started.elapsed() >= Duration::from_millis(150));
    assert!(log.finished(&id("late", "n1")).is_some());
}

#[tokio::test]
async fn action_on_unknown_node_fails() {
    init_tracing();
    let log = EventLog::new();
    let actions: Vec<Arc<dyn Action>> = vec![Arc::new(recording(&log, "a", "ghost", &[]))];

    let cluster = cluster(&["n1"]);
    let graph = ActionGraph::build(actions).unwrap();
    let report = with_timeout(execute(Arc::clone(&cluster), graph, 1)).await.unwrap();

    assert_eq!(report.failed, vec![id("a", "ghost")]);
    assert!(log.events().is_empty());
    assert_eq!(cluster.status().return_code(), 1);
}
