// tests/runtime_fake_executor.rs

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use castle::action::{Action, ActionId, ActionSpec, TargetId};
use castle::dag::{ActionGraph, Scheduler};
use castle::engine::{CoreRuntime, Runtime, RuntimeEvent};
use castle_test_utils::{EventLog, FakeExecutor, RecordingAction, init_tracing, with_timeout};

/// init:{a,b} <- start:a <- check:a
fn graph() -> ActionGraph {
    let log = EventLog::new();
    let action = |ty: &str, scope: &str, deps: &[TargetId]| -> Arc<dyn Action> {
        let spec = deps
            .iter()
            .cloned()
            .fold(ActionSpec::new(ActionId::new(ty, scope)), ActionSpec::after);
        Arc::new(RecordingAction::new(spec, Arc::clone(&log)))
    };

    ActionGraph::build([
        action("init", "a", &[]),
        action("init", "b", &[]),
        action("start", "a", &[TargetId::all("init")]),
        action("check", "a", &[TargetId::exact("start", "a")]),
    ])
    .unwrap()
}

#[tokio::test]
async fn runtime_dispatches_in_dependency_order() {
    init_tracing();
    let (tx, rx) = mpsc::channel::<RuntimeEvent>(16);
    let executed = Arc::new(Mutex::new(Vec::new()));
    let executor = FakeExecutor::new(tx, Arc::clone(&executed));

    let runtime = Runtime::new(CoreRuntime::new(Scheduler::new(graph())), rx, executor);
    let report = with_timeout(runtime.run()).await.unwrap();

    assert!(report.is_success());
    let executed: Vec<String> = executed.lock().unwrap().iter().map(ToString::to_string).collect();
    assert_eq!(executed, vec!["init:a", "init:b", "start:a", "check:a"]);
}

#[tokio::test]
async fn runtime_halts_after_failure() {
    init_tracing();
    let (tx, rx) = mpsc::channel::<RuntimeEvent>(16);
    let executed = Arc::new(Mutex::new(Vec::new()));
    let executor = FakeExecutor::new(tx, Arc::clone(&executed)).failing(ActionId::new("init", "b"), 2);

    let runtime = Runtime::new(CoreRuntime::new(Scheduler::new(graph())), rx, executor);
    let report = with_timeout(runtime.run()).await.unwrap();

    assert!(!report.is_success());
    assert_eq!(report.failed, vec![ActionId::new("init", "b")]);
    assert_eq!(
        report.skipped,
        vec![ActionId::new("check", "a"), ActionId::new("start", "a")]
    );
    assert_eq!(executed.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn interrupt_before_completion_skips_remaining_work() {
    init_tracing();
    let (tx, rx) = mpsc::channel::<RuntimeEvent>(16);
    tx.send(RuntimeEvent::ShutdownRequested).await.unwrap();

    let executed = Arc::new(Mutex::new(Vec::new()));
    let executor = FakeExecutor::new(tx, Arc::clone(&executed));
    let runtime = Runtime::new(CoreRuntime::new(Scheduler::new(graph())), rx, executor);
    let report = with_timeout(runtime.run()).await.unwrap();

    assert!(report.interrupted);
    assert_eq!(report.succeeded.len(), 2, "roots were already in flight");
    assert_eq!(report.skipped.len(), 2);
}
