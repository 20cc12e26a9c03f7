use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use tokio::sync::mpsc;
use castle::action::ActionId;
use castle::dag::ScheduledAction;
use castle::engine::{ActionOutcome, RuntimeEvent};
use castle::errors::Result;
use castle::exec::ExecutorBackend;
use castle::types::BoxFuture;

/// A fake executor that:
/// - records which actions were dispatched, in order
/// - immediately reports ActionCompleted for each one, failing those
///   registered with [`failing`](Self::failing)
pub struct FakeExecutor {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    executed: Arc<Mutex<Vec<ActionId>>>,
    failures: BTreeMap<ActionId, i32>,
}

impl FakeExecutor {
    pub fn new(runtime_tx: mpsc::Sender<RuntimeEvent>, executed: Arc<Mutex<Vec<ActionId>>>) -> Self {
        Self {
            runtime_tx,
            executed,
            failures: BTreeMap::new(),
        }
    }

    pub fn failing(mut self, id: ActionId, code: i32) -> Self {
        self.failures.insert(id, code);
        self
    }
}

impl ExecutorBackend for FakeExecutor {
    fn spawn_ready_actions(&mut self, actions: Vec<ScheduledAction>) -> BoxFuture<'_, Result<()>> {
        let tx = self.runtime_tx.clone();
        let executed = Arc::clone(&self.executed);
        let failures = self.failures.clone();

        Box::pin(async move {
            for action in actions {
                executed.lock().unwrap().push(action.id.clone());

                let outcome = match failures.get(&action.id) {
                    Some(code) => ActionOutcome::Failed(*code),
                    None => ActionOutcome::Success,
                };
                tx.send(RuntimeEvent::ActionCompleted {
                    id: action.id.clone(),
                    outcome,
                })
                .await
                .context("runtime event channel closed")?;
            }
            Ok(())
        })
    }
}
