//! An action that only journals when it starts and finishes.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use castle::action::{Action, ActionId, ActionSpec};
use castle::cluster::{CastleCluster, CastleNode};
use castle::command::CommandResultError;
use castle::errors::Result;
use castle::types::BoxFuture;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Started,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub seq: usize,
    pub id: ActionId,
    pub kind: EventKind,
}

/// Globally ordered start/finish events of every recording action.
#[derive(Debug, Default)]
pub struct EventLog {
    seq: AtomicUsize,
    events: Mutex<Vec<Event>>,
}

impl EventLog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn record(&self, id: &ActionId, kind: EventKind) {
        let mut events = self.events.lock().unwrap();
        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        events.push(Event {
            seq,
            id: id.clone(),
            kind,
        });
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    fn seq_of(&self, id: &ActionId, kind: EventKind) -> Option<usize> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .find(|e| &e.id == id && e.kind == kind)
            .map(|e| e.seq)
    }

    pub fn started(&self, id: &ActionId) -> Option<usize> {
        self.seq_of(id, EventKind::Started)
    }

    pub fn finished(&self, id: &ActionId) -> Option<usize> {
        self.seq_of(id, EventKind::Finished)
    }
}

/// Action that records start and finish, optionally sleeping in between
/// and optionally failing with a command error.
#[derive(Debug)]
pub struct RecordingAction {
    spec: ActionSpec,
    log: Arc<EventLog>,
    sleep: Duration,
    fail_with: Option<i32>,
}

impl RecordingAction {
    pub fn new(spec: ActionSpec, log: Arc<EventLog>) -> Self {
        Self {
            spec,
            log,
            sleep: Duration::ZERO,
            fail_with: None,
        }
    }

    pub fn with_sleep(mut self, sleep: Duration) -> Self {
        self.sleep = sleep;
        self
    }

    pub fn failing(mut self, code: i32) -> Self {
        self.fail_with = Some(code);
        self
    }
}

impl Action for RecordingAction {
    fn spec(&self) -> &ActionSpec {
        &self.spec
    }

    fn call<'a>(&'a self, _cluster: &'a CastleCluster, _node: &'a CastleNode) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let id = self.spec.id();
            self.log.record(id, EventKind::Started);
            if !self.sleep.is_zero() {
                tokio::time::sleep(self.sleep).await;
            }
            self.log.record(id, EventKind::Finished);

            match self.fail_with {
                Some(code) => Err(CommandResultError::new(vec!["recording".to_string(), id.to_string()], code).into()),
                None => Ok(()),
            }
        })
    }
}
