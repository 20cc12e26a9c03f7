//! In-memory uplink that journals every request instead of running it.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use castle::command::{CommandRequest, Uplink};
use castle::errors::Result;
use castle::types::BoxFuture;

/// One request seen by a [`FakeUplink`].
#[derive(Debug, Clone)]
pub struct JournalEntry {
    /// Global order across every uplink sharing the journal.
    pub seq: usize,
    pub node: String,
    pub request: CommandRequest,
    /// For `SyncTo`: the local file's contents at transfer time.
    pub synced_contents: Option<String>,
    pub return_code: i32,
}

impl JournalEntry {
    pub fn command_line(&self) -> String {
        self.request.command_line().join(" ")
    }
}

/// Journal shared by all fake uplinks of a cluster.
#[derive(Debug, Default)]
pub struct UplinkJournal {
    seq: AtomicUsize,
    entries: Mutex<Vec<JournalEntry>>,
}

impl UplinkJournal {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn entries(&self) -> Vec<JournalEntry> {
        self.entries.lock().unwrap().clone()
    }

    pub fn for_node(&self, node: &str) -> Vec<JournalEntry> {
        self.entries()
            .into_iter()
            .filter(|e| e.node == node)
            .collect()
    }

    /// Joined command lines issued against `node`, in order.
    pub fn command_lines(&self, node: &str) -> Vec<String> {
        self.for_node(node).iter().map(JournalEntry::command_line).collect()
    }

    /// First entry on `node` whose command line contains `needle`.
    pub fn find(&self, node: &str, needle: &str) -> Option<JournalEntry> {
        self.for_node(node)
            .into_iter()
            .find(|e| e.command_line().contains(needle))
    }

    fn record(&self, node: &str, request: &CommandRequest, return_code: i32) {
        let synced_contents = match request {
            CommandRequest::SyncTo { local, .. } => std::fs::read_to_string(local).ok(),
            _ => None,
        };
        let entry = JournalEntry {
            seq: self.seq.fetch_add(1, Ordering::SeqCst),
            node: node.to_string(),
            request: request.clone(),
            synced_contents,
            return_code,
        };
        self.entries.lock().unwrap().push(entry);
    }
}

#[derive(Debug)]
struct Script {
    pattern: String,
    /// Codes handed out in order; the last one repeats.
    codes: VecDeque<i32>,
}

/// Uplink answering from scripted return codes (default 0).
#[derive(Debug)]
pub struct FakeUplink {
    node: String,
    internal_dns: String,
    journal: Arc<UplinkJournal>,
    scripts: Mutex<Vec<Script>>,
}

impl FakeUplink {
    pub fn new(node: impl Into<String>, internal_dns: impl Into<String>, journal: Arc<UplinkJournal>) -> Self {
        Self {
            node: node.into(),
            internal_dns: internal_dns.into(),
            journal,
            scripts: Mutex::new(Vec::new()),
        }
    }

    /// Answer requests whose command line contains `pattern` with `codes`,
    /// one per request, repeating the last.
    pub fn respond(&self, pattern: impl Into<String>, codes: &[i32]) {
        self.scripts.lock().unwrap().push(Script {
            pattern: pattern.into(),
            codes: codes.iter().copied().collect(),
        });
    }

    fn next_code(&self, command_line: &str) -> i32 {
        let mut scripts = self.scripts.lock().unwrap();
        match scripts.iter_mut().find(|s| command_line.contains(&s.pattern)) {
            Some(script) if script.codes.len() > 1 => script.codes.pop_front().unwrap_or(0),
            Some(script) => script.codes.front().copied().unwrap_or(0),
            None => 0,
        }
    }
}

impl Uplink for FakeUplink {
    fn internal_dns(&self) -> &str {
        &self.internal_dns
    }

    fn execute<'a>(&'a self, request: &'a CommandRequest) -> BoxFuture<'a, Result<i32>> {
        Box::pin(async move {
            let code = self.next_code(&request.command_line().join(" "));
            self.journal.record(&self.node, request, code);
            Ok(code)
        })
    }
}
