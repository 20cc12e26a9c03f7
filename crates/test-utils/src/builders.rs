#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use castle::cluster::{CastleCluster, CastleNode, ClusterEnv, ReadinessPolicy};
use castle::types::Role;

use crate::fake_uplink::{FakeUplink, UplinkJournal};

/// Builder for a `CastleCluster` of [`FakeUplink`] nodes sharing one
/// journal.
///
/// Readiness polling defaults to 3 attempts, 10ms apart, so failing probes
/// don't slow tests down.
pub struct ClusterBuilder {
    nodes: Vec<(String, Vec<Role>)>,
    scripts: Vec<(String, String, Vec<i32>)>,
    env: ClusterEnv,
    journal: Arc<UplinkJournal>,
}

impl ClusterBuilder {
    pub fn new(working_directory: impl Into<PathBuf>) -> Self {
        let mut env = ClusterEnv::new(working_directory);
        env.readiness = ReadinessPolicy {
            attempts: 3,
            poll_interval: Duration::from_millis(10),
        };
        Self {
            nodes: Vec::new(),
            scripts: Vec::new(),
            env,
            journal: UplinkJournal::new(),
        }
    }

    pub fn with_node(mut self, name: &str, roles: &[Role]) -> Self {
        self.nodes.push((name.to_string(), roles.to_vec()));
        self
    }

    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.env.variables.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_start_stagger(mut self, stagger: Duration) -> Self {
        self.env.start_stagger = stagger;
        self
    }

    pub fn with_readiness(mut self, attempts: u32, poll_interval: Duration) -> Self {
        self.env.readiness = ReadinessPolicy {
            attempts,
            poll_interval,
        };
        self
    }

    /// Script return codes for commands on `node` containing `pattern`.
    pub fn respond(mut self, node: &str, pattern: &str, codes: &[i32]) -> Self {
        self.scripts
            .push((node.to_string(), pattern.to_string(), codes.to_vec()));
        self
    }

    pub fn journal(&self) -> Arc<UplinkJournal> {
        Arc::clone(&self.journal)
    }

    /// Nodes are indexed in name order, as a loaded cluster file would be.
    pub fn build(mut self) -> Arc<CastleCluster> {
        self.nodes.sort_by(|a, b| a.0.cmp(&b.0));

        let nodes = self.nodes.iter().enumerate().map(|(index, (name, roles))| {
            let uplink = FakeUplink::new(name.clone(), format!("{name}.internal"), Arc::clone(&self.journal));
            for (node, pattern, codes) in &self.scripts {
                if node == name {
                    uplink.respond(pattern.clone(), codes);
                }
            }
            CastleNode::new(name.clone(), index, roles.iter().copied(), Arc::new(uplink))
        });

        Arc::new(CastleCluster::new(nodes.collect::<Vec<_>>(), self.env))
    }
}
