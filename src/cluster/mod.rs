// src/cluster/mod.rs

//! The cluster a run operates on.
//!
//! - [`node`] holds `CastleNode`, one remote endpoint with its roles and
//!   uplink.
//! - [`status`] holds the aggregate status register, the only state actions
//!   share and mutate.
//!
//! `CastleCluster` itself is read-only after construction and is shared by
//! reference (`Arc`) across every running action.

pub mod node;
pub mod status;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::action::Action;
use crate::command::{LocalUplink, SshUplink, Uplink};
use crate::config::{ClusterFile, NodeConfig, UplinkConfig};
use crate::errors::{CastleError, Result};
use crate::template::MapSubstituter;
use crate::types::Role;

pub use node::CastleNode;
pub use status::StatusRegister;

/// Bounded polling used to confirm a started daemon is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessPolicy {
    pub attempts: u32,
    pub poll_interval: Duration,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            attempts: 10,
            poll_interval: Duration::from_secs(3),
        }
    }
}

/// Run environment: where local files go and which variables exist.
#[derive(Debug, Clone)]
pub struct ClusterEnv {
    pub working_directory: PathBuf,
    pub variables: BTreeMap<String, String>,
    pub readiness: ReadinessPolicy,
    pub start_stagger: Duration,
    pub max_concurrency: Option<usize>,
}

impl ClusterEnv {
    pub fn new(working_directory: impl Into<PathBuf>) -> Self {
        Self {
            working_directory: working_directory.into(),
            variables: BTreeMap::new(),
            readiness: ReadinessPolicy::default(),
            start_stagger: Duration::ZERO,
            max_concurrency: None,
        }
    }

    pub fn working_directory(&self) -> &Path {
        &self.working_directory
    }
}

#[derive(Debug)]
pub struct CastleCluster {
    nodes: BTreeMap<String, CastleNode>,
    env: ClusterEnv,
    status: StatusRegister,
}

impl CastleCluster {
    pub fn new(nodes: impl IntoIterator<Item = CastleNode>, env: ClusterEnv) -> Self {
        Self {
            nodes: nodes
                .into_iter()
                .map(|node| (node.name().to_string(), node))
                .collect(),
            env,
            status: StatusRegister::new(),
        }
    }

    /// Build the cluster described by a validated cluster file.
    ///
    /// `root_dir` anchors a relative `working_directory`, which is created
    /// if missing.
    pub fn from_config(cfg: &ClusterFile, root_dir: &Path) -> Result<Self> {
        let working_directory = root_dir.join(&cfg.cluster.working_directory);
        std::fs::create_dir_all(&working_directory)?;

        let env = ClusterEnv {
            working_directory,
            variables: cfg.env.clone(),
            readiness: ReadinessPolicy {
                attempts: cfg.cluster.readiness_attempts,
                poll_interval: Duration::from_millis(cfg.cluster.readiness_poll_ms),
            },
            start_stagger: Duration::from_millis(cfg.cluster.start_stagger_ms),
            max_concurrency: cfg.cluster.max_concurrency,
        };

        let nodes = cfg
            .node
            .iter()
            .enumerate()
            .map(|(index, (name, node_cfg))| {
                CastleNode::new(name.clone(), index, node_cfg.roles.iter().copied(), build_uplink(node_cfg))
            });

        let cluster = Self::new(nodes, env);
        debug!(nodes = cluster.nodes.len(), "cluster constructed");
        Ok(cluster)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &CastleNode> {
        self.nodes.values()
    }

    pub fn node(&self, name: &str) -> Option<&CastleNode> {
        self.nodes.get(name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes_with_role(&self, role: Role) -> impl Iterator<Item = &CastleNode> {
        self.nodes.values().filter(move |node| node.has_role(role))
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.nodes_with_role(role).next().is_some()
    }

    pub fn env(&self) -> &ClusterEnv {
        &self.env
    }

    pub fn status(&self) -> &StatusRegister {
        &self.status
    }

    /// Variables available to configuration templates.
    ///
    /// Everything from the environment, plus `node.<name>.hostname` and
    /// `node.<name>.index` for every node.
    pub fn substitutions(&self) -> MapSubstituter {
        let mut subst = MapSubstituter::new(self.env.variables.clone());
        for node in self.nodes.values() {
            subst.insert(format!("node.{}.hostname", node.name()), node.internal_dns());
            subst.insert(format!("node.{}.index", node.name()), node.index().to_string());
        }
        subst
    }

    /// Check that every action's scope names a node holding the roles the
    /// action requires.
    pub fn check_placement<'a>(
        &self,
        actions: impl IntoIterator<Item = &'a Arc<dyn Action>>,
    ) -> Result<()> {
        for action in actions {
            let id = action.id();
            let node = self.node(id.scope()).ok_or_else(|| {
                CastleError::ConfigError(format!(
                    "action '{id}' targets '{}', which is not a node of this cluster",
                    id.scope()
                ))
            })?;

            if let Some(missing) = action
                .spec()
                .required_roles()
                .iter()
                .find(|role| !node.has_role(**role))
            {
                return Err(CastleError::ConfigError(format!(
                    "action '{id}' requires role '{missing}', which node '{}' does not have",
                    node.name()
                )));
            }
        }
        Ok(())
    }
}

fn build_uplink(cfg: &NodeConfig) -> Arc<dyn Uplink> {
    match &cfg.uplink {
        UplinkConfig::Local => {
            let dns = cfg.internal_dns.clone().unwrap_or_else(|| "localhost".to_string());
            Arc::new(LocalUplink::new(dns))
        }
        UplinkConfig::Ssh {
            host,
            user,
            port,
            identity_file,
        } => {
            let mut uplink = SshUplink::new(host.clone());
            if let Some(user) = user {
                uplink = uplink.with_user(user.clone());
            }
            if let Some(port) = port {
                uplink = uplink.with_port(*port);
            }
            if let Some(identity) = identity_file {
                uplink = uplink.with_identity_file(identity.clone());
            }
            if let Some(dns) = &cfg.internal_dns {
                uplink = uplink.with_internal_dns(dns.clone());
            }
            Arc::new(uplink)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::config::parse_str;

    fn cluster_from(text: &str) -> CastleCluster {
        let dir = tempfile::tempdir().unwrap();
        let cfg = ClusterFile::try_from(parse_str(text, &BTreeMap::new()).unwrap()).unwrap();
        CastleCluster::from_config(&cfg, dir.path()).unwrap()
    }

    #[test]
    fn nodes_are_indexed_in_name_order() {
        let cluster = cluster_from(
            r#"
[node.b]
roles = ["trogdorAgent"]
uplink = { type = "local" }

[node.a]
roles = ["zooKeeper"]
internal_dns = "10.0.0.1"
uplink = { type = "ssh", host = "a.example.com" }
"#,
        );

        let names: Vec<_> = cluster.nodes().map(|n| (n.name(), n.index())).collect();
        assert_eq!(names, vec![("a", 0), ("b", 1)]);
        assert_eq!(cluster.node("a").unwrap().internal_dns(), "10.0.0.1");
        assert_eq!(cluster.node("b").unwrap().internal_dns(), "localhost");
        assert!(cluster.has_role(Role::ZooKeeper));
        assert!(!cluster.has_role(Role::TrogdorCoordinator));
    }

    #[test]
    fn substitutions_include_node_hostnames_and_env() {
        let cluster = cluster_from(
            r#"
[env]
kafka = "/opt/kafka"

[node.a]
internal_dns = "10.0.0.1"
uplink = { type = "local" }
"#,
        );
        let subst = cluster.substitutions();
        assert_eq!(subst.get("node.a.hostname"), Some("10.0.0.1"));
        assert_eq!(subst.get("node.a.index"), Some("0"));
        assert_eq!(subst.get("kafka"), Some("/opt/kafka"));
    }
}
