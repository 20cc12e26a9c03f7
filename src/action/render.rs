// src/action/render.rs

//! Per-node configuration files, rendered through the template engine.
//!
//! Templates name cluster facts as `%{...}` keys (`node.<name>.hostname`,
//! `daemon.log_path`, ...); a missing key fails the render before anything
//! touches the node.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use crate::action::daemon::{
    DaemonType, TROGDOR_AGENT_PORT, TROGDOR_COORDINATOR_PORT, ZOOKEEPER_ELECTION_PORT,
    ZOOKEEPER_PEER_PORT,
};
use crate::cluster::{CastleCluster, CastleNode};
use crate::errors::{CastleError, Result};
use crate::template::{MapSubstituter, transform, transform_string};
use crate::types::Role;

pub const TROGDOR_PLATFORM: &str = "org.apache.kafka.trogdor.basic.BasicPlatform";

const ZOOKEEPER_PROPERTIES_TEMPLATE: &str = "\
dataDir=%{daemon.data_dir}
clientPort=%{daemon.port}
maxClientCnxns=0
tickTime=2000
initLimit=10
syncLimit=5
";

const LOG4J_TEMPLATE: &str = "\
log4j.rootLogger=WARN, kafkaAppender

log4j.appender.kafkaAppender=org.apache.log4j.DailyRollingFileAppender
log4j.appender.kafkaAppender.DatePattern='.'yyyy-MM-dd-HH
log4j.appender.kafkaAppender.File=%{daemon.log_path}
log4j.appender.kafkaAppender.layout=org.apache.log4j.PatternLayout
log4j.appender.kafkaAppender.layout.ConversionPattern=[%d] %p %m (%c)%n

log4j.logger.%{daemon.log_namespace}=%{daemon.log_level}
";

/// A locally written file that is removed when the guard is dropped.
///
/// Removal happens on every exit path of the owning scope, including `?`
/// and panics; failures to remove are logged, never raised.
#[derive(Debug)]
pub struct RenderedFile {
    path: PathBuf,
}

impl RenderedFile {
    pub fn create(path: impl Into<PathBuf>, contents: &str) -> Result<Self> {
        let path = path.into();
        std::fs::write(&path, contents)?;
        debug!(path = %path.display(), bytes = contents.len(), "wrote rendered file");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RenderedFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "removed rendered file"),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => warn!(
                path = %self.path.display(),
                error = %err,
                "failed to remove rendered file"
            ),
        }
    }
}

/// Cluster substitutions plus the `daemon.*` keys for `daemon`.
fn daemon_substitutions(cluster: &CastleCluster, daemon: DaemonType) -> MapSubstituter {
    let mut subst = cluster.substitutions();
    subst.insert("daemon.name", daemon.name());
    subst.insert("daemon.data_dir", daemon.data_dir());
    subst.insert("daemon.log_dir", daemon.log_dir());
    subst.insert("daemon.log_path", daemon.log_path());
    subst.insert("daemon.port", daemon.port().to_string());
    let (namespace, level) = daemon.log_override();
    subst.insert("daemon.log_namespace", namespace);
    subst.insert("daemon.log_level", level);
    subst
}

/// The trogdor platform document shared by every agent and coordinator.
///
/// Lists only nodes holding a trogdor role; each entry carries `hostname`
/// and one port field per trogdor role the node holds.
pub fn trogdor_platform_config(cluster: &CastleCluster) -> Result<String> {
    let mut nodes = Map::new();
    for node in cluster.nodes() {
        let is_agent = node.has_role(Role::TrogdorAgent);
        let is_coordinator = node.has_role(Role::TrogdorCoordinator);
        if !is_agent && !is_coordinator {
            continue;
        }

        let mut entry = Map::new();
        entry.insert(
            "hostname".to_string(),
            Value::String(format!("%{{node.{}.hostname}}", node.name())),
        );
        if is_agent {
            entry.insert("trogdor.agent.port".to_string(), json!(TROGDOR_AGENT_PORT));
        }
        if is_coordinator {
            entry.insert(
                "trogdor.coordinator.port".to_string(),
                json!(TROGDOR_COORDINATOR_PORT),
            );
        }
        nodes.insert(node.name().to_string(), Value::Object(entry));
    }

    let skeleton = json!({
        "platform": TROGDOR_PLATFORM,
        "nodes": nodes,
    });

    let rendered = transform(&skeleton, &cluster.substitutions())?;
    Ok(serde_json::to_string_pretty(&rendered)?)
}

/// ZooKeeper server id of `node`: its 1-based position among the cluster's
/// ZooKeeper nodes.
pub fn zookeeper_id(cluster: &CastleCluster, node: &CastleNode) -> Option<usize> {
    cluster
        .nodes_with_role(Role::ZooKeeper)
        .position(|zk| zk.name() == node.name())
        .map(|position| position + 1)
}

/// Contents of the `myid` file for `node`.
pub fn zookeeper_myid(cluster: &CastleCluster, node: &CastleNode) -> Result<String> {
    zookeeper_id(cluster, node)
        .map(|id| format!("{id}\n"))
        .ok_or_else(|| CastleError::ConfigError(format!("node {} has no zooKeeper role", node.name())))
}

/// The ZooKeeper properties shared by every ensemble member, with one
/// `server.<id>` line per ZooKeeper node.
fn zookeeper_properties(cluster: &CastleCluster) -> Result<String> {
    let mut template = ZOOKEEPER_PROPERTIES_TEMPLATE.to_string();
    for (position, zk) in cluster.nodes_with_role(Role::ZooKeeper).enumerate() {
        template.push_str(&format!(
            "server.{}=%{{node.{}.hostname}}:{ZOOKEEPER_PEER_PORT}:{ZOOKEEPER_ELECTION_PORT}\n",
            position + 1,
            zk.name()
        ));
    }
    transform_string(&template, &daemon_substitutions(cluster, DaemonType::ZooKeeper))
}

/// The main configuration file for `daemon`.
pub fn daemon_config(daemon: DaemonType, cluster: &CastleCluster) -> Result<String> {
    match daemon {
        DaemonType::ZooKeeper => zookeeper_properties(cluster),
        DaemonType::TrogdorAgent | DaemonType::TrogdorCoordinator => trogdor_platform_config(cluster),
    }
}

pub fn log4j_properties(daemon: DaemonType, cluster: &CastleCluster) -> Result<String> {
    transform_string(LOG4J_TEMPLATE, &daemon_substitutions(cluster, daemon))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::cluster::ClusterEnv;
    use crate::command::LocalUplink;

    fn node(name: &str, index: usize, dns: &str, roles: &[Role]) -> CastleNode {
        CastleNode::new(name, index, roles.iter().copied(), Arc::new(LocalUplink::new(dns)))
    }

    fn cluster() -> CastleCluster {
        CastleCluster::new(
            [
                node("agent0", 0, "10.0.0.2", &[Role::TrogdorAgent]),
                node("both0", 1, "10.0.0.3", &[Role::TrogdorAgent, Role::TrogdorCoordinator]),
                node("zk0", 2, "10.0.0.1", &[Role::ZooKeeper]),
            ],
            ClusterEnv::new("/tmp"),
        )
    }

    #[test]
    fn trogdor_config_lists_only_trogdor_nodes_with_their_ports() {
        let text = trogdor_platform_config(&cluster()).unwrap();
        let doc: Value = serde_json::from_str(&text).unwrap();

        assert_eq!(doc["platform"], TROGDOR_PLATFORM);
        let nodes = doc["nodes"].as_object().unwrap();
        assert_eq!(nodes.len(), 2);
        assert!(!nodes.contains_key("zk0"));

        assert_eq!(nodes["agent0"]["hostname"], "10.0.0.2");
        assert_eq!(nodes["agent0"]["trogdor.agent.port"], 8888);
        assert!(nodes["agent0"].get("trogdor.coordinator.port").is_none());

        assert_eq!(nodes["both0"]["trogdor.agent.port"], 8888);
        assert_eq!(nodes["both0"]["trogdor.coordinator.port"], 8889);
    }

    #[test]
    fn log4j_points_at_the_daemon_log() {
        let text = log4j_properties(DaemonType::TrogdorAgent, &cluster()).unwrap();
        assert!(text.contains("File=/mnt/trogdor-agent/logs/agent.log"));
        assert!(text.contains("ConversionPattern=[%d] %p %m (%c)%n"));
    }

    #[test]
    fn log4j_has_a_single_logger_override_per_daemon() {
        let overrides = |daemon| -> Vec<String> {
            log4j_properties(daemon, &cluster())
                .unwrap()
                .lines()
                .filter(|l| l.starts_with("log4j.logger."))
                .map(str::to_string)
                .collect()
        };
        assert_eq!(overrides(DaemonType::TrogdorAgent), vec!["log4j.logger.org.apache.kafka=DEBUG"]);
        assert_eq!(overrides(DaemonType::ZooKeeper), vec!["log4j.logger.org.apache.zookeeper=INFO"]);
    }

    #[test]
    fn zookeeper_properties_carry_data_dir_and_port() {
        let text = daemon_config(DaemonType::ZooKeeper, &cluster()).unwrap();
        assert!(text.contains("dataDir=/mnt/zookeeper/data"));
        assert!(text.contains("clientPort=2181"));
        assert!(text.contains("initLimit=10"));
        assert!(text.contains("syncLimit=5"));
        assert!(text.contains("server.1=10.0.0.1:2888:3888"));
        assert!(!text.contains("server.2="));
    }

    #[test]
    fn zookeeper_ids_follow_zookeeper_nodes_only() {
        let cluster = CastleCluster::new(
            [
                node("agent0", 0, "10.0.0.2", &[Role::TrogdorAgent]),
                node("zk0", 1, "10.0.0.1", &[Role::ZooKeeper]),
                node("zk1", 2, "10.0.0.4", &[Role::ZooKeeper]),
            ],
            ClusterEnv::new("/tmp"),
        );
        let zk1 = cluster.node("zk1").unwrap();
        assert_eq!(zookeeper_id(&cluster, zk1), Some(2));
        assert_eq!(zookeeper_myid(&cluster, zk1).unwrap(), "2\n");
        assert!(zookeeper_myid(&cluster, cluster.node("agent0").unwrap()).is_err());

        let text = daemon_config(DaemonType::ZooKeeper, &cluster).unwrap();
        assert!(text.contains("server.1=10.0.0.1:2888:3888\nserver.2=10.0.0.4:2888:3888\n"));
    }

    #[test]
    fn rendered_file_is_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.conf");
        {
            let file = RenderedFile::create(&path, "a=b\n").unwrap();
            assert_eq!(std::fs::read_to_string(file.path()).unwrap(), "a=b\n");
        }
        assert!(!path.exists());
    }
}
