// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::types::Role;

/// Cluster file as deserialized, before validation.
///
/// ```toml
/// [cluster]
/// working_directory = ".castle"
/// readiness_attempts = 10
///
/// [env]
/// user = "ubuntu"
///
/// [node.zk0]
/// roles = ["zooKeeper"]
/// uplink = { type = "ssh", host = "zk0.example.com", user = "%{user}" }
/// ```
///
/// All sections except `[node.*]` are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct RawClusterFile {
    /// Run-wide policy from `[cluster]`.
    #[serde(default)]
    pub cluster: ClusterSection,

    /// Cluster-wide variables from `[env]` (plus CLI overrides).
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    /// All nodes from `[node.<name>]`, keyed by node name.
    #[serde(default)]
    pub node: BTreeMap<String, NodeConfig>,
}

/// Validated cluster file. Build one with `ClusterFile::try_from(raw)`.
#[derive(Debug, Clone)]
pub struct ClusterFile {
    pub cluster: ClusterSection,
    pub env: BTreeMap<String, String>,
    pub node: BTreeMap<String, NodeConfig>,
}

impl ClusterFile {
    pub(crate) fn new_unchecked(
        cluster: ClusterSection,
        env: BTreeMap<String, String>,
        node: BTreeMap<String, NodeConfig>,
    ) -> Self {
        Self { cluster, env, node }
    }
}

/// `[cluster]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ClusterSection {
    /// Local directory for rendered files and collected logs.
    ///
    /// Relative paths are resolved against the cluster file's directory.
    #[serde(default = "default_working_directory")]
    pub working_directory: PathBuf,

    /// Upper bound on concurrently running actions; defaults to the node count.
    #[serde(default)]
    pub max_concurrency: Option<usize>,

    /// How many times a freshly started daemon is probed for liveness.
    #[serde(default = "default_readiness_attempts")]
    pub readiness_attempts: u32,

    /// Delay between liveness probes, in milliseconds.
    #[serde(default = "default_readiness_poll_ms")]
    pub readiness_poll_ms: u64,

    /// Start actions on node N are delayed by `N * start_stagger_ms`.
    #[serde(default)]
    pub start_stagger_ms: u64,
}

fn default_working_directory() -> PathBuf {
    PathBuf::from(".castle")
}

fn default_readiness_attempts() -> u32 {
    10
}

fn default_readiness_poll_ms() -> u64 {
    3000
}

impl Default for ClusterSection {
    fn default() -> Self {
        Self {
            working_directory: default_working_directory(),
            max_concurrency: None,
            readiness_attempts: default_readiness_attempts(),
            readiness_poll_ms: default_readiness_poll_ms(),
            start_stagger_ms: 0,
        }
    }
}

/// `[node.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeConfig {
    /// Capability tags; decide which actions exist for this node.
    #[serde(default)]
    pub roles: Vec<Role>,

    /// Address other nodes use to reach this one. Defaults to the uplink's
    /// host (`localhost` for local uplinks).
    #[serde(default)]
    pub internal_dns: Option<String>,

    pub uplink: UplinkConfig,
}

/// How the controller reaches a node.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum UplinkConfig {
    Local,
    Ssh {
        host: String,
        #[serde(default)]
        user: Option<String>,
        #[serde(default)]
        port: Option<u16>,
        #[serde(default)]
        identity_file: Option<PathBuf>,
    },
}
