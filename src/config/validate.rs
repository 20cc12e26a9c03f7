// src/config/validate.rs

use std::sync::LazyLock;

use regex::Regex;

use crate::config::model::{ClusterFile, RawClusterFile, UplinkConfig};
use crate::errors::{CastleError, Result};

static NODE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("node name pattern is valid")
});

impl TryFrom<RawClusterFile> for ClusterFile {
    type Error = CastleError;

    fn try_from(raw: RawClusterFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ClusterFile::new_unchecked(raw.cluster, raw.env, raw.node))
    }
}

fn validate_raw_config(cfg: &RawClusterFile) -> Result<()> {
    ensure_has_nodes(cfg)?;
    validate_cluster_section(cfg)?;
    validate_nodes(cfg)?;
    Ok(())
}

fn ensure_has_nodes(cfg: &RawClusterFile) -> Result<()> {
    if cfg.node.is_empty() {
        return Err(CastleError::ConfigError(
            "cluster file must contain at least one [node.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_cluster_section(cfg: &RawClusterFile) -> Result<()> {
    if cfg.cluster.max_concurrency == Some(0) {
        return Err(CastleError::ConfigError(
            "[cluster].max_concurrency must be >= 1 (got 0)".to_string(),
        ));
    }

    if cfg.cluster.readiness_attempts == 0 {
        return Err(CastleError::ConfigError(
            "[cluster].readiness_attempts must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(())
}

fn validate_nodes(cfg: &RawClusterFile) -> Result<()> {
    for (name, node) in cfg.node.iter() {
        if !NODE_NAME.is_match(name) {
            return Err(CastleError::ConfigError(format!(
                "invalid node name '{name}': use letters, digits, '.', '_' or '-'"
            )));
        }

        if let UplinkConfig::Ssh { host, .. } = &node.uplink {
            if host.trim().is_empty() {
                return Err(CastleError::ConfigError(format!(
                    "node '{name}' has an ssh uplink with an empty host"
                )));
            }
        }

        if matches!(node.internal_dns.as_deref(), Some(dns) if dns.trim().is_empty()) {
            return Err(CastleError::ConfigError(format!(
                "node '{name}' has an empty internal_dns"
            )));
        }
    }
    Ok(())
}
