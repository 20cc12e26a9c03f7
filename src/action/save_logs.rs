// src/action/save_logs.rs

use tracing::{info, warn};

use crate::action::daemon::DaemonType;
use crate::action::{Action, ActionId, ActionSpec};
use crate::cluster::{CastleCluster, CastleNode};
use crate::errors::Result;
use crate::types::BoxFuture;

pub const SAVE_LOGS_TYPE: &str = "saveLogs";

/// Copy each hosted daemon's log directory into
/// `<working_directory>/logs/<node>/<daemon>`.
///
/// A daemon that never ran has no log directory; that copy is skipped with a
/// warning rather than failing the action.
#[derive(Debug)]
pub struct SaveLogsAction {
    spec: ActionSpec,
}

impl SaveLogsAction {
    pub fn new(node: &str) -> Self {
        Self {
            spec: ActionSpec::new(ActionId::new(SAVE_LOGS_TYPE, node)),
        }
    }

    async fn save(&self, cluster: &CastleCluster, node: &CastleNode) -> Result<()> {
        let daemons = DaemonType::ALL
            .into_iter()
            .filter(|daemon| node.has_role(daemon.role()));

        for daemon in daemons {
            let local = cluster
                .env()
                .working_directory()
                .join("logs")
                .join(node.name())
                .join(daemon.name());
            tokio::fs::create_dir_all(&local).await?;

            let code = node.command().sync_from(daemon.log_dir(), &local).run().await?;
            if code == 0 {
                info!(node = %node.name(), daemon = daemon.name(), dest = %local.display(), "saved logs");
            } else {
                warn!(node = %node.name(), daemon = daemon.name(), code, "could not copy logs");
            }
        }
        Ok(())
    }
}

impl Action for SaveLogsAction {
    fn spec(&self) -> &ActionSpec {
        &self.spec
    }

    fn call<'a>(&'a self, cluster: &'a CastleCluster, node: &'a CastleNode) -> BoxFuture<'a, Result<()>> {
        Box::pin(self.save(cluster, node))
    }
}
