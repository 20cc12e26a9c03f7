// src/action/status.rs

use tracing::info;

use crate::action::daemon::DaemonType;
use crate::action::{Action, ActionId, ActionSpec};
use crate::cluster::{CastleCluster, CastleNode};
use crate::command::get_java_process_status;
use crate::errors::Result;
use crate::types::BoxFuture;

/// Probe a daemon and fold the result into the cluster status register.
///
/// A stopped daemon is not an action failure: the action succeeds and the
/// probe's non-zero code becomes the run's exit code.
#[derive(Debug)]
pub struct DaemonStatusAction {
    spec: ActionSpec,
    daemon: DaemonType,
}

impl DaemonStatusAction {
    pub fn new(daemon: DaemonType, node: &str) -> Self {
        Self {
            spec: ActionSpec::new(ActionId::new(daemon.status_type(), node)).requires(daemon.role()),
            daemon,
        }
    }

    async fn status(&self, cluster: &CastleCluster, node: &CastleNode) -> Result<()> {
        let code = get_java_process_status(node, self.daemon.class_name()).await?;
        if code == 0 {
            info!(node = %node.name(), daemon = self.daemon.name(), "running");
        } else {
            info!(node = %node.name(), daemon = self.daemon.name(), code, "not running");
        }
        cluster.status().change_return_code(code);
        Ok(())
    }
}

impl Action for DaemonStatusAction {
    fn spec(&self) -> &ActionSpec {
        &self.spec
    }

    fn call<'a>(&'a self, cluster: &'a CastleCluster, node: &'a CastleNode) -> BoxFuture<'a, Result<()>> {
        Box::pin(self.status(cluster, node))
    }
}
