// src/action/stop.rs

use crate::action::daemon::DaemonType;
use crate::action::{Action, ActionId, ActionSpec};
use crate::cluster::{CastleCluster, CastleNode};
use crate::command::kill_java_process;
use crate::errors::Result;
use crate::types::BoxFuture;

/// Kill a daemon on one node. Succeeds when nothing was running.
#[derive(Debug)]
pub struct DaemonStopAction {
    spec: ActionSpec,
    daemon: DaemonType,
}

impl DaemonStopAction {
    pub fn new(daemon: DaemonType, node: &str) -> Self {
        Self {
            spec: ActionSpec::new(ActionId::new(daemon.stop_type(), node)).requires(daemon.role()),
            daemon,
        }
    }
}

impl Action for DaemonStopAction {
    fn spec(&self) -> &ActionSpec {
        &self.spec
    }

    fn call<'a>(&'a self, _cluster: &'a CastleCluster, node: &'a CastleNode) -> BoxFuture<'a, Result<()>> {
        Box::pin(kill_java_process(node, self.daemon.class_name(), false))
    }
}
