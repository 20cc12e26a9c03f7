// src/action/start.rs

use std::time::Duration;

use tracing::info;

use crate::action::daemon::DaemonType;
use crate::action::render::{self, RenderedFile};
use crate::action::{Action, ActionId, ActionSpec, TargetId};
use crate::cluster::{CastleCluster, CastleNode};
use crate::command::{get_java_process_status, kill_java_process, wait_for};
use crate::errors::{CastleError, Result};
use crate::types::BoxFuture;

/// Start (or restart) a daemon on one node.
///
/// Sequence: render configs, kill any previous instance (best effort),
/// reset the conf/log directories, push configs (plus `myid` for ZooKeeper),
/// launch detached, then poll the liveness probe until it reports the
/// process running.
#[derive(Debug)]
pub struct DaemonStartAction {
    spec: ActionSpec,
    daemon: DaemonType,
}

impl DaemonStartAction {
    pub fn new(
        daemon: DaemonType,
        node: &str,
        initial_delay: Duration,
        dependencies: impl IntoIterator<Item = TargetId>,
    ) -> Self {
        let spec = dependencies.into_iter().fold(
            ActionSpec::new(ActionId::new(daemon.start_type(), node))
                .requires(daemon.role())
                .with_initial_delay(initial_delay),
            ActionSpec::after,
        );
        Self { spec, daemon }
    }

    pub fn daemon(&self) -> DaemonType {
        self.daemon
    }

    async fn start(&self, cluster: &CastleCluster, node: &CastleNode) -> Result<()> {
        let daemon = self.daemon;
        let config_text = render::daemon_config(daemon, cluster)?;
        let log4j_text = render::log4j_properties(daemon, cluster)?;
        let myid_text = match daemon {
            DaemonType::ZooKeeper => Some(render::zookeeper_myid(cluster, node)?),
            _ => None,
        };

        {
            let workdir = cluster.env().working_directory();
            let config_file =
                RenderedFile::create(workdir.join(daemon.config_file_name(node.index())), &config_text)?;
            let log4j_file =
                RenderedFile::create(workdir.join(daemon.log4j_file_name(node.index())), &log4j_text)?;
            let myid_file = myid_text
                .map(|text| RenderedFile::create(workdir.join(daemon.myid_file_name(node.index())), &text))
                .transpose()?;

            kill_java_process(node, daemon.class_name(), false).await?;
            node.command()
                .args(daemon.setup_paths_command_line())
                .must_run()
                .await?;
            node.command()
                .sync_to(config_file.path(), daemon.properties_path())
                .must_run()
                .await?;
            node.command()
                .sync_to(log4j_file.path(), daemon.log4j_conf_path())
                .must_run()
                .await?;
            if let Some(myid_file) = &myid_file {
                node.command()
                    .sync_to(myid_file.path(), daemon.myid_path())
                    .must_run()
                    .await?;
            }
            node.command()
                .args(daemon.launch_command_line(node.name()))
                .must_run()
                .await?;
        }

        let readiness = cluster.env().readiness;
        wait_for(readiness.attempts, readiness.poll_interval, move || async move {
            Ok::<_, CastleError>(get_java_process_status(node, daemon.class_name()).await? == 0)
        })
        .await?;

        info!(node = %node.name(), daemon = daemon.name(), "daemon started");
        Ok(())
    }
}

impl Action for DaemonStartAction {
    fn spec(&self) -> &ActionSpec {
        &self.spec
    }

    fn call<'a>(&'a self, cluster: &'a CastleCluster, node: &'a CastleNode) -> BoxFuture<'a, Result<()>> {
        Box::pin(self.start(cluster, node))
    }
}
