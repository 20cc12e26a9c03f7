// src/action/catalog.rs

//! Instantiates every action a cluster's nodes and roles call for.

use std::sync::Arc;

use tracing::debug;

use crate::action::daemon::DaemonType;
use crate::action::init::{INIT_TYPE, InitAction};
use crate::action::save_logs::SaveLogsAction;
use crate::action::start::DaemonStartAction;
use crate::action::status::DaemonStatusAction;
use crate::action::stop::DaemonStopAction;
use crate::action::{Action, TargetId};
use crate::cluster::CastleCluster;
use crate::types::Role;

/// All actions for `cluster`, scoped by node name.
///
/// Per node: `init` and `saveLogs`; per hosted daemon: start, stop and
/// status. Start actions wait for `init:*`, and trogdor starts additionally
/// wait for `zooKeeperStart:*` when the cluster hosts ZooKeeper.
pub fn create_actions(cluster: &CastleCluster) -> Vec<Arc<dyn Action>> {
    let has_zookeeper = cluster.has_role(Role::ZooKeeper);
    let stagger = cluster.env().start_stagger;
    let mut actions: Vec<Arc<dyn Action>> = Vec::new();

    for node in cluster.nodes() {
        actions.push(Arc::new(InitAction::new(node.name())));
        actions.push(Arc::new(SaveLogsAction::new(node.name())));

        for role in node.roles() {
            let daemon = DaemonType::for_role(*role);

            let mut deps = vec![TargetId::all(INIT_TYPE)];
            if daemon != DaemonType::ZooKeeper && has_zookeeper {
                deps.push(TargetId::all(DaemonType::ZooKeeper.start_type()));
            }
            let delay = stagger.saturating_mul(u32::try_from(node.index()).unwrap_or(u32::MAX));

            actions.push(Arc::new(DaemonStartAction::new(daemon, node.name(), delay, deps)));
            actions.push(Arc::new(DaemonStopAction::new(daemon, node.name())));
            actions.push(Arc::new(DaemonStatusAction::new(daemon, node.name())));
        }
    }

    debug!(count = actions.len(), "created actions");
    actions
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::action::ActionId;
    use crate::cluster::{CastleNode, ClusterEnv};
    use crate::command::LocalUplink;

    fn cluster(nodes: &[(&str, &[Role])]) -> CastleCluster {
        let mut env = ClusterEnv::new("/tmp");
        env.start_stagger = Duration::from_millis(100);
        CastleCluster::new(
            nodes.iter().enumerate().map(|(i, (name, roles))| {
                CastleNode::new(*name, i, roles.iter().copied(), Arc::new(LocalUplink::default()))
            }),
            env,
        )
    }

    fn find<'a>(actions: &'a [Arc<dyn Action>], ty: &str, scope: &str) -> &'a Arc<dyn Action> {
        let id = ActionId::new(ty, scope);
        actions.iter().find(|a| *a.id() == id).unwrap()
    }

    #[test]
    fn trogdor_starts_wait_for_zookeeper_when_present() {
        let actions = create_actions(&cluster(&[
            ("agent0", &[Role::TrogdorAgent]),
            ("zk0", &[Role::ZooKeeper]),
        ]));

        let agent = find(&actions, "trogdorAgentStart", "agent0");
        assert_eq!(
            agent.spec().dependencies(),
            &[TargetId::all("init"), TargetId::all("zooKeeperStart")]
        );
        assert_eq!(agent.spec().initial_delay(), Duration::ZERO);

        let zk = find(&actions, "zooKeeperStart", "zk0");
        assert_eq!(zk.spec().dependencies(), &[TargetId::all("init")]);
        assert_eq!(zk.spec().initial_delay(), Duration::from_millis(100));
    }

    #[test]
    fn trogdor_starts_skip_zookeeper_dependency_without_zookeeper() {
        let actions = create_actions(&cluster(&[("a", &[Role::TrogdorCoordinator])]));
        let coord = find(&actions, "trogdorCoordinatorStart", "a");
        assert_eq!(coord.spec().dependencies(), &[TargetId::all("init")]);
    }

    #[test]
    fn every_node_gets_init_and_save_logs() {
        let actions = create_actions(&cluster(&[("a", &[]), ("b", &[Role::ZooKeeper])]));
        assert_eq!(actions.len(), 2 + 2 + 3);
        find(&actions, "init", "a");
        find(&actions, "saveLogs", "b");
        find(&actions, "zooKeeperStatus", "b");
    }
}
