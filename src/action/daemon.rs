// src/action/daemon.rs

//! Static description of each daemon type.
//!
//! Everything here is data: paths are fixed per daemon type so re-running
//! an action always targets the same files.

use crate::types::Role;

pub const ZOOKEEPER_START_SCRIPT: &str = "/opt/kafka/bin/zookeeper-server-start.sh";
pub const TROGDOR_START_SCRIPT: &str = "/opt/kafka/bin/trogdor.sh";

pub const ZOOKEEPER_CLIENT_PORT: u16 = 2181;
pub const ZOOKEEPER_PEER_PORT: u16 = 2888;
pub const ZOOKEEPER_ELECTION_PORT: u16 = 3888;
pub const TROGDOR_AGENT_PORT: u16 = 8888;
pub const TROGDOR_COORDINATOR_PORT: u16 = 8889;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DaemonType {
    ZooKeeper,
    TrogdorAgent,
    TrogdorCoordinator,
}

impl DaemonType {
    pub const ALL: [DaemonType; 3] = [
        DaemonType::ZooKeeper,
        DaemonType::TrogdorAgent,
        DaemonType::TrogdorCoordinator,
    ];

    /// The daemon a role hosts.
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::ZooKeeper => DaemonType::ZooKeeper,
            Role::TrogdorAgent => DaemonType::TrogdorAgent,
            Role::TrogdorCoordinator => DaemonType::TrogdorCoordinator,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            DaemonType::ZooKeeper => Role::ZooKeeper,
            DaemonType::TrogdorAgent => Role::TrogdorAgent,
            DaemonType::TrogdorCoordinator => Role::TrogdorCoordinator,
        }
    }

    /// Short name used in paths and on the launch command line.
    pub fn name(&self) -> &'static str {
        match self {
            DaemonType::ZooKeeper => "zookeeper",
            DaemonType::TrogdorAgent => "agent",
            DaemonType::TrogdorCoordinator => "coordinator",
        }
    }

    pub fn class_name(&self) -> &'static str {
        match self {
            DaemonType::ZooKeeper => "org.apache.zookeeper.server.quorum.QuorumPeerMain",
            DaemonType::TrogdorAgent => "org.apache.kafka.trogdor.agent.Agent",
            DaemonType::TrogdorCoordinator => "org.apache.kafka.trogdor.coordinator.Coordinator",
        }
    }

    pub fn port(&self) -> u16 {
        match self {
            DaemonType::ZooKeeper => ZOOKEEPER_CLIENT_PORT,
            DaemonType::TrogdorAgent => TROGDOR_AGENT_PORT,
            DaemonType::TrogdorCoordinator => TROGDOR_COORDINATOR_PORT,
        }
    }

    /// Logger namespace and level of the one override in the log4j config.
    pub fn log_override(&self) -> (&'static str, &'static str) {
        match self {
            DaemonType::ZooKeeper => ("org.apache.zookeeper", "INFO"),
            _ => ("org.apache.kafka", "DEBUG"),
        }
    }

    pub fn start_type(&self) -> String {
        format!("{}Start", self.role())
    }

    pub fn stop_type(&self) -> String {
        format!("{}Stop", self.role())
    }

    pub fn status_type(&self) -> String {
        format!("{}Status", self.role())
    }

    pub fn root(&self) -> String {
        match self {
            DaemonType::ZooKeeper => "/mnt/zookeeper".to_string(),
            _ => format!("/mnt/trogdor-{}", self.name()),
        }
    }

    pub fn conf_dir(&self) -> String {
        format!("{}/conf", self.root())
    }

    pub fn log_dir(&self) -> String {
        format!("{}/logs", self.root())
    }

    pub fn data_dir(&self) -> String {
        format!("{}/data", self.root())
    }

    pub fn properties_path(&self) -> String {
        match self {
            DaemonType::ZooKeeper => format!("{}/zookeeper.properties", self.conf_dir()),
            _ => format!("{}/trogdor.conf", self.conf_dir()),
        }
    }

    /// ZooKeeper's server id file; only meaningful for [`DaemonType::ZooKeeper`].
    pub fn myid_path(&self) -> String {
        format!("{}/myid", self.data_dir())
    }

    pub fn log4j_conf_path(&self) -> String {
        format!("{}/log4j.properties", self.conf_dir())
    }

    pub fn log_path(&self) -> String {
        format!("{}/{}.log", self.log_dir(), self.name())
    }

    pub fn stdout_path(&self) -> String {
        format!("{}/stdout-stderr.txt", self.log_dir())
    }

    /// Local file name of the rendered main config for node `index`.
    pub fn config_file_name(&self, index: usize) -> String {
        match self {
            DaemonType::ZooKeeper => format!("zookeeper-{index}.properties"),
            _ => format!("trogdor-{}-{index}.conf", self.name()),
        }
    }

    /// Local file name of the rendered log4j config for node `index`.
    pub fn log4j_file_name(&self, index: usize) -> String {
        format!("{}-log4j-{index}.properties", self.name())
    }

    /// Local file name of the rendered ZooKeeper `myid` for node `index`.
    pub fn myid_file_name(&self, index: usize) -> String {
        format!("{}-myid-{index}", self.name())
    }

    /// Destructive reset of the conf and log directories.
    ///
    /// ZooKeeper's data directory is created too, but never wiped.
    pub fn setup_paths_command_line(&self) -> Vec<String> {
        let (conf, logs) = (self.conf_dir(), self.log_dir());
        let mut owned = vec![conf.clone(), logs.clone()];
        if *self == DaemonType::ZooKeeper {
            owned.push(self.data_dir());
        }

        let words = |w: &[&str]| w.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        let mut args = words(&["-n", "--", "sudo", "rm", "-rf"]);
        args.extend([conf, logs]);
        args.extend(words(&["&&", "sudo", "mkdir", "-p"]));
        args.extend(owned.iter().cloned());
        args.extend(words(&["&&", "sudo", "chown", "`whoami`"]));
        args.push(self.root());
        args.extend(owned);
        args
    }

    /// Detached launch: own session via `nohup`, output captured to
    /// [`stdout_path`](Self::stdout_path), stdin closed.
    pub fn launch_command_line(&self, node_name: &str) -> Vec<String> {
        let mut args = vec![
            "-n".to_string(),
            "--".to_string(),
            "nohup".to_string(),
            "env".to_string(),
            format!(
                "KAFKA_LOG4J_OPTS=\"-Dlog4j.configuration=file:{}\"",
                self.log4j_conf_path()
            ),
        ];

        match self {
            DaemonType::ZooKeeper => {
                args.push(ZOOKEEPER_START_SCRIPT.to_string());
                args.push(self.properties_path());
            }
            _ => {
                args.push(TROGDOR_START_SCRIPT.to_string());
                args.push(self.name().to_string());
                args.push(format!("--{}.config", self.name()));
                args.push(self.properties_path());
                args.push("--node-name".to_string());
                args.push(node_name.to_string());
            }
        }

        args.push(format!(">{}", self.stdout_path()));
        args.push("2>&1".to_string());
        args.push("</dev/null".to_string());
        args.push("&".to_string());
        args
    }
}
