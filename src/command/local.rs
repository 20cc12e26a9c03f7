// src/command/local.rs

use crate::command::process::run_logged;
use crate::command::request::{split_out_of_band, CommandRequest};
use crate::command::uplink::Uplink;
use crate::errors::Result;
use crate::types::BoxFuture;

/// Uplink for a node that is the controller's own host.
///
/// Command lines are joined with spaces and handed to `sh -c`, the same way
/// a remote login shell would see them, so operators such as `&&`, `>` and
/// `&` keep working. Transfers use `cp`.
#[derive(Debug, Clone)]
pub struct LocalUplink {
    internal_dns: String,
}

impl LocalUplink {
    pub fn new(internal_dns: impl Into<String>) -> Self {
        Self {
            internal_dns: internal_dns.into(),
        }
    }

    /// The argv this uplink spawns for `request`.
    pub fn local_argv(&self, request: &CommandRequest) -> Vec<String> {
        match request {
            CommandRequest::Exec { args } => {
                // Out-of-band options only mean something to a real transport;
                // stdin is always closed locally.
                let (_oob, remote) = split_out_of_band(args);
                vec!["sh".to_string(), "-c".to_string(), remote.join(" ")]
            }
            CommandRequest::SyncTo { local, remote } => vec![
                "cp".to_string(),
                local.display().to_string(),
                remote.clone(),
            ],
            CommandRequest::SyncFrom { remote, local } => vec![
                "cp".to_string(),
                "-R".to_string(),
                format!("{}/.", remote.trim_end_matches('/')),
                local.display().to_string(),
            ],
        }
    }
}

impl Default for LocalUplink {
    fn default() -> Self {
        Self::new("localhost")
    }
}

impl Uplink for LocalUplink {
    fn internal_dns(&self) -> &str {
        &self.internal_dns
    }

    fn execute<'a>(&'a self, request: &'a CommandRequest) -> BoxFuture<'a, Result<i32>> {
        Box::pin(async move { run_logged(&self.local_argv(request)).await })
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn exec_drops_out_of_band_options_and_joins_for_the_shell() {
        let uplink = LocalUplink::default();
        let req = CommandRequest::Exec {
            args: ["-n", "--", "echo", "a", "&&", "echo", "b"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        };
        assert_eq!(uplink.local_argv(&req), vec!["sh", "-c", "echo a && echo b"]);
    }

    #[test]
    fn sync_from_copies_directory_contents() {
        let uplink = LocalUplink::default();
        let req = CommandRequest::SyncFrom {
            remote: "/mnt/zookeeper/logs/".to_string(),
            local: PathBuf::from("/tmp/out"),
        };
        assert_eq!(
            uplink.local_argv(&req),
            vec!["cp", "-R", "/mnt/zookeeper/logs/.", "/tmp/out"]
        );
    }
}
