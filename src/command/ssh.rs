// src/command/ssh.rs

use std::path::PathBuf;

use crate::command::process::run_logged;
use crate::command::request::{split_out_of_band, CommandRequest};
use crate::command::uplink::Uplink;
use crate::errors::Result;
use crate::types::BoxFuture;

/// Uplink reaching a node over `ssh`, with `rsync` for transfers.
#[derive(Debug, Clone)]
pub struct SshUplink {
    host: String,
    user: Option<String>,
    port: Option<u16>,
    identity_file: Option<PathBuf>,
    internal_dns: String,
}

impl SshUplink {
    pub fn new(host: impl Into<String>) -> Self {
        let host = host.into();
        Self {
            internal_dns: host.clone(),
            host,
            user: None,
            port: None,
            identity_file: None,
        }
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_identity_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.identity_file = Some(path.into());
        self
    }

    pub fn with_internal_dns(mut self, internal_dns: impl Into<String>) -> Self {
        self.internal_dns = internal_dns.into();
        self
    }

    fn destination(&self) -> String {
        match &self.user {
            Some(user) => format!("{user}@{}", self.host),
            None => self.host.clone(),
        }
    }

    fn ssh_options(&self) -> Vec<String> {
        let mut opts = vec![
            "-o".to_string(),
            "StrictHostKeyChecking=no".to_string(),
            "-o".to_string(),
            "BatchMode=yes".to_string(),
        ];
        if let Some(port) = self.port {
            opts.push("-p".to_string());
            opts.push(port.to_string());
        }
        if let Some(identity) = &self.identity_file {
            opts.push("-i".to_string());
            opts.push(identity.display().to_string());
        }
        opts
    }

    /// `ssh` invocation handed to rsync's `-e`.
    fn rsync_shell(&self) -> String {
        let mut parts = vec!["ssh".to_string()];
        parts.extend(self.ssh_options());
        shell_words::join(parts)
    }

    /// The argv this uplink spawns for `request`.
    pub fn local_argv(&self, request: &CommandRequest) -> Vec<String> {
        match request {
            CommandRequest::Exec { args } => {
                let (oob, remote) = split_out_of_band(args);
                let mut argv = vec!["ssh".to_string()];
                argv.extend(self.ssh_options());
                argv.extend(oob.iter().cloned());
                argv.push(self.destination());
                argv.extend(remote.iter().cloned());
                argv
            }
            CommandRequest::SyncTo { local, remote } => vec![
                "rsync".to_string(),
                "-aq".to_string(),
                "-e".to_string(),
                self.rsync_shell(),
                local.display().to_string(),
                format!("{}:{}", self.destination(), remote),
            ],
            CommandRequest::SyncFrom { remote, local } => vec![
                "rsync".to_string(),
                "-aq".to_string(),
                "-e".to_string(),
                self.rsync_shell(),
                format!("{}:{}/", self.destination(), remote.trim_end_matches('/')),
                format!("{}/", local.display()),
            ],
        }
    }
}

impl Uplink for SshUplink {
    fn internal_dns(&self) -> &str {
        &self.internal_dns
    }

    fn execute<'a>(&'a self, request: &'a CommandRequest) -> BoxFuture<'a, Result<i32>> {
        Box::pin(async move { run_logged(&self.local_argv(request)).await })
    }
}
