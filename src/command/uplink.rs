// src/command/uplink.rs

//! Transport seam and the executable request objects built on it.

use std::fmt;
use std::path::Path;

use tracing::debug;

use crate::command::request::CommandRequest;
use crate::command::result::{join_args, CommandResultError};
use crate::errors::Result;
use crate::types::BoxFuture;

/// Opaque remote-execution capability attached to a node.
///
/// Implementations must report the remote exit status faithfully and must
/// honour out-of-band options (see [`split_out_of_band`]) so detached
/// launches work.
///
/// [`split_out_of_band`]: crate::command::request::split_out_of_band
pub trait Uplink: Send + Sync + fmt::Debug {
    /// Address other nodes use to reach this one.
    fn internal_dns(&self) -> &str;

    /// Perform `request`, returning the exit status.
    ///
    /// Only transport-level problems (e.g. the local helper binary cannot be
    /// spawned) are errors; a non-zero status is a normal return value.
    fn execute<'a>(&'a self, request: &'a CommandRequest) -> BoxFuture<'a, Result<i32>>;
}

/// Entry point returned by `CastleNode::command()`.
#[derive(Clone, Copy)]
pub struct CommandBuilder<'a> {
    uplink: &'a dyn Uplink,
}

impl<'a> CommandBuilder<'a> {
    pub fn new(uplink: &'a dyn Uplink) -> Self {
        Self { uplink }
    }

    /// Run a command line on the node.
    pub fn args<I, S>(self, args: I) -> RemoteCommand<'a>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.request(CommandRequest::Exec {
            args: args.into_iter().map(Into::into).collect(),
        })
    }

    /// Copy a local file to `remote`, overwriting whatever is there.
    pub fn sync_to(self, local: impl AsRef<Path>, remote: impl Into<String>) -> RemoteCommand<'a> {
        self.request(CommandRequest::SyncTo {
            local: local.as_ref().to_path_buf(),
            remote: remote.into(),
        })
    }

    /// Copy the contents of remote directory `remote` into `local`.
    pub fn sync_from(self, remote: impl Into<String>, local: impl AsRef<Path>) -> RemoteCommand<'a> {
        self.request(CommandRequest::SyncFrom {
            remote: remote.into(),
            local: local.as_ref().to_path_buf(),
        })
    }

    pub fn request(self, request: CommandRequest) -> RemoteCommand<'a> {
        RemoteCommand {
            uplink: self.uplink,
            request,
        }
    }
}

/// A request bound to an uplink, ready to run.
///
/// File transfers and command lines share this type so call sites treat
/// them identically.
pub struct RemoteCommand<'a> {
    uplink: &'a dyn Uplink,
    request: CommandRequest,
}

impl RemoteCommand<'_> {
    pub fn request(&self) -> &CommandRequest {
        &self.request
    }

    pub fn command_line(&self) -> Vec<String> {
        self.request.command_line()
    }

    /// Run and return the exit status; never fails on non-zero.
    pub async fn run(&self) -> Result<i32> {
        debug!(cmd = %join_args(&self.command_line()), "running command");
        let code = self.uplink.execute(&self.request).await?;
        debug!(cmd = %join_args(&self.command_line()), code, "command finished");
        Ok(code)
    }

    /// Run and fail with [`CommandResultError`] on a non-zero exit status.
    pub async fn must_run(&self) -> Result<()> {
        let code = self.run().await?;
        if code != 0 {
            return Err(CommandResultError::new(self.command_line(), code).into());
        }
        Ok(())
    }
}

impl fmt::Debug for RemoteCommand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteCommand")
            .field("uplink", &self.uplink)
            .field("request", &self.request)
            .finish()
    }
}
