// src/command/process.rs

//! Local process spawning shared by the concrete uplinks.

use std::process::Stdio;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::debug;

use crate::command::result::join_args;
use crate::errors::{CastleError, Result};

/// Run `argv` as a local process and return its exit status.
///
/// stdin is closed; stdout and stderr are drained line by line and logged at
/// debug so the child can never block on a full pipe. A child killed by a
/// signal reports `-1`.
pub async fn run_logged(argv: &[String]) -> Result<i32> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| CastleError::ConfigError("empty command line".to_string()))?;

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning process `{}`", join_args(argv)))?;

    if let Some(stdout) = child.stdout.take() {
        drain_lines(stdout, program.clone(), "stdout");
    }
    if let Some(stderr) = child.stderr.take() {
        drain_lines(stderr, program.clone(), "stderr");
    }

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for process `{}`", join_args(argv)))?;

    Ok(status.code().unwrap_or(-1))
}

fn drain_lines<R>(stream: R, program: String, label: &'static str)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(stream).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            debug!(program = %program, "{}: {}", label, line);
        }
    });
}
