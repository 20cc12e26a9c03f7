// src/command/lifecycle.rs

//! Killing and probing JVM daemons by main class name.

use tracing::{info, warn};

use crate::cluster::CastleNode;
use crate::command::result::CommandResultError;
use crate::errors::Result;

/// `pgrep`/`pkill` pattern for `class_name` that cannot match the shell
/// running the probe itself (`[o]rg.apache...`).
fn process_pattern(class_name: &str) -> String {
    let mut chars = class_name.chars();
    match chars.next() {
        Some(first) => format!("[{first}]{}", chars.as_str()),
        None => String::new(),
    }
}

/// Command line of the liveness probe for `class_name`.
///
/// Exits 0 when a matching process is running. Shared by status actions and
/// the readiness poll of start actions so both see the same thing.
pub fn check_java_process_status_args(class_name: &str) -> Vec<String> {
    vec![
        "-n".to_string(),
        "--".to_string(),
        "pgrep".to_string(),
        "-f".to_string(),
        process_pattern(class_name),
    ]
}

fn kill_java_process_args(class_name: &str) -> Vec<String> {
    vec![
        "-n".to_string(),
        "--".to_string(),
        "sudo".to_string(),
        "pkill".to_string(),
        "-9".to_string(),
        "-f".to_string(),
        process_pattern(class_name),
    ]
}

/// Terminate the process running `class_name` on `node`.
///
/// With `must_succeed = false` a failed kill (most commonly "no such
/// process", but also an unreachable node) is logged and ignored, which
/// keeps restarts idempotent.
pub async fn kill_java_process(node: &CastleNode, class_name: &str, must_succeed: bool) -> Result<()> {
    let command = node.command().args(kill_java_process_args(class_name));
    let code = match command.run().await {
        Ok(code) => code,
        Err(err) if !must_succeed => {
            warn!(node = %node.name(), class = %class_name, error = %err, "kill not delivered; ignoring");
            return Ok(());
        }
        Err(err) => return Err(err),
    };

    if code == 0 {
        info!(node = %node.name(), class = %class_name, "killed process");
        return Ok(());
    }

    if must_succeed {
        return Err(CommandResultError::new(command.command_line(), code).into());
    }

    warn!(
        node = %node.name(),
        class = %class_name,
        code,
        "no process killed; ignoring"
    );
    Ok(())
}

/// Exit status of the liveness probe for `class_name` (0 = running).
///
/// A non-zero status is returned, not raised; only transport failures are
/// errors.
pub async fn get_java_process_status(node: &CastleNode, class_name: &str) -> Result<i32> {
    node.command()
        .args(check_java_process_status_args(class_name))
        .run()
        .await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::command::{CommandRequest, Uplink};
    use crate::errors::CastleError;
    use crate::types::{BoxFuture, Role};

    /// Uplink whose transport always fails.
    #[derive(Debug)]
    struct Unreachable;

    impl Uplink for Unreachable {
        fn internal_dns(&self) -> &str {
            "unreachable.internal"
        }

        fn execute<'a>(&'a self, _: &'a CommandRequest) -> BoxFuture<'a, Result<i32>> {
            Box::pin(async { Err(CastleError::ConfigError("connection refused".to_string())) })
        }
    }

    fn unreachable_node() -> CastleNode {
        CastleNode::new("zk0", 0, [Role::ZooKeeper], Arc::new(Unreachable))
    }

    #[tokio::test]
    async fn best_effort_kill_ignores_transport_errors() {
        kill_java_process(&unreachable_node(), "Main", false).await.unwrap();
    }

    #[tokio::test]
    async fn required_kill_surfaces_transport_errors() {
        let err = kill_java_process(&unreachable_node(), "Main", true).await.unwrap_err();
        assert!(matches!(err, CastleError::ConfigError(_)));
    }

    #[test]
    fn probe_pattern_brackets_the_first_character() {
        let args = check_java_process_status_args("org.apache.kafka.trogdor.agent.Agent");
        assert_eq!(
            args,
            vec!["-n", "--", "pgrep", "-f", "[o]rg.apache.kafka.trogdor.agent.Agent"]
        );
    }

    #[test]
    fn kill_uses_the_same_pattern() {
        let args = kill_java_process_args("Main");
        assert_eq!(args.last().map(String::as_str), Some("[M]ain"));
    }
}
