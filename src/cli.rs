// src/cli.rs

//! CLI argument parsing using `clap`.

use std::num::NonZeroUsize;

use clap::{Parser, ValueEnum};

use crate::action::TargetId;

/// Command-line arguments for `castle`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "castle",
    version,
    about = "Run dependency-ordered actions across a cluster of nodes.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the cluster file (TOML).
    #[arg(long, value_name = "PATH", default_value = "Castle.toml")]
    pub cluster: String,

    /// Override or add an `[env]` variable. May be repeated.
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_var)]
    pub vars: Vec<(String, String)>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CASTLE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Maximum number of actions running at once.
    ///
    /// Defaults to `cluster.max_concurrency`, then to the node count.
    #[arg(long, value_name = "N")]
    pub max_concurrency: Option<NonZeroUsize>,

    /// Resolve and print the execution order, but don't run anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Actions to run, as `type` (every node) or `type:node`.
    #[arg(value_name = "TARGET", required = true, value_parser = parse_target)]
    pub targets: Vec<TargetId>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

fn parse_var(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("invalid variable '{s}': expected KEY=VALUE")),
    }
}

fn parse_target(s: &str) -> Result<TargetId, String> {
    s.parse()
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
