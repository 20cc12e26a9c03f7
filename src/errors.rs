// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

use crate::action::{ActionId, TargetId};
use crate::command::CommandResultError;

/// Exit code used when an action fails for a reason other than a remote
/// command's own non-zero return code.
pub const GENERIC_FAILURE_CODE: i32 = 1;

#[derive(Error, Debug)]
pub enum CastleError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unknown target: no action matches '{0}'")]
    UnknownTarget(TargetId),

    #[error("Unresolvable dependency: action '{action}' depends on '{target}', which matches no action")]
    UnresolvableDependency { action: ActionId, target: TargetId },

    #[error("Cycle detected in action graph: {0}")]
    DagCycle(String),

    #[error("Unknown node: {0}")]
    UnknownNode(String),

    #[error(transparent)]
    CommandFailed(#[from] CommandResultError),

    #[error("condition never became true after {attempts} attempts")]
    WaitTimeout { attempts: u32 },

    #[error("missing substitution key: '{0}'")]
    MissingSubstitutionKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CastleError {
    /// Status code this error contributes to the aggregate run status.
    pub fn exit_code(&self) -> i32 {
        match self {
            CastleError::CommandFailed(err) if err.return_code() != 0 => err.return_code(),
            _ => GENERIC_FAILURE_CODE,
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, CastleError>;
