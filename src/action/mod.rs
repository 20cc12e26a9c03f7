// src/action/mod.rs

//! Actions: named, scoped units of remote work.
//!
//! - [`id`] defines `ActionId` (what + where) and `TargetId` (dependency
//!   patterns, possibly wildcard-scoped).
//! - [`daemon`] is the static description of each daemon type: class
//!   name, fixed remote paths and launch command lines.
//! - [`render`] produces per-node configuration files through the template
//!   engine, and the scoped guard that removes them again.
//! - [`start`], [`stop`], [`status`], [`init`] and [`save_logs`] are the
//!   concrete actions.
//! - [`catalog`] instantiates the actions a cluster's roles call for.

pub mod catalog;
pub mod daemon;
pub mod id;
pub mod init;
pub mod render;
pub mod save_logs;
pub mod start;
pub mod status;
pub mod stop;

use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

use crate::cluster::{CastleCluster, CastleNode};
use crate::errors::Result;
use crate::types::{BoxFuture, Role};

pub use catalog::create_actions;
pub use daemon::DaemonType;
pub use id::{ActionId, TargetId, TargetScope};
pub use init::InitAction;
pub use save_logs::SaveLogsAction;
pub use start::DaemonStartAction;
pub use status::DaemonStatusAction;
pub use stop::DaemonStopAction;

/// Static description of an action: identity, ordering and placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionSpec {
    id: ActionId,
    dependencies: Vec<TargetId>,
    required_roles: BTreeSet<Role>,
    initial_delay: Duration,
}

impl ActionSpec {
    pub fn new(id: ActionId) -> Self {
        Self {
            id,
            dependencies: Vec::new(),
            required_roles: BTreeSet::new(),
            initial_delay: Duration::ZERO,
        }
    }

    /// Run only after every action matching `target` has completed.
    pub fn after(mut self, target: TargetId) -> Self {
        if !self.dependencies.contains(&target) {
            self.dependencies.push(target);
        }
        self
    }

    /// Only valid on a node holding `role`.
    pub fn requires(mut self, role: Role) -> Self {
        self.required_roles.insert(role);
        self
    }

    /// Wait this long after becoming ready before running.
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn id(&self) -> &ActionId {
        &self.id
    }

    pub fn dependencies(&self) -> &[TargetId] {
        &self.dependencies
    }

    pub fn required_roles(&self) -> &BTreeSet<Role> {
        &self.required_roles
    }

    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }
}

/// A unit of remote work.
///
/// `call` must tolerate being re-run after a partial earlier run: the
/// operator's recovery path is simply to run the action again.
pub trait Action: Send + Sync + fmt::Debug {
    fn spec(&self) -> &ActionSpec;

    /// Perform the action's effect against `node`.
    fn call<'a>(&'a self, cluster: &'a CastleCluster, node: &'a CastleNode)
    -> BoxFuture<'a, Result<()>>;

    fn id(&self) -> &ActionId {
        self.spec().id()
    }
}
