// src/cluster/node.rs

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::command::{CommandBuilder, Uplink};
use crate::types::Role;

/// One remote endpoint of the cluster.
///
/// Owned by the cluster for the whole run; actions borrow it and reach the
/// node through [`command`](Self::command).
#[derive(Clone)]
pub struct CastleNode {
    name: String,
    index: usize,
    roles: BTreeSet<Role>,
    uplink: Arc<dyn Uplink>,
}

impl CastleNode {
    pub fn new(
        name: impl Into<String>,
        index: usize,
        roles: impl IntoIterator<Item = Role>,
        uplink: Arc<dyn Uplink>,
    ) -> Self {
        Self {
            name: name.into(),
            index,
            roles: roles.into_iter().collect(),
            uplink,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position of this node in the cluster's name-ordered node map.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn roles(&self) -> &BTreeSet<Role> {
        &self.roles
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn internal_dns(&self) -> &str {
        self.uplink.internal_dns()
    }

    pub fn uplink(&self) -> &dyn Uplink {
        self.uplink.as_ref()
    }

    /// Start building a command or transfer against this node.
    pub fn command(&self) -> CommandBuilder<'_> {
        CommandBuilder::new(self.uplink.as_ref())
    }
}

impl fmt::Debug for CastleNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CastleNode")
            .field("name", &self.name)
            .field("index", &self.index)
            .field("roles", &self.roles)
            .field("internal_dns", &self.internal_dns())
            .finish()
    }
}
