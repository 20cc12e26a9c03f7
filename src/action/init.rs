// src/action/init.rs

use crate::action::{Action, ActionId, ActionSpec};
use crate::cluster::{CastleCluster, CastleNode};
use crate::errors::Result;
use crate::types::BoxFuture;

pub const INIT_TYPE: &str = "init";

/// Confirm a node is reachable. Every start action depends on `init:*`.
#[derive(Debug)]
pub struct InitAction {
    spec: ActionSpec,
}

impl InitAction {
    pub fn new(node: &str) -> Self {
        Self {
            spec: ActionSpec::new(ActionId::new(INIT_TYPE, node)),
        }
    }
}

impl Action for InitAction {
    fn spec(&self) -> &ActionSpec {
        &self.spec
    }

    fn call<'a>(&'a self, _cluster: &'a CastleCluster, node: &'a CastleNode) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move { node.command().args(["-n", "--", "true"]).must_run().await })
    }
}
