// src/dag/graph.rs

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Arc;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use tracing::debug;

use crate::action::{Action, ActionId, TargetId};
use crate::errors::{CastleError, Result};

/// Internal node structure: the action plus its resolved edges.
#[derive(Debug, Clone)]
struct GraphNode {
    action: Arc<dyn Action>,
    /// Concrete actions that must complete before this one may run.
    deps: Vec<ActionId>,
    /// Concrete actions waiting on this one.
    dependents: Vec<ActionId>,
}

/// Actions of one run with their `TargetId` dependencies resolved to
/// concrete edges.
///
/// Construction fails on a dependency matching nothing and on cycles, so a
/// malformed graph is rejected before any action runs.
#[derive(Debug, Clone)]
pub struct ActionGraph {
    nodes: BTreeMap<ActionId, GraphNode>,
    order: Vec<ActionId>,
}

fn index_actions(
    actions: impl IntoIterator<Item = Arc<dyn Action>>,
) -> Result<BTreeMap<ActionId, Arc<dyn Action>>> {
    let mut by_id = BTreeMap::new();
    for action in actions {
        let id = action.id().clone();
        if by_id.insert(id.clone(), action).is_some() {
            return Err(CastleError::ConfigError(format!("duplicate action '{id}'")));
        }
    }
    Ok(by_id)
}

fn resolve<'a>(
    target: &TargetId,
    ids: impl Iterator<Item = &'a ActionId>,
) -> Vec<ActionId> {
    ids.filter(|id| target.matches(id)).cloned().collect()
}

impl ActionGraph {
    /// Build a graph over exactly `actions`.
    pub fn build(actions: impl IntoIterator<Item = Arc<dyn Action>>) -> Result<Self> {
        let by_id = index_actions(actions)?;

        let mut nodes: BTreeMap<ActionId, GraphNode> = by_id
            .iter()
            .map(|(id, action)| {
                (
                    id.clone(),
                    GraphNode {
                        action: Arc::clone(action),
                        deps: Vec::new(),
                        dependents: Vec::new(),
                    },
                )
            })
            .collect();

        for (id, action) in &by_id {
            let mut deps = BTreeSet::new();
            for target in action.spec().dependencies() {
                let matched = resolve(target, by_id.keys());
                if matched.is_empty() {
                    return Err(CastleError::UnresolvableDependency {
                        action: id.clone(),
                        target: target.clone(),
                    });
                }
                deps.extend(matched);
            }

            for dep in &deps {
                if let Some(dep_node) = nodes.get_mut(dep) {
                    dep_node.dependents.push(id.clone());
                }
            }
            if let Some(node) = nodes.get_mut(id) {
                node.deps = deps.into_iter().collect();
            }
        }

        let order = topological_order(&nodes)?;
        debug!(actions = nodes.len(), "action graph built");
        Ok(Self { nodes, order })
    }

    /// Build the graph for the closure of `targets` under dependencies.
    ///
    /// Every target must match at least one action; every dependency of a
    /// selected action must match at least one action, and those matches
    /// join the selection.
    pub fn select(
        actions: impl IntoIterator<Item = Arc<dyn Action>>,
        targets: &[TargetId],
    ) -> Result<Self> {
        let all = index_actions(actions)?;

        let mut queue: VecDeque<ActionId> = VecDeque::new();
        for target in targets {
            let matched = resolve(target, all.keys());
            if matched.is_empty() {
                return Err(CastleError::UnknownTarget(target.clone()));
            }
            queue.extend(matched);
        }

        let mut selected: BTreeSet<ActionId> = BTreeSet::new();
        while let Some(id) = queue.pop_front() {
            let Some(action) = all.get(&id) else {
                continue;
            };
            if !selected.insert(id.clone()) {
                continue;
            }
            for target in action.spec().dependencies() {
                let matched = resolve(target, all.keys());
                if matched.is_empty() {
                    return Err(CastleError::UnresolvableDependency {
                        action: id.clone(),
                        target: target.clone(),
                    });
                }
                queue.extend(matched);
            }
        }

        debug!(?targets, selected = selected.len(), "selected actions for run");
        Self::build(selected.iter().filter_map(|id| all.get(id).cloned()))
    }

    pub fn ids(&self) -> impl Iterator<Item = &ActionId> {
        self.nodes.keys()
    }

    pub fn actions(&self) -> impl Iterator<Item = &Arc<dyn Action>> {
        self.nodes.values().map(|n| &n.action)
    }

    pub fn action(&self, id: &ActionId) -> Option<&Arc<dyn Action>> {
        self.nodes.get(id).map(|n| &n.action)
    }

    pub fn contains(&self, id: &ActionId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn dependencies_of(&self, id: &ActionId) -> &[ActionId] {
        self.nodes.get(id).map(|n| n.deps.as_slice()).unwrap_or(&[])
    }

    pub fn dependents_of(&self, id: &ActionId) -> &[ActionId] {
        self.nodes
            .get(id)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }

    /// One valid execution order (dependencies first).
    pub fn topological_order(&self) -> &[ActionId] {
        &self.order
    }
}

fn topological_order(nodes: &BTreeMap<ActionId, GraphNode>) -> Result<Vec<ActionId>> {
    // Edge direction: dependency -> dependent.
    let mut graph: DiGraphMap<&ActionId, ()> = DiGraphMap::new();

    for id in nodes.keys() {
        graph.add_node(id);
    }
    for (id, node) in nodes {
        for dep in &node.deps {
            graph.add_edge(dep, id, ());
        }
    }

    match toposort(&graph, None) {
        Ok(order) => Ok(order.into_iter().cloned().collect()),
        Err(cycle) => Err(CastleError::DagCycle(format!(
            "cycle involving action '{}'",
            cycle.node_id()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionSpec;
    use crate::cluster::{CastleCluster, CastleNode};
    use crate::types::BoxFuture;

    #[derive(Debug)]
    struct Noop(ActionSpec);

    impl Action for Noop {
        fn spec(&self) -> &ActionSpec {
            &self.0
        }

        fn call<'a>(&'a self, _: &'a CastleCluster, _: &'a CastleNode) -> BoxFuture<'a, Result<()>> {
            Box::pin(async { Ok(()) })
        }
    }

    fn action(ty: &str, scope: &str, deps: &[&str]) -> Arc<dyn Action> {
        let spec = deps.iter().fold(ActionSpec::new(ActionId::new(ty, scope)), |spec, dep| {
            spec.after(dep.parse().unwrap())
        });
        Arc::new(Noop(spec))
    }

    #[test]
    fn wildcard_dependency_expands_to_every_scope() {
        let graph = ActionGraph::build([
            action("init", "a", &[]),
            action("init", "b", &[]),
            action("start", "a", &["init"]),
        ])
        .unwrap();

        let start = ActionId::new("start", "a");
        assert_eq!(
            graph.dependencies_of(&start),
            &[ActionId::new("init", "a"), ActionId::new("init", "b")]
        );
        assert_eq!(graph.dependents_of(&ActionId::new("init", "b")), &[start.clone()]);
        assert_eq!(graph.topological_order().last(), Some(&start));
    }

    #[test]
    fn dependency_matching_nothing_is_unresolvable() {
        let err = ActionGraph::build([action("start", "a", &["init:zz"])]).unwrap_err();
        assert!(matches!(err, CastleError::UnresolvableDependency { .. }));
    }

    #[test]
    fn cycles_are_rejected() {
        let err = ActionGraph::build([action("x", "a", &["y"]), action("y", "a", &["x"])]).unwrap_err();
        assert!(matches!(err, CastleError::DagCycle(_)));
    }

    #[test]
    fn selection_pulls_in_dependencies_only() {
        let graph = ActionGraph::select(
            [
                action("init", "a", &[]),
                action("start", "a", &["init"]),
                action("status", "a", &[]),
            ],
            &["start".parse().unwrap()],
        )
        .unwrap();

        assert_eq!(graph.len(), 2);
        assert!(graph.contains(&ActionId::new("init", "a")));
        assert!(!graph.contains(&ActionId::new("status", "a")));
    }

    #[test]
    fn selection_rejects_unknown_targets() {
        let err = ActionGraph::select([action("init", "a", &[])], &["stop".parse().unwrap()]).unwrap_err();
        assert!(matches!(err, CastleError::UnknownTarget(_)));
    }
}
