use crate::model::TargetId;
use crate::resolver::TargetRegistry;
use fxhash::{FxHashMap, FxHashSet};
use petgraph::dot;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::sync::Arc;
use thiserror::*;
use tracing::*;

/// The dependency graph among the local targets of a workspace.
///
/// Nodes are interned target handles; an edge runs from a dependent to each of its dependencies.
/// External dependencies never become nodes, they were already resolved away at the alias
/// boundary.
///
#[derive(Debug, Clone)]
pub struct DepGraph {
    graph: DiGraph<TargetId, ()>,
    nodes: FxHashMap<TargetId, NodeIndex>,
    registry: Arc<TargetRegistry>,
}

impl DepGraph {
    /// Build a graph over `ids` with the given dependent → dependency edges. Edges pointing at
    /// ids outside of `ids` are dropped, which keeps scoped rebuilds closed.
    ///
    #[tracing::instrument(name = "DepGraph::build", skip_all)]
    pub fn build(
        registry: Arc<TargetRegistry>,
        ids: &[TargetId],
        edges: &[(TargetId, TargetId)],
    ) -> Self {
        let mut graph = DiGraph::new();
        let mut nodes: FxHashMap<TargetId, NodeIndex> = FxHashMap::default();

        for id in ids {
            let node = graph.add_node(*id);
            nodes.insert(*id, node);
        }

        for (dependent, dependency) in edges {
            if let (Some(from), Some(to)) = (nodes.get(dependent), nodes.get(dependency)) {
                graph.add_edge(*from, *to, ());
            }
        }

        debug!(
            "dependency graph has {} nodes and {} edges",
            graph.node_count(),
            graph.edge_count()
        );

        Self {
            graph,
            nodes,
            registry,
        }
    }

    pub fn registry(&self) -> &Arc<TargetRegistry> {
        &self.registry
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: TargetId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// The direct dependencies of a target.
    pub fn dependencies(&self, id: TargetId) -> Vec<TargetId> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// The targets that directly depend on a target.
    pub fn dependents(&self, id: TargetId) -> Vec<TargetId> {
        self.neighbors(id, Direction::Incoming)
    }

    fn neighbors(&self, id: TargetId, dir: Direction) -> Vec<TargetId> {
        let Some(node) = self.nodes.get(&id) else {
            return vec![];
        };
        self.graph
            .neighbors_directed(*node, dir)
            .map(|n| self.graph[n])
            .collect()
    }

    /// Every dependency cycle among the local targets, one entry per strongly-connected
    /// component that is larger than a single node (or a node depending on itself).
    ///
    #[tracing::instrument(name = "DepGraph::cycles", skip(self))]
    pub fn cycles(&self) -> Vec<Vec<TargetId>> {
        let mut cycles = vec![];
        for scc in petgraph::algo::tarjan_scc(&self.graph) {
            let is_self_loop =
                scc.len() == 1 && self.graph.find_edge(scc[0], scc[0]).is_some();
            if scc.len() > 1 || is_self_loop {
                let mut members: Vec<TargetId> = scc.iter().map(|n| self.graph[*n]).collect();
                members.sort_by_key(|id| self.registry.get_label(*id));
                cycles.push(members);
            }
        }
        cycles
    }

    /// A dependency-first ordering of every target in the graph: each target appears after all
    /// of its dependencies.
    ///
    #[tracing::instrument(name = "DepGraph::toposort", skip(self))]
    pub fn toposort(&self) -> Result<Vec<TargetId>, DepGraphError> {
        match petgraph::algo::toposort(&self.graph, None) {
            Ok(order) => {
                // petgraph yields dependents before their dependencies, we want deps first.
                Ok(order.into_iter().rev().map(|n| self.graph[n]).collect())
            }
            Err(_) => Err(DepGraphError::CyclicDependency {
                members: self.cycles().into_iter().flatten().collect(),
            }),
        }
    }

    /// The transitive dependency closure of a target, not including the target itself.
    ///
    pub fn transitive_dependencies(&self, id: TargetId) -> Vec<TargetId> {
        let mut found: FxHashSet<TargetId> = FxHashSet::default();
        let mut pending = self.dependencies(id);
        while let Some(dep) = pending.pop() {
            if found.insert(dep) {
                pending.extend(self.dependencies(dep));
            }
        }
        let mut deps: Vec<TargetId> = found.into_iter().collect();
        deps.sort_by_key(|id| self.registry.get_label(*id));
        deps
    }

    /// Restrict the graph to one target and everything it transitively depends on.
    ///
    #[tracing::instrument(name = "DepGraph::scoped", skip(self))]
    pub fn scoped(&self, id: TargetId) -> DepGraph {
        let mut keep: FxHashSet<TargetId> = self.transitive_dependencies(id).into_iter().collect();
        keep.insert(id);

        let mut ids: Vec<TargetId> = self
            .graph
            .node_indices()
            .map(|n| self.graph[n])
            .filter(|id| keep.contains(id))
            .collect();
        ids.sort_by_key(|id| self.registry.get_label(*id));

        let edges: Vec<(TargetId, TargetId)> = self
            .graph
            .edge_references()
            .map(|e| (self.graph[e.source()], self.graph[e.target()]))
            .filter(|(from, to)| keep.contains(from) && keep.contains(to))
            .collect();

        DepGraph::build(self.registry.clone(), &ids, &edges)
    }

    /// Render the graph in graphviz dot format, one node per target label.
    ///
    pub fn to_dot(&self) -> String {
        format!(
            "{:?}",
            dot::Dot::with_attr_getters(
                &self.graph,
                &[dot::Config::EdgeNoLabel, dot::Config::NodeNoLabel],
                &|_graph, _edge| "".to_string(),
                &|_graph, (_idx, id)| format!(
                    "label = \"{}\"",
                    self.registry.get_label(*id)
                )
            )
        )
    }
}

#[derive(Error, Debug)]
pub enum DepGraphError {
    #[error("The dependency graph is not acyclic")]
    CyclicDependency { members: Vec<TargetId> },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Label, Target};
    use crate::resolver::Registration;

    fn registry_with(labels: &[&str]) -> (Arc<TargetRegistry>, FxHashMap<String, TargetId>) {
        let registry = Arc::new(TargetRegistry::new());
        let mut ids = FxHashMap::default();
        for raw in labels {
            let label: Label = raw.parse().unwrap();
            let target = Target::builder()
                .label(label.clone())
                .buildfile(format!("{}/Build.toml", label.package().display()))
                .build()
                .unwrap();
            let id = assert_matches!(
                registry.register_target(target),
                Registration::Registered(id) => id
            );
            ids.insert(raw.to_string(), id);
        }
        (registry, ids)
    }

    /// The five-module manifest: uritemplates ← googleapi ← gensupport ← {logging, servicemanagement}.
    fn vendor_graph() -> (DepGraph, FxHashMap<String, TargetId>) {
        let (registry, ids) = registry_with(&[
            "//googleapi/internal/uritemplates:uritemplates",
            "//googleapi:googleapi",
            "//gensupport:gensupport",
            "//logging/v2beta1:logging",
            "//servicemanagement/v1:servicemanagement",
        ]);

        let id = |l: &str| ids[l];
        let edges = vec![
            (
                id("//googleapi:googleapi"),
                id("//googleapi/internal/uritemplates:uritemplates"),
            ),
            (id("//gensupport:gensupport"), id("//googleapi:googleapi")),
            (id("//logging/v2beta1:logging"), id("//gensupport:gensupport")),
            (id("//logging/v2beta1:logging"), id("//googleapi:googleapi")),
            (
                id("//servicemanagement/v1:servicemanagement"),
                id("//gensupport:gensupport"),
            ),
            (
                id("//servicemanagement/v1:servicemanagement"),
                id("//googleapi:googleapi"),
            ),
        ];

        let all: Vec<TargetId> = registry.target_ids();
        (DepGraph::build(registry, &all, &edges), ids)
    }

    #[test]
    fn toposort_puts_every_target_after_its_dependencies() {
        let (graph, ids) = vendor_graph();
        let order = graph.toposort().unwrap();

        let position = |l: &str| order.iter().position(|id| *id == ids[l]).unwrap();

        assert!(
            position("//googleapi/internal/uritemplates:uritemplates")
                < position("//googleapi:googleapi")
        );
        assert!(position("//googleapi:googleapi") < position("//gensupport:gensupport"));
        assert!(position("//gensupport:gensupport") < position("//logging/v2beta1:logging"));
        assert!(
            position("//gensupport:gensupport")
                < position("//servicemanagement/v1:servicemanagement")
        );
    }

    #[test]
    fn the_vendor_graph_has_no_cycles() {
        let (graph, _) = vendor_graph();
        assert!(graph.cycles().is_empty());
    }

    #[test]
    fn a_back_edge_is_reported_as_a_cycle() {
        let (registry, ids) = registry_with(&[
            "//googleapi:googleapi",
            "//gensupport:gensupport",
        ]);
        let a = ids["//googleapi:googleapi"];
        let b = ids["//gensupport:gensupport"];

        let graph = DepGraph::build(registry, &[a, b], &[(a, b), (b, a)]);

        let cycles = graph.cycles();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].len(), 2);
        assert_matches!(graph.toposort(), Err(DepGraphError::CyclicDependency { .. }));
    }

    #[test]
    fn a_self_dependency_is_a_cycle() {
        let (registry, ids) = registry_with(&["//googleapi:googleapi"]);
        let a = ids["//googleapi:googleapi"];

        let graph = DepGraph::build(registry, &[a], &[(a, a)]);
        assert_eq!(graph.cycles(), vec![vec![a]]);
    }

    #[test]
    fn scoping_keeps_only_the_transitive_closure() {
        let (graph, ids) = vendor_graph();
        let scoped = graph.scoped(ids["//logging/v2beta1:logging"]);

        assert_eq!(scoped.len(), 4);
        assert!(scoped.contains(ids["//googleapi/internal/uritemplates:uritemplates"]));
        assert!(!scoped.contains(ids["//servicemanagement/v1:servicemanagement"]));
    }

    #[test]
    fn dependents_are_the_reverse_of_dependencies() {
        let (graph, ids) = vendor_graph();
        let gensupport = ids["//gensupport:gensupport"];

        let dependents = graph.dependents(gensupport);
        assert_eq!(dependents.len(), 2);
        assert!(dependents.contains(&ids["//logging/v2beta1:logging"]));
        assert!(dependents.contains(&ids["//servicemanagement/v1:servicemanagement"]));
    }

    #[test]
    fn dot_output_names_targets_by_label() {
        let (graph, _) = vendor_graph();
        let dot = graph.to_dot();
        assert!(dot.contains("//googleapi:googleapi"));
        assert!(dot.contains("//googleapi/internal/uritemplates:uritemplates"));
    }
}
