use crate::graph::{DepGraph, DepGraphError};
use crate::model::{Label, TargetId};
use fxhash::FxHashMap;
use std::sync::Arc;
use thiserror::*;
use tracing::*;

/// How planning went.
///
#[derive(Debug)]
pub enum PlanningFlow {
    Planned { plan: BuildPlan },
    CyclicDependency { members: Vec<Arc<Label>> },
    MissingTarget { target: Label },
}

/// Turns an acyclic `DepGraph` into a `BuildPlan`: the topological order of the targets, grouped
/// into batches where every batch only depends on earlier batches. Independent targets land in
/// the same batch, which is exactly the parallelism a build tool is allowed to exploit.
///
pub struct BuildPlanner {
    graph: DepGraph,
}

impl BuildPlanner {
    pub fn new(graph: DepGraph) -> Self {
        Self { graph }
    }

    /// Plan the whole graph.
    ///
    #[tracing::instrument(name = "BuildPlanner::plan", skip(self))]
    pub fn plan(&self) -> PlanningFlow {
        self.plan_graph(&self.graph)
    }

    /// Plan one target and its transitive dependencies.
    ///
    #[tracing::instrument(name = "BuildPlanner::plan_target", skip(self))]
    pub fn plan_target(&self, target: &Label) -> PlanningFlow {
        let Some(id) = self.graph.registry().find_label(target) else {
            return PlanningFlow::MissingTarget {
                target: target.clone(),
            };
        };
        if !self.graph.contains(id) {
            return PlanningFlow::MissingTarget {
                target: target.clone(),
            };
        }

        self.plan_graph(&self.graph.scoped(id))
    }

    fn plan_graph(&self, graph: &DepGraph) -> PlanningFlow {
        let registry = graph.registry();

        let order = match graph.toposort() {
            Ok(order) => order,
            Err(DepGraphError::CyclicDependency { members }) => {
                let members = members.iter().map(|id| registry.get_label(*id)).collect();
                return PlanningFlow::CyclicDependency { members };
            }
        };

        // Dependency-first order means every dependency's level is known by the time we
        // compute its dependents'.
        let mut levels: FxHashMap<TargetId, usize> = FxHashMap::default();
        for id in &order {
            let level = graph
                .dependencies(*id)
                .into_iter()
                .map(|dep| levels[&dep] + 1)
                .max()
                .unwrap_or(0);
            levels.insert(*id, level);
        }

        let batch_count = levels.values().map(|l| l + 1).max().unwrap_or(0);
        let mut batches: Vec<Vec<Arc<Label>>> = vec![vec![]; batch_count];
        for id in &order {
            batches[levels[id]].push(registry.get_label(*id));
        }
        for batch in batches.iter_mut() {
            batch.sort();
        }

        PlanningFlow::Planned {
            plan: BuildPlan { batches },
        }
    }
}

/// An executable ordering of a workspace's targets.
///
#[derive(Default, Debug, Clone)]
pub struct BuildPlan {
    batches: Vec<Vec<Arc<Label>>>,
}

impl BuildPlan {
    pub fn batches(&self) -> &[Vec<Arc<Label>>] {
        &self.batches
    }

    pub fn target_count(&self) -> usize {
        self.batches.iter().map(|b| b.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }
}

#[derive(Error, Debug)]
pub enum PlannerError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Target;
    use crate::resolver::{Registration, TargetRegistry};

    fn vendor_graph() -> DepGraph {
        let registry = Arc::new(TargetRegistry::new());
        let mut ids = FxHashMap::default();

        for raw in [
            "//googleapi/internal/uritemplates:uritemplates",
            "//googleapi:googleapi",
            "//gensupport:gensupport",
            "//logging/v2beta1:logging",
            "//servicemanagement/v1:servicemanagement",
        ] {
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
            ids.insert(raw, id);
        }

        let edges = vec![
            (
                ids["//googleapi:googleapi"],
                ids["//googleapi/internal/uritemplates:uritemplates"],
            ),
            (ids["//gensupport:gensupport"], ids["//googleapi:googleapi"]),
            (
                ids["//logging/v2beta1:logging"],
                ids["//gensupport:gensupport"],
            ),
            (
                ids["//logging/v2beta1:logging"],
                ids["//googleapi:googleapi"],
            ),
            (
                ids["//servicemanagement/v1:servicemanagement"],
                ids["//gensupport:gensupport"],
            ),
            (
                ids["//servicemanagement/v1:servicemanagement"],
                ids["//googleapi:googleapi"],
            ),
        ];

        let all = registry.target_ids();
        DepGraph::build(registry, &all, &edges)
    }

    fn batch_strings(plan: &BuildPlan) -> Vec<Vec<String>> {
        plan.batches()
            .iter()
            .map(|b| b.iter().map(|l| l.to_string()).collect())
            .collect()
    }

    #[test]
    fn the_generated_clients_land_in_the_same_batch() {
        let planner = BuildPlanner::new(vendor_graph());

        let plan = assert_matches!(planner.plan(), PlanningFlow::Planned { plan } => plan);
        let batches = batch_strings(&plan);

        assert_eq!(
            batches,
            vec![
                vec!["//googleapi/internal/uritemplates:uritemplates".to_string()],
                vec!["//googleapi:googleapi".to_string()],
                vec!["//gensupport:gensupport".to_string()],
                vec![
                    "//logging/v2beta1:logging".to_string(),
                    "//servicemanagement/v1:servicemanagement".to_string(),
                ],
            ]
        );
        assert_eq!(plan.target_count(), 5);
    }

    #[test]
    fn plans_can_be_scoped_to_one_target() {
        let planner = BuildPlanner::new(vendor_graph());

        let target: Label = "//googleapi:googleapi".parse().unwrap();
        let plan = assert_matches!(
            planner.plan_target(&target),
            PlanningFlow::Planned { plan } => plan
        );

        assert_eq!(
            batch_strings(&plan),
            vec![
                vec!["//googleapi/internal/uritemplates:uritemplates".to_string()],
                vec!["//googleapi:googleapi".to_string()],
            ]
        );
    }

    #[test]
    fn planning_an_undeclared_target_is_refused() {
        let planner = BuildPlanner::new(vendor_graph());

        let target: Label = "//nope:nope".parse().unwrap();
        assert_matches!(
            planner.plan_target(&target),
            PlanningFlow::MissingTarget { target: t } if t == target
        );
    }

    #[test]
    fn cycles_refuse_to_plan() {
        let registry = Arc::new(TargetRegistry::new());
        let a_label: Label = "//googleapi:googleapi".parse().unwrap();
        let b_label: Label = "//gensupport:gensupport".parse().unwrap();

        let mut handles = vec![];
        for label in [&a_label, &b_label] {
            let target = Target::builder()
                .label(label.clone())
                .buildfile("Build.toml")
                .build()
                .unwrap();
            handles.push(assert_matches!(
                registry.register_target(target),
                Registration::Registered(id) => id
            ));
        }

        let graph = DepGraph::build(
            registry,
            &handles,
            &[(handles[0], handles[1]), (handles[1], handles[0])],
        );

        let planner = BuildPlanner::new(graph);
        assert_matches!(planner.plan(), PlanningFlow::CyclicDependency { members } => {
            assert_eq!(members.len(), 2);
        });
    }
}
