//! # Validating a workspace.
//!
//! The `Checker` is the composing façade of the crate: it finds the workspace, scans its
//! buildfiles, interns every target, resolves every dependency reference, analyzes the dependency
//! graph, and lints each target's sources. Everything it finds lands in a `CheckReport`; the
//! loaded state comes back in a `CheckOutcome` so that callers can keep querying it.
//!

mod diagnostic;

pub use diagnostic::*;

use crate::graph::DepGraph;
use crate::manifest::{ManifestScanner, ScannerError};
use crate::model::{SourceGlobsError, TargetId};
use crate::planner::BuildPlanner;
use crate::resolver::{DepResolution, DependencyResolver, Registration, TargetRegistry};
use crate::workspace::{Workspace, WorkspaceFinder, WorkspaceFinderError};
use crate::Config;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::sync::Arc;
use thiserror::*;
use tokio::fs;
use tracing::*;

/// Validates the build manifests of a workspace.
///
pub struct Checker {
    config: Config,
}

/// Everything a check run loaded and found, kept around for further querying.
///
pub struct CheckOutcome {
    workspace: Workspace,
    registry: Arc<TargetRegistry>,
    graph: DepGraph,
    report: CheckReport,
}

impl CheckOutcome {
    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn registry(&self) -> &Arc<TargetRegistry> {
        &self.registry
    }

    pub fn graph(&self) -> &DepGraph {
        &self.graph
    }

    pub fn report(&self) -> &CheckReport {
        &self.report
    }

    pub fn planner(&self) -> BuildPlanner {
        BuildPlanner::new(self.graph.clone())
    }
}

impl Checker {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    #[tracing::instrument(name = "Checker::check", skip(self))]
    pub async fn check(&self) -> Result<CheckOutcome, CheckerError> {
        let mut report = CheckReport::default();

        let workspace = WorkspaceFinder::find(&self.config).await?;
        self.check_external_repos(&workspace, &mut report).await;

        let buildfiles = ManifestScanner::new(&workspace).scan().await?;

        let registry = Arc::new(TargetRegistry::new());
        for buildfile in &buildfiles {
            for target in buildfile.targets() {
                if let Registration::Duplicate { id, existing } =
                    registry.register_target(target.clone())
                {
                    report.push(Diagnostic::DuplicateTarget {
                        label: registry.get_label(id),
                        buildfile: target.buildfile().to_path_buf(),
                        existing_buildfile: existing.buildfile().to_path_buf(),
                    });
                }
            }
        }

        let edges = self.resolve_deps(&workspace, &registry, &mut report);

        let graph = DepGraph::build(registry.clone(), &registry.target_ids(), &edges);
        for members in graph.cycles() {
            report.push(Diagnostic::DependencyCycle {
                members: members
                    .into_iter()
                    .map(|id| registry.get_label(id))
                    .collect(),
            });
        }

        self.lint_sources(&workspace, &registry, &mut report)?;

        debug!(
            "checked {} targets, {} diagnostics",
            registry.len(),
            report.len()
        );

        Ok(CheckOutcome {
            workspace,
            registry,
            graph,
            report,
        })
    }

    async fn check_external_repos(&self, workspace: &Workspace, report: &mut CheckReport) {
        for repo in workspace.external_repos() {
            let checkout = workspace.root().join(repo.path());
            let is_dir = fs::metadata(&checkout)
                .await
                .map(|m| m.is_dir())
                .unwrap_or(false);
            if !is_dir {
                report.push(Diagnostic::MissingExternalRepository {
                    alias: repo.alias().to_string(),
                    path: repo.path().to_path_buf(),
                });
            }
        }
    }

    fn resolve_deps(
        &self,
        workspace: &Workspace,
        registry: &Arc<TargetRegistry>,
        report: &mut CheckReport,
    ) -> Vec<(TargetId, TargetId)> {
        let resolver = DependencyResolver::new(workspace.clone(), registry.clone());

        let mut edges = vec![];
        for id in registry.target_ids() {
            let target = registry.get_target(id);
            for dep in target.deps() {
                match resolver.resolve(dep) {
                    DepResolution::Local(dep_id) => {
                        edges.push((id, dep_id));

                        let dep_target = registry.get_target(dep_id);
                        if !dep_target
                            .visibility()
                            .admits(dep_target.package(), target.package())
                        {
                            report.push(Diagnostic::VisibilityViolation {
                                target: registry.get_label(id),
                                dep: registry.get_label(dep_id),
                            });
                        }
                    }
                    DepResolution::External { .. } => {}
                    DepResolution::UnresolvedLocal => {
                        report.push(Diagnostic::UnresolvedDependency {
                            target: registry.get_label(id),
                            dep: dep.clone(),
                        });
                    }
                    DepResolution::UnknownExternal { repo } => {
                        report.push(Diagnostic::UnknownExternalRepository {
                            target: registry.get_label(id),
                            dep: dep.clone(),
                            repo,
                        });
                    }
                }
            }
        }
        edges
    }

    fn lint_sources(
        &self,
        workspace: &Workspace,
        registry: &Arc<TargetRegistry>,
        report: &mut CheckReport,
    ) -> Result<(), CheckerError> {
        let test_matcher = test_pattern_matcher(workspace)?;

        for id in registry.target_ids() {
            let target = registry.get_target(id);
            if target.srcs().is_empty() {
                continue;
            }

            let package_root = workspace.root().join(target.package());
            let sources = target.srcs().expand(&package_root)?;

            if sources.is_empty() {
                report.push(Diagnostic::EmptySourceGlob {
                    target: registry.get_label(id),
                });
                continue;
            }

            let test_files: Vec<_> = sources
                .sorted()
                .into_iter()
                .filter(|file| {
                    file.file_name()
                        .map(|name| test_matcher.is_match(name))
                        .unwrap_or(false)
                })
                .collect();
            if !test_files.is_empty() {
                report.push(Diagnostic::TestSourcesIncluded {
                    target: registry.get_label(id),
                    files: test_files,
                });
            }
        }

        Ok(())
    }
}

fn test_pattern_matcher(workspace: &Workspace) -> Result<GlobSet, CheckerError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in workspace.test_patterns() {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|err| CheckerError::InvalidTestPattern {
                pattern: pattern.clone(),
                err,
            })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|err| CheckerError::InvalidTestPattern {
            pattern: workspace.test_patterns().join(", "),
            err,
        })
}

#[derive(Error, Debug)]
pub enum CheckerError {
    #[error(transparent)]
    WorkspaceFinderError(WorkspaceFinderError),

    #[error(transparent)]
    ScannerError(ScannerError),

    #[error(transparent)]
    SourceGlobsError(SourceGlobsError),

    #[error("Could not compile workspace test pattern {pattern:?}: {err:?}")]
    InvalidTestPattern { pattern: String, err: globset::Error },
}

impl From<WorkspaceFinderError> for CheckerError {
    fn from(err: WorkspaceFinderError) -> Self {
        Self::WorkspaceFinderError(err)
    }
}

impl From<ScannerError> for CheckerError {
    fn from(err: ScannerError) -> Self {
        Self::ScannerError(err)
    }
}

impl From<SourceGlobsError> for CheckerError {
    fn from(err: SourceGlobsError) -> Self {
        Self::SourceGlobsError(err)
    }
}
