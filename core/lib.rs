//! # Quarry Core
//!
//! The flow begins by creating a `Config` struct and handing it to a `Checker`. From there, the
//! `Checker` will find the enclosing `Workspace`, scan it for buildfiles, intern every declared
//! target in a `TargetRegistry`, resolve all dependency references, and analyze the resulting
//! `DepGraph`. The result is a `CheckOutcome` that carries the loaded workspace, the registry, the
//! graph, and a `CheckReport` with every diagnostic that was found.
//!
//! A `BuildPlanner` can then turn a clean graph into a `BuildPlan`: a topological ordering of the
//! targets, grouped into batches that only depend on earlier batches.
//!

pub(crate) mod checker;
pub(crate) mod config;
pub(crate) mod graph;
pub(crate) mod manifest;
pub mod model;
pub(crate) mod planner;
pub(crate) mod resolver;
pub(crate) mod workspace;

pub use checker::*;
pub use config::*;
pub use graph::*;
pub use manifest::{Buildfile, BuildfileError, ManifestScanner, ScannerError, BUILDFILE};
pub use model::{Label, LabelError, SourceGlobs, Target, TargetId, Visibility};
pub use planner::*;
pub use resolver::*;
pub use workspace::{
    Workspace, WorkspaceConfigFile, WorkspaceConfigFileError, WorkspaceError, WorkspaceFinder,
    WorkspaceFinderError, WORKSPACE_FILE,
};

#[macro_use]
extern crate derive_builder;

#[cfg(test)]
#[macro_use]
extern crate assert_matches;

#[cfg(test)]
extern crate quickcheck;
#[cfg(test)]
#[macro_use(quickcheck)]
extern crate quickcheck_macros;
