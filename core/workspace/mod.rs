//! # Finding and loading workspaces.
//!
//! A workspace is the root of a vendored source tree: the directory that carries a
//! `Workspace.toml` file. The workspace file names the workspace, declares the external
//! repository aliases that `@alias//...` labels resolve against, and lists the glob patterns that
//! identify test sources.
//!

mod config_file;
mod finder;

pub use config_file::*;
pub use finder::*;

use crate::model::ExternalRepo;
use std::path::PathBuf;
use thiserror::*;

pub const WORKSPACE_FILE: &str = "Workspace.toml";

/// The workspace quarry is operating on.
///
#[derive(Builder, Default, Debug, Clone)]
#[builder(build_fn(error = "WorkspaceError"))]
pub struct Workspace {
    /// The name of the workspace.
    #[builder(setter(into))]
    name: String,

    /// The root of the workspace. This is an absolute path and is host-dependant.
    #[builder(setter(into))]
    root: PathBuf,

    /// Glob patterns that identify test sources, matched against file names.
    #[builder(default)]
    test_patterns: Vec<String>,

    /// The external repository aliases declared in the workspace file.
    #[builder(default)]
    external_repos: Vec<ExternalRepo>,
}

impl Workspace {
    pub fn builder() -> WorkspaceBuilder {
        WorkspaceBuilder::default()
    }

    pub fn name(&self) -> &str {
        self.name.as_ref()
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    pub fn test_patterns(&self) -> &[String] {
        &self.test_patterns
    }

    pub fn external_repos(&self) -> &[ExternalRepo] {
        &self.external_repos
    }

    pub fn external_repo(&self, alias: &str) -> Option<&ExternalRepo> {
        self.external_repos.iter().find(|r| r.alias() == alias)
    }
}

#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error("Attempted to build a Workspace struct while missing fields: {0:?}")]
    BuilderError(derive_builder::UninitializedFieldError),
}

impl From<derive_builder::UninitializedFieldError> for WorkspaceError {
    fn from(err: derive_builder::UninitializedFieldError) -> Self {
        Self::BuilderError(err)
    }
}
