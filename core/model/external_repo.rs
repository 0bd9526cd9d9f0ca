use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::*;

/// An external repository alias declared in the workspace file.
///
/// External repositories are vendored checkouts: third-party source committed into the workspace
/// rather than fetched at build time. Targets reference them with `@alias//...` labels. Their
/// internals are opaque to quarry; the only requirement is that the vendored checkout exists at
/// the declared path.
///
#[derive(Builder, Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[builder(build_fn(error = "ExternalRepoError"))]
pub struct ExternalRepo {
    #[builder(setter(into))]
    alias: String,

    /// Where the vendored checkout lives, relative to the workspace root.
    #[builder(setter(into))]
    path: PathBuf,

    /// Where the vendored source originally came from.
    #[builder(default, setter(into, strip_option))]
    url: Option<String>,
}

impl ExternalRepo {
    pub fn builder() -> ExternalRepoBuilder {
        ExternalRepoBuilder::default()
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }
}

impl std::fmt::Display for ExternalRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "@{} => {}", self.alias, self.path.display())
    }
}

#[derive(Error, Debug)]
pub enum ExternalRepoError {
    #[error(transparent)]
    BuilderError(derive_builder::UninitializedFieldError),
}

impl From<derive_builder::UninitializedFieldError> for ExternalRepoError {
    fn from(value: derive_builder::UninitializedFieldError) -> Self {
        ExternalRepoError::BuilderError(value)
    }
}
