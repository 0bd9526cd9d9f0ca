use super::{Label, SourceGlobs, Visibility};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::*;

/// A declared build target: the static tuple of a label, a source selection, a visibility scope,
/// and a dependency list, as read from a buildfile.
///
#[derive(Builder, Debug, Clone, Serialize, Deserialize)]
#[builder(build_fn(error = "TargetError"))]
pub struct Target {
    label: Label,

    #[builder(default)]
    srcs: SourceGlobs,

    #[builder(default)]
    visibility: Visibility,

    #[builder(default)]
    deps: Vec<Label>,

    /// The buildfile this target was declared in.
    #[builder(setter(into))]
    buildfile: PathBuf,
}

impl Target {
    pub fn builder() -> TargetBuilder {
        TargetBuilder::default()
    }

    pub fn label(&self) -> &Label {
        &self.label
    }

    pub fn name(&self) -> &str {
        self.label.name()
    }

    pub fn package(&self) -> &Path {
        self.label.package()
    }

    pub fn srcs(&self) -> &SourceGlobs {
        &self.srcs
    }

    pub fn visibility(&self) -> &Visibility {
        &self.visibility
    }

    pub fn deps(&self) -> &[Label] {
        &self.deps
    }

    pub fn buildfile(&self) -> &Path {
        &self.buildfile
    }
}

impl AsRef<Label> for Target {
    fn as_ref(&self) -> &Label {
        &self.label
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        self.label.fmt(fmt)
    }
}

#[derive(Error, Debug)]
pub enum TargetError {
    #[error(transparent)]
    BuilderError(derive_builder::UninitializedFieldError),
}

impl From<derive_builder::UninitializedFieldError> for TargetError {
    fn from(value: derive_builder::UninitializedFieldError) -> Self {
        TargetError::BuilderError(value)
    }
}
