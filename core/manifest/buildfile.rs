use super::BUILDFILE;
use crate::model::{Label, LabelError, SourceGlobs, Target, TargetError, Visibility};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::*;
use tokio::fs;
use tracing::*;

/// A parsed `Build.toml`: the targets declared in one package directory.
///
/// The package path of every target is the buildfile's directory relative to the workspace root,
/// so moving a buildfile moves its targets.
///
#[derive(Default, Debug, Clone)]
pub struct Buildfile {
    path: PathBuf,
    package: PathBuf,
    targets: Vec<Target>,
}

/// 1:1 mapping to the TOML document, converted into model types after parsing.
#[derive(Debug, Deserialize)]
struct BuildfileDoc {
    #[serde(default, rename = "target")]
    targets: Vec<TargetDoc>,
}

#[derive(Debug, Deserialize)]
struct TargetDoc {
    name: String,

    #[serde(default)]
    srcs: Vec<String>,

    #[serde(default)]
    exclude: Vec<String>,

    #[serde(default)]
    visibility: Visibility,

    #[serde(default)]
    deps: Vec<String>,
}

impl Buildfile {
    #[tracing::instrument(name = "Buildfile::read")]
    pub async fn read(workspace_root: &Path, path: &Path) -> Result<Self, BuildfileError> {
        let contents =
            fs::read_to_string(path)
                .await
                .map_err(|err| BuildfileError::CouldNotReadFile {
                    file: path.into(),
                    err,
                })?;

        let doc: BuildfileDoc =
            toml::from_str(&contents).map_err(|err| BuildfileError::ParseError {
                file: path.into(),
                err,
            })?;

        let package = path
            .parent()
            .and_then(|dir| dir.strip_prefix(workspace_root).ok())
            .ok_or_else(|| BuildfileError::FileOutsideWorkspace {
                file: path.into(),
                root: workspace_root.into(),
            })?
            .to_path_buf();

        let mut targets = vec![];
        for target_doc in doc.targets {
            targets.push(Self::into_target(&package, path, target_doc)?);
        }

        debug!("parsed {} targets from {:?}", targets.len(), path);

        Ok(Self {
            path: path.to_path_buf(),
            package,
            targets,
        })
    }

    fn into_target(
        package: &Path,
        path: &Path,
        doc: TargetDoc,
    ) -> Result<Target, BuildfileError> {
        if doc.name.is_empty() || doc.name.contains(['/', ':', '@']) {
            return Err(BuildfileError::InvalidTargetName {
                file: path.into(),
                name: doc.name,
            });
        }

        let mut deps = vec![];
        for dep in &doc.deps {
            let dep = Label::parse_in_package(package, dep).map_err(|err| {
                BuildfileError::MalformedDependency {
                    file: path.into(),
                    target: doc.name.clone(),
                    err,
                }
            })?;
            deps.push(dep);
        }

        let target = Target::builder()
            .label(Label::local(package, &doc.name))
            .srcs(SourceGlobs::new(doc.srcs, doc.exclude))
            .visibility(doc.visibility)
            .deps(deps)
            .buildfile(path)
            .build()?;

        Ok(target)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn package(&self) -> &Path {
        &self.package
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }
}

impl std::fmt::Display for Buildfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "//{}/{}", self.package.display(), BUILDFILE)
    }
}

#[derive(Error, Debug)]
pub enum BuildfileError {
    #[error("Could not read buildfile at {file:?} due to {err:?}")]
    CouldNotReadFile { file: PathBuf, err: std::io::Error },

    #[error("Could not parse buildfile at {file:?}: {err}")]
    ParseError { file: PathBuf, err: toml::de::Error },

    #[error("Buildfile at {file:?} is not inside the workspace rooted at {root:?}")]
    FileOutsideWorkspace { file: PathBuf, root: PathBuf },

    #[error("Target name {name:?} in {file:?} should be a plain identifier, without /, :, or @")]
    InvalidTargetName { file: PathBuf, name: String },

    #[error("Target {target:?} in {file:?} has a malformed dependency: {err}")]
    MalformedDependency {
        file: PathBuf,
        target: String,
        err: LabelError,
    },

    #[error(transparent)]
    TargetError(TargetError),
}

impl From<TargetError> for BuildfileError {
    fn from(value: TargetError) -> Self {
        BuildfileError::TargetError(value)
    }
}
