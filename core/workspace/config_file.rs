use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::*;
use tokio::fs;

/// A struct representing a `Workspace.toml` file. This struct is a 1:1 mapping to the TOML file
/// to be able to easily derive the ser/de.
///
#[derive(Clone, Default, Debug, Serialize, Deserialize)]
pub struct WorkspaceConfigFile {
    pub workspace: WorkspaceSection,

    #[serde(default)]
    pub external: BTreeMap<String, ExternalSection>,
}

#[derive(Clone, Default, Debug, Serialize, Deserialize)]
pub struct WorkspaceSection {
    pub name: String,

    #[serde(default)]
    pub test_patterns: Vec<String>,
}

#[derive(Clone, Default, Debug, Serialize, Deserialize)]
pub struct ExternalSection {
    pub path: PathBuf,

    #[serde(default)]
    pub url: Option<String>,
}

impl WorkspaceConfigFile {
    pub async fn read(path: &Path) -> Result<Self, WorkspaceConfigFileError> {
        let contents = fs::read_to_string(&path).await.map_err(|err| {
            WorkspaceConfigFileError::CouldNotReadFile {
                path: path.into(),
                err,
            }
        })?;

        toml::from_str(&contents).map_err(|err| WorkspaceConfigFileError::ParseError {
            path: path.into(),
            err,
        })
    }
}

#[derive(Error, Debug)]
pub enum WorkspaceConfigFileError {
    #[error("Could not parse workspace file at {path:?}: {err}")]
    ParseError { path: PathBuf, err: toml::de::Error },

    #[error("Could not read workspace file at {path:?} due to {err:?}")]
    CouldNotReadFile { path: PathBuf, err: std::io::Error },
}
