use super::{Workspace, WorkspaceConfigFile, WorkspaceConfigFileError, WorkspaceError, WORKSPACE_FILE};
use crate::model::{ExternalRepo, ExternalRepoError};
use crate::Config;
use std::path::{Path, PathBuf};
use thiserror::*;
use tokio::fs;
use tracing::*;

pub struct WorkspaceFinder;

/// The WorkspaceFinder implements the heuristics for finding a workspace from an invocation
/// directory.
///
/// This allows us to run `quarry` anywhere within a workspace and still find it.
///
impl WorkspaceFinder {
    pub async fn find(config: &Config) -> Result<Workspace, WorkspaceFinderError> {
        let (root, config_file) = Self::find_upwards(config).await?;

        let mut external_repos = vec![];
        for (alias, section) in &config_file.external {
            if let Some(url) = &section.url {
                url::Url::parse(url).map_err(|err| WorkspaceFinderError::InvalidExternalUrl {
                    alias: alias.clone(),
                    url: url.clone(),
                    err,
                })?;
            }

            let mut repo = ExternalRepo::builder();
            repo.alias(alias.clone()).path(section.path.clone());
            if let Some(url) = &section.url {
                repo.url(url.clone());
            }
            external_repos.push(repo.build()?);
        }

        let workspace = Workspace::builder()
            .root(root)
            .name(config_file.workspace.name)
            .test_patterns(config_file.workspace.test_patterns)
            .external_repos(external_repos)
            .build()?;

        Ok(workspace)
    }

    #[tracing::instrument(name = "WorkspaceFinder::find_upwards", skip(config))]
    async fn find_upwards(
        config: &Config,
    ) -> Result<(PathBuf, WorkspaceConfigFile), WorkspaceFinderError> {
        let mut cwd: Option<&Path> = Some(config.invocation_dir());
        while let Some(dir) = cwd {
            let here = dir.join(WORKSPACE_FILE);
            if fs::metadata(&here).await.is_ok() {
                let root = dir.canonicalize().map_err(|err| {
                    WorkspaceFinderError::CouldNotCanonicalizeRoot {
                        root: dir.to_path_buf(),
                        err,
                    }
                })?;
                debug!("found workspace file at {:?}", &here);
                let config_file = WorkspaceConfigFile::read(&here).await?;
                return Ok((root, config_file));
            }

            if config.search_stop_path().map(|p| p.as_path()) == Some(dir) {
                break;
            }
            cwd = dir.parent();
        }

        Err(WorkspaceFinderError::WorkspaceFileNotFound)
    }
}

#[derive(Error, Debug)]
pub enum WorkspaceFinderError {
    #[error(transparent)]
    WorkspaceConfigFileError(WorkspaceConfigFileError),

    #[error(transparent)]
    WorkspaceError(WorkspaceError),

    #[error(transparent)]
    ExternalRepoError(ExternalRepoError),

    #[error("External repository @{alias} declares an invalid url {url:?}: {err}")]
    InvalidExternalUrl {
        alias: String,
        url: String,
        err: url::ParseError,
    },

    #[error("Could not canonicalize the workspace root at {root:?} due to {err:?}")]
    CouldNotCanonicalizeRoot { root: PathBuf, err: std::io::Error },

    #[error("Could not find a workspace while walking upwards from the current directory. Are you sure there is a Workspace.toml here?")]
    WorkspaceFileNotFound,
}

impl From<WorkspaceConfigFileError> for WorkspaceFinderError {
    fn from(err: WorkspaceConfigFileError) -> Self {
        Self::WorkspaceConfigFileError(err)
    }
}

impl From<WorkspaceError> for WorkspaceFinderError {
    fn from(err: WorkspaceError) -> Self {
        Self::WorkspaceError(err)
    }
}

impl From<ExternalRepoError> for WorkspaceFinderError {
    fn from(err: ExternalRepoError) -> Self {
        Self::ExternalRepoError(err)
    }
}
