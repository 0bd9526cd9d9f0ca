use super::{Buildfile, BuildfileError, BUILDFILE};
use crate::workspace::Workspace;
use ignore::WalkBuilder;
use std::path::PathBuf;
use thiserror::*;
use tracing::*;

/// Walks a workspace tree collecting every buildfile in it.
///
/// External repository checkouts are skipped: vendored third-party trees are opaque to quarry and
/// anything that looks like a buildfile inside them belongs to the vendored project, not to this
/// workspace.
///
#[derive(Debug, Clone)]
pub struct ManifestScanner {
    workspace: Workspace,
}

impl ManifestScanner {
    pub fn new(workspace: &Workspace) -> Self {
        Self {
            workspace: workspace.clone(),
        }
    }

    #[tracing::instrument(name = "ManifestScanner::scan", skip(self))]
    pub async fn scan(&self) -> Result<Vec<Buildfile>, ScannerError> {
        let root = self.workspace.root();

        let external_roots: Vec<PathBuf> = self
            .workspace
            .external_repos()
            .iter()
            .map(|repo| root.join(repo.path()))
            .collect();

        let mut paths: Vec<PathBuf> = vec![];
        for entry in WalkBuilder::new(root).build() {
            let entry = entry.map_err(ScannerError::WalkError)?;

            if entry.file_name() != std::ffi::OsStr::new(BUILDFILE) {
                continue;
            }
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            if external_roots.iter().any(|ext| entry.path().starts_with(ext)) {
                trace!("skipping vendored buildfile at {:?}", entry.path());
                continue;
            }

            paths.push(entry.path().to_path_buf());
        }
        paths.sort();

        let mut buildfiles = vec![];
        for path in paths {
            buildfiles.push(Buildfile::read(root, &path).await?);
        }

        debug!(
            "found {} buildfiles under {:?}",
            buildfiles.len(),
            self.workspace.root()
        );

        Ok(buildfiles)
    }
}

#[derive(Error, Debug)]
pub enum ScannerError {
    #[error("Could not walk the workspace tree: {0:?}")]
    WalkError(ignore::Error),

    #[error(transparent)]
    BuildfileError(BuildfileError),
}

impl From<BuildfileError> for ScannerError {
    fn from(err: BuildfileError) -> Self {
        Self::BuildfileError(err)
    }
}
