use super::SourceSet;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::*;
use tracing::*;

/// The source-file selection of a target: a list of include globs and a list of exclude globs,
/// both relative to the target's package directory.
///
/// A `*` never crosses a directory boundary; use `**` to select recursively.
///
#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceGlobs {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl SourceGlobs {
    pub fn new(include: Vec<String>, exclude: Vec<String>) -> Self {
        Self { include, exclude }
    }

    pub fn include(&self) -> &[String] {
        &self.include
    }

    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    /// Whether there is anything to select at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.include.is_empty()
    }

    pub fn matcher(&self) -> Result<SourceMatcher, SourceGlobsError> {
        Ok(SourceMatcher {
            include: build_glob_set(&self.include)?,
            exclude: build_glob_set(&self.exclude)?,
        })
    }

    /// Expand the globs against a package directory, returning the selected files relative to it.
    ///
    #[tracing::instrument(name = "SourceGlobs::expand")]
    pub fn expand(&self, package_root: &Path) -> Result<SourceSet, SourceGlobsError> {
        let matcher = self.matcher()?;

        let mut sources = SourceSet::default();
        for entry in WalkBuilder::new(package_root).build() {
            let entry = entry.map_err(|err| SourceGlobsError::WalkError {
                root: package_root.to_path_buf(),
                err,
            })?;

            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }

            let file = match entry.path().strip_prefix(package_root) {
                Ok(file) => file.to_path_buf(),
                Err(_) => continue,
            };

            if matcher.is_match(&file) {
                sources.add(file);
            }
        }

        trace!("expanded {:?} into {} files", self, sources.len());

        Ok(sources)
    }
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet, SourceGlobsError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|err| SourceGlobsError::InvalidPattern {
                pattern: pattern.clone(),
                err,
            })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|err| SourceGlobsError::InvalidPattern {
            pattern: patterns.join(", "),
            err,
        })
}

/// Compiled include/exclude matchers for one target's source globs.
///
#[derive(Debug)]
pub struct SourceMatcher {
    include: GlobSet,
    exclude: GlobSet,
}

impl SourceMatcher {
    pub fn is_match(&self, file: &Path) -> bool {
        self.include.is_match(file) && !self.exclude.is_match(file)
    }
}

#[derive(Error, Debug)]
pub enum SourceGlobsError {
    #[error("Could not compile glob pattern {pattern:?}: {err:?}")]
    InvalidPattern { pattern: String, err: globset::Error },

    #[error("Could not walk sources under {root:?}: {err:?}")]
    WalkError { root: PathBuf, err: ignore::Error },
}
