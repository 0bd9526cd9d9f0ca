use fxhash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The set of files a target's source globs expanded to, relative to the target's package.
///
#[derive(Default, Clone, Debug, Serialize, Deserialize)]
pub struct SourceSet {
    _inner: FxHashSet<PathBuf>,
}

impl SourceSet {
    pub fn files(&self) -> &FxHashSet<PathBuf> {
        &self._inner
    }

    pub fn add(&mut self, s: PathBuf) {
        self._inner.insert(s);
    }

    pub fn len(&self) -> usize {
        self._inner.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self._inner.is_empty()
    }

    /// The files in a stable order, for printing.
    pub fn sorted(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = self._inner.iter().cloned().collect();
        files.sort();
        files
    }
}

impl From<FxHashSet<PathBuf>> for SourceSet {
    fn from(_inner: FxHashSet<PathBuf>) -> Self {
        Self { _inner }
    }
}

impl FromIterator<PathBuf> for SourceSet {
    fn from_iter<I: IntoIterator<Item = PathBuf>>(iter: I) -> Self {
        Self {
            _inner: iter.into_iter().collect(),
        }
    }
}
