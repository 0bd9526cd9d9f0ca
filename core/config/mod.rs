use std::path::PathBuf;
use thiserror::*;

/// A collection of flags and options that affect how quarry runs. This is not specific to one
/// workspace, it relates to quarry itself.
///
#[derive(Builder, Debug, Clone)]
#[builder(build_fn(error = "ConfigError"))]
pub struct Config {
    /// The current working directory of quarry.
    #[builder(default = "self.default_invocation_dir()", setter(into))]
    invocation_dir: PathBuf,

    /// The uppermost directory in the file system in which to search for workspace files.
    #[builder(setter(into, strip_option), default = "None")]
    search_stop_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::builder().build().unwrap()
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    pub fn invocation_dir(&self) -> &PathBuf {
        &self.invocation_dir
    }

    pub fn search_stop_path(&self) -> Option<&PathBuf> {
        self.search_stop_path.as_ref()
    }
}

impl ConfigBuilder {
    fn default_invocation_dir(&self) -> PathBuf {
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    BuilderError(derive_builder::UninitializedFieldError),
}

impl From<derive_builder::UninitializedFieldError> for ConfigError {
    fn from(value: derive_builder::UninitializedFieldError) -> Self {
        ConfigError::BuilderError(value)
    }
}
