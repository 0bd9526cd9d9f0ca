//! # Reading build manifests.
//!
//! Every package directory in a workspace may carry a `Build.toml` declaring the targets that
//! live there. The `ManifestScanner` walks the workspace tree collecting them; each file is
//! parsed into a `Buildfile` whose targets carry labels derived from the file's location.
//!

mod buildfile;
mod scanner;

pub use buildfile::*;
pub use scanner::*;

pub const BUILDFILE: &str = "Build.toml";
