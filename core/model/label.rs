use serde::de::Visitor;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::*;

/// A Label names a single target declared somewhere in a workspace.
///
/// Labels come in two flavors: local labels point at a target declared in one of this workspace's
/// buildfiles, and external labels point into a vendored repository that was declared under an
/// alias in the workspace file.
///
/// The canonical syntax is:
///
/// * `//path/to/pkg:name` for local labels,
/// * `//path/to/pkg` as shorthand where the name is the last path segment,
/// * `@alias//path/to/pkg:name` for external labels.
///
/// Package-relative labels (`:name`, or a bare `name`) only mean something inside a buildfile, so
/// they are handled by [Label::parse_in_package] and rejected by the [std::str::FromStr] impl.
///
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Label {
    Local(LocalLabel),
    External(ExternalLabel),
}

impl Label {
    pub fn local<P, N>(package: P, name: N) -> Self
    where
        P: Into<PathBuf>,
        N: Into<String>,
    {
        Self::Local(LocalLabel {
            package: package.into(),
            name: name.into(),
        })
    }

    pub fn external<R, P, N>(repo: R, package: P, name: N) -> Self
    where
        R: Into<String>,
        P: Into<PathBuf>,
        N: Into<String>,
    {
        Self::External(ExternalLabel {
            repo: repo.into(),
            package: package.into(),
            name: name.into(),
        })
    }

    /// Parse a dependency reference as written inside the buildfile of `package`.
    ///
    /// On top of the absolute forms, this accepts `:name` and bare `name` references to targets
    /// within the same package.
    ///
    pub fn parse_in_package(package: &Path, s: &str) -> Result<Self, LabelError> {
        if s.starts_with("//") || s.starts_with('@') {
            return s.parse();
        }

        let name = s.strip_prefix(':').unwrap_or(s);
        if name.is_empty() {
            return Err(LabelError::MissingName { label: s.into() });
        }
        if name.contains('/') || name.contains(':') {
            return Err(LabelError::MalformedName {
                label: s.into(),
                name: name.into(),
            });
        }

        Ok(Self::local(package, name))
    }

    pub fn name(&self) -> &str {
        match self {
            Label::Local(l) => &l.name,
            Label::External(e) => &e.name,
        }
    }

    pub fn package(&self) -> &Path {
        match self {
            Label::Local(l) => &l.package,
            Label::External(e) => &e.package,
        }
    }

    /// The external repository alias this label points into, if any.
    pub fn repo(&self) -> Option<&str> {
        match self {
            Label::Local(_) => None,
            Label::External(e) => Some(&e.repo),
        }
    }

    pub fn is_external(&self) -> bool {
        matches!(self, Label::External(_))
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Label::Local(l) => l.fmt(f),
            Label::External(e) => e.fmt(f),
        }
    }
}

impl std::str::FromStr for Label {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(rest) = s.strip_prefix('@') {
            let (repo, path_part) = rest.split_once("//").ok_or_else(|| {
                LabelError::MissingPackage { label: s.into() }
            })?;
            if repo.is_empty() {
                return Err(LabelError::MissingRepository { label: s.into() });
            }
            let (package, name) = split_package_and_name(s, path_part)?;
            return Ok(Self::external(repo, package, name));
        }

        if let Some(path_part) = s.strip_prefix("//") {
            let (package, name) = split_package_and_name(s, path_part)?;
            return Ok(Self::local(package, name));
        }

        Err(LabelError::UnanchoredLabel { label: s.into() })
    }
}

fn split_package_and_name(label: &str, path_part: &str) -> Result<(PathBuf, String), LabelError> {
    let (package, name) = if let Some((package, name)) = path_part.split_once(':') {
        (package.to_string(), name.to_string())
    } else {
        let name = path_part
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        (path_part.to_string(), name)
    };

    if name.is_empty() {
        return Err(LabelError::MissingName {
            label: label.into(),
        });
    }
    if name.contains('/') || name.contains(':') {
        return Err(LabelError::MalformedName {
            label: label.into(),
            name,
        });
    }
    if package.starts_with('/') || package.ends_with('/') {
        return Err(LabelError::MalformedPackage {
            label: label.into(),
            package,
        });
    }

    Ok((PathBuf::from(package), name))
}

impl Serialize for Label {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

struct LabelVisitor;

impl Visitor<'_> for LabelVisitor {
    type Value = Label;

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        v.parse().map_err(E::custom)
    }

    fn expecting(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "a label like //pkg:name or @alias//pkg:name")
    }
}

impl<'de> Deserialize<'de> for Label {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_str(LabelVisitor)
    }
}

/// A label to a target declared in this workspace.
///
#[derive(Default, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LocalLabel {
    package: PathBuf,
    name: String,
}

impl LocalLabel {
    pub fn package(&self) -> &Path {
        &self.package
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for LocalLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "//{}:{}", self.package.display(), self.name)
    }
}

/// A label into a vendored repository declared under an alias in the workspace file.
///
#[derive(Default, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExternalLabel {
    repo: String,
    package: PathBuf,
    name: String,
}

impl ExternalLabel {
    pub fn repo(&self) -> &str {
        &self.repo
    }

    pub fn package(&self) -> &Path {
        &self.package
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for ExternalLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "@{}//{}:{}", self.repo, self.package.display(), self.name)
    }
}

#[derive(Error, Debug)]
pub enum LabelError {
    #[error("Label {label:?} should start with // for local targets or @ for external ones")]
    UnanchoredLabel { label: String },

    #[error("Label {label:?} is missing a target name")]
    MissingName { label: String },

    #[error("Label {label:?} is missing a package path after the repository alias")]
    MissingPackage { label: String },

    #[error("Label {label:?} is missing a repository alias between @ and //")]
    MissingRepository { label: String },

    #[error("Label {label:?} has a malformed target name {name:?}")]
    MalformedName { label: String, name: String },

    #[error("Label {label:?} has a malformed package path {package:?}")]
    MalformedPackage { label: String, package: String },
}
