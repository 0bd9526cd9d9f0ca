use serde::de::{SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::*;

/// The declared scope controlling which packages may depend on a target.
///
/// `Public` admits everyone, `Private` admits only the declaring package, and `Scopes` admits the
/// declaring package plus an explicit list of package scopes. A scope is written `//pkg` for a
/// single package or `//pkg/...` for a whole subtree.
///
/// In a buildfile this is written either as a string or as a scope list:
///
/// ```toml
/// visibility = "public"
/// visibility = ["//googleapi", "//gensupport/..."]
/// ```
///
#[derive(Default, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Visibility {
    #[default]
    Public,
    Private,
    Scopes(Vec<Scope>),
}

impl Visibility {
    /// Whether a target declared in `declaring_package` with this visibility may be depended on
    /// from `dependent_package`. A package can always see its own targets.
    ///
    pub fn admits(&self, declaring_package: &Path, dependent_package: &Path) -> bool {
        if declaring_package == dependent_package {
            return true;
        }
        match self {
            Visibility::Public => true,
            Visibility::Private => false,
            Visibility::Scopes(scopes) => scopes.iter().any(|s| s.admits(dependent_package)),
        }
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Private => write!(f, "private"),
            Visibility::Scopes(scopes) => {
                let scopes: Vec<String> = scopes.iter().map(|s| s.to_string()).collect();
                write!(f, "[{}]", scopes.join(", "))
            }
        }
    }
}

/// One entry of a visibility scope list.
///
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Scope {
    package: PathBuf,
    subtree: bool,
}

impl Scope {
    pub fn package<P: Into<PathBuf>>(package: P) -> Self {
        Self {
            package: package.into(),
            subtree: false,
        }
    }

    pub fn subtree<P: Into<PathBuf>>(package: P) -> Self {
        Self {
            package: package.into(),
            subtree: true,
        }
    }

    pub fn admits(&self, package: &Path) -> bool {
        if self.subtree {
            package.starts_with(&self.package)
        } else {
            package == self.package
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.subtree {
            return write!(f, "//{}", self.package.display());
        }
        if self.package.as_os_str().is_empty() {
            write!(f, "//...")
        } else {
            write!(f, "//{}/...", self.package.display())
        }
    }
}

impl std::str::FromStr for Scope {
    type Err = VisibilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let path = s
            .strip_prefix("//")
            .ok_or_else(|| VisibilityError::UnanchoredScope { scope: s.into() })?;

        if path == "..." {
            return Ok(Self::subtree(""));
        }
        if let Some(package) = path.strip_suffix("/...") {
            return Ok(Self::subtree(package));
        }
        Ok(Self::package(path))
    }
}

#[derive(Error, Debug)]
pub enum VisibilityError {
    #[error("Visibility scope {scope:?} should start with //, like //googleapi or //gensupport/...")]
    UnanchoredScope { scope: String },

    #[error("Visibility should be \"public\", \"private\", or a list of package scopes, but found {found:?}")]
    UnknownVisibility { found: String },
}

impl Serialize for Visibility {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Visibility::Public => serializer.serialize_str("public"),
            Visibility::Private => serializer.serialize_str("private"),
            Visibility::Scopes(scopes) => {
                let mut seq = serializer.serialize_seq(Some(scopes.len()))?;
                for scope in scopes {
                    seq.serialize_element(&scope.to_string())?;
                }
                seq.end()
            }
        }
    }
}

struct VisibilityVisitor;

impl<'de> Visitor<'de> for VisibilityVisitor {
    type Value = Visibility;

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        match v {
            "public" => Ok(Visibility::Public),
            "private" => Ok(Visibility::Private),
            found => Err(E::custom(VisibilityError::UnknownVisibility {
                found: found.into(),
            })),
        }
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut scopes = vec![];
        while let Some(scope) = seq.next_element::<String>()? {
            scopes.push(scope.parse().map_err(serde::de::Error::custom)?);
        }
        Ok(Visibility::Scopes(scopes))
    }

    fn expecting(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "\"public\", \"private\", or a list of package scopes")
    }
}

impl<'de> Deserialize<'de> for Visibility {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_any(VisibilityVisitor)
    }
}
