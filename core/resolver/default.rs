use super::TargetRegistry;
use crate::model::{Label, TargetId};
use crate::workspace::Workspace;
use std::sync::Arc;
use tracing::*;

/// What a single dependency reference resolved to.
///
/// Every dependency of every target must land in one of the first two variants for the manifest
/// set to be valid: local references must name a declared target, external references must point
/// into a declared repository alias.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepResolution {
    /// The dependency is a target declared in this workspace.
    Local(TargetId),

    /// The dependency points into a declared external repository. Its internals are opaque,
    /// resolution stops at the alias.
    External { repo: String },

    /// A local reference that matches no declared target.
    UnresolvedLocal,

    /// An external reference whose alias is not declared in the workspace file.
    UnknownExternal { repo: String },
}

/// Resolves dependency references against the targets declared in a workspace and the external
/// repository aliases its workspace file declares.
///
#[derive(Debug, Clone)]
pub struct DependencyResolver {
    workspace: Workspace,
    registry: Arc<TargetRegistry>,
}

impl DependencyResolver {
    pub fn new(workspace: Workspace, registry: Arc<TargetRegistry>) -> Self {
        Self {
            workspace,
            registry,
        }
    }

    #[tracing::instrument(name = "DependencyResolver::resolve", skip(self))]
    pub fn resolve(&self, dep: &Label) -> DepResolution {
        match dep {
            Label::Local(_) => match self.registry.find_label(dep) {
                Some(id) => DepResolution::Local(id),
                None => DepResolution::UnresolvedLocal,
            },
            Label::External(ext) => {
                if self.workspace.external_repo(ext.repo()).is_some() {
                    DepResolution::External {
                        repo: ext.repo().to_string(),
                    }
                } else {
                    DepResolution::UnknownExternal {
                        repo: ext.repo().to_string(),
                    }
                }
            }
        }
    }

    pub fn registry(&self) -> &Arc<TargetRegistry> {
        &self.registry
    }
}
