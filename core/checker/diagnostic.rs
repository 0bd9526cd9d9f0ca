use crate::model::Label;
use std::path::PathBuf;
use std::sync::Arc;

/// One problem found while validating a workspace's manifests.
///
/// Diagnostics are accumulated, never returned early: a check run reports everything that is
/// wrong with the manifest set at once.
///
#[derive(Debug, Clone)]
pub enum Diagnostic {
    /// The same label is declared by more than one buildfile.
    DuplicateTarget {
        label: Arc<Label>,
        buildfile: PathBuf,
        existing_buildfile: PathBuf,
    },

    /// A dependency reference that matches no declared target.
    UnresolvedDependency { target: Arc<Label>, dep: Label },

    /// A dependency reference into an external repository alias that was never declared.
    UnknownExternalRepository {
        target: Arc<Label>,
        dep: Label,
        repo: String,
    },

    /// A declared external repository whose vendored checkout does not exist on disk.
    MissingExternalRepository { alias: String, path: PathBuf },

    /// A set of targets that transitively depend on themselves.
    DependencyCycle { members: Vec<Arc<Label>> },

    /// A target whose source globs matched no files at all.
    EmptySourceGlob { target: Arc<Label> },

    /// A target whose sources include files matching the workspace's test patterns.
    TestSourcesIncluded {
        target: Arc<Label>,
        files: Vec<PathBuf>,
    },

    /// A target depending on another target whose visibility does not admit it.
    VisibilityViolation { target: Arc<Label>, dep: Arc<Label> },
}

impl Diagnostic {
    /// Whether this diagnostic makes a build plan impossible. Source and visibility lints fail a
    /// check but leave the graph well-defined.
    ///
    pub fn blocks_planning(&self) -> bool {
        matches!(
            self,
            Diagnostic::DuplicateTarget { .. }
                | Diagnostic::UnresolvedDependency { .. }
                | Diagnostic::UnknownExternalRepository { .. }
                | Diagnostic::DependencyCycle { .. }
        )
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::DuplicateTarget {
                label,
                buildfile,
                existing_buildfile,
            } => write!(
                f,
                "duplicate target {label}: declared in {} but already declared in {}",
                buildfile.display(),
                existing_buildfile.display()
            ),
            Diagnostic::UnresolvedDependency { target, dep } => write!(
                f,
                "unresolved dependency: {target} depends on {dep}, which no buildfile declares"
            ),
            Diagnostic::UnknownExternalRepository { target, dep, repo } => write!(
                f,
                "unknown external repository: {target} depends on {dep}, but @{repo} is not declared in the workspace file"
            ),
            Diagnostic::MissingExternalRepository { alias, path } => write!(
                f,
                "missing external repository: @{alias} is declared at {} but there is no vendored checkout there",
                path.display()
            ),
            Diagnostic::DependencyCycle { members } => {
                let members: Vec<String> = members.iter().map(|l| l.to_string()).collect();
                write!(f, "dependency cycle between: {}", members.join(", "))
            }
            Diagnostic::EmptySourceGlob { target } => {
                write!(f, "empty source glob: the srcs of {target} matched no files")
            }
            Diagnostic::TestSourcesIncluded { target, files } => {
                let files: Vec<String> =
                    files.iter().map(|p| p.display().to_string()).collect();
                write!(
                    f,
                    "test sources included: the srcs of {target} should exclude {}",
                    files.join(", ")
                )
            }
            Diagnostic::VisibilityViolation { target, dep } => write!(
                f,
                "visibility violation: {dep} is not visible to {target}"
            ),
        }
    }
}

/// Every diagnostic a check run found.
///
#[derive(Default, Debug, Clone)]
pub struct CheckReport {
    diagnostics: Vec<Diagnostic>,
}

impl CheckReport {
    pub(crate) fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Whether any diagnostic leaves the dependency graph in a state where no plan exists.
    pub fn blocks_planning(&self) -> bool {
        self.diagnostics.iter().any(|d| d.blocks_planning())
    }
}
