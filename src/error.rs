//! Error types for layer materialization.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Result type for materialization operations.
pub type Result<T> = std::result::Result<T, MaterializeError>;

/// Broad classification of a [`MaterializeError`].
///
/// Hosts use this to decide how loudly to fail: a configuration error
/// raised before the backup leaves the workspace untouched, while a
/// restoration failure needs an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The workspace or a package is not laid out as expected.
    Configuration,
    /// A filesystem operation failed mid-run.
    Io,
    /// The original `node_modules` could not be put back.
    Restoration,
}

/// Errors that can occur while materializing a layer.
#[derive(Error, Debug, Diagnostic)]
pub enum MaterializeError {
    #[error("Unable to find package.json at workspace root {}", root.display())]
    #[diagnostic(
        code(workspace_layer::workspace_manifest_not_found),
        help("Set `workspaceRootDirectoryPath` to the directory holding the workspace package.json")
    )]
    WorkspaceManifestNotFound { root: PathBuf },

    #[error("Workspace package.json at {} does not have a workspaces key", path.display())]
    #[diagnostic(
        code(workspace_layer::missing_workspaces),
        help("Declare the workspace members, e.g. `\"workspaces\": [\"packages/*\"]`")
    )]
    MissingWorkspaces { path: PathBuf },

    #[error("Package manifest not found at {}", path.display())]
    #[diagnostic(
        code(workspace_layer::manifest_not_found),
        help("Run the command from the package being deployed, or pass --package-dir")
    )]
    ManifestNotFound { path: PathBuf },

    #[error("Failed to parse {}: {source}", path.display())]
    #[diagnostic(code(workspace_layer::manifest_parse_failed))]
    ManifestParse {
        #[source]
        source: serde_json::Error,
        path: PathBuf,
    },

    #[error("Workspace node_modules folder not found at {}", path.display())]
    #[diagnostic(
        code(workspace_layer::shared_dir_missing),
        help("Run `npm install` at the workspace root before packaging")
    )]
    SharedDirMissing { path: PathBuf },

    #[error("Workspace node_modules folder not found after install at {}", path.display())]
    #[diagnostic(
        code(workspace_layer::install_output_missing),
        help("Check the npm output above; the install produced no node_modules")
    )]
    InstallOutputMissing { path: PathBuf },

    #[error("Internal dependency `{name}` is linked in node_modules but no workspace package declares it")]
    #[diagnostic(
        code(workspace_layer::package_not_in_catalog),
        help("Make sure the package directory sits next to the deployed package and has a package.json")
    )]
    PackageNotInCatalog { name: String },

    #[error("Cyclic internal dependency: {}", chain.join(" -> "))]
    #[diagnostic(
        code(workspace_layer::dependency_cycle),
        help("Break the cycle between workspace packages; internal dependencies must form a DAG")
    )]
    DependencyCycle { chain: Vec<String> },

    #[error("I/O error during {operation} at {}: {source}", path.display())]
    #[diagnostic(code(workspace_layer::io_error))]
    Io {
        #[source]
        source: std::io::Error,
        path: PathBuf,
        operation: String,
    },

    #[error("Failed to copy {} to {}: {message}", from.display(), to.display())]
    #[diagnostic(code(workspace_layer::copy_failed))]
    CopyFailed {
        from: PathBuf,
        to: PathBuf,
        message: String,
    },

    #[error(
        "Failed to restore {} from {}: {source}{}",
        live.display(),
        backup.display(),
        cause.as_ref().map(|c| format!(" (run had already failed: {c})")).unwrap_or_default()
    )]
    #[diagnostic(
        code(workspace_layer::restore_failed),
        help("Restore the workspace by hand: move the backup directory back to node_modules")
    )]
    RestoreFailed {
        #[source]
        source: std::io::Error,
        live: PathBuf,
        backup: PathBuf,
        /// The error that interrupted the run before restoration, if any.
        cause: Option<String>,
    },
}

impl MaterializeError {
    /// Build an I/O error for `operation` on `path`.
    pub fn io(source: std::io::Error, operation: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        MaterializeError::Io {
            source,
            path: path.into(),
            operation: operation.into(),
        }
    }

    /// Build a copy error from a filesystem helper failure.
    pub fn copy(err: anyhow::Error, from: impl Into<PathBuf>, to: impl Into<PathBuf>) -> Self {
        MaterializeError::CopyFailed {
            from: from.into(),
            to: to.into(),
            message: format!("{:#}", err),
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MaterializeError::Io { .. } | MaterializeError::CopyFailed { .. } => ErrorKind::Io,
            MaterializeError::RestoreFailed { .. } => ErrorKind::Restoration,
            _ => ErrorKind::Configuration,
        }
    }

    /// Whether this error is a configuration problem.
    pub fn is_configuration(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }
}
