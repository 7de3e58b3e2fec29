//! Building a deployable layer without disturbing the workspace.
//!
//! The run parks the developer's hoisted `node_modules`, lets the package
//! manager install only what the deployed package needs, snapshots that
//! into the layer, copies internal packages into the package's own
//! `node_modules`, then puts the original directory back.
//!
//! Runs must not overlap: two concurrent runs race on the backup path.
//! Once the backup exists the process should not be interrupted before
//! restoration; if it is, `node_modules_tmp` holds the original tree and
//! has to be moved back by hand.

use std::fmt;
use std::fs;
use std::path::PathBuf;

use crate::core::catalog::WorkspaceCatalog;
use crate::core::ignore::{read_ignore_file, IgnoreRuleSet};
use crate::core::manifest::PackageManifest;
use crate::core::symlinks::SymlinkIndex;
use crate::core::workspace::{WorkspaceLayout, BACKUP_DIR_NAME};
use crate::error::{MaterializeError, Result};
use crate::ops::copy_deps::{CopiedDependency, DependencyCopier};
use crate::ops::install::{InstallOutcome, Installer};
use crate::plugin::Logger;
use crate::util::fs::{copy_dir_all, remove_path_if_exists};

/// Steps of a run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Validate,
    Backup,
    Install,
    Index,
    Snapshot,
    Resolve,
    Restore,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Validate => "validate",
            Phase::Backup => "backup",
            Phase::Install => "install",
            Phase::Index => "index",
            Phase::Snapshot => "snapshot",
            Phase::Resolve => "resolve",
            Phase::Restore => "restore",
        };
        f.write_str(s)
    }
}

/// Options for a run.
#[derive(Debug, Clone, Default)]
pub struct MaterializeOptions {
    /// Host packaging patterns, folded into the ignore rules.
    pub patterns: Vec<String>,
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct MaterializeReport {
    /// Name the install was scoped to.
    pub package_name: String,
    /// Logical names of the workspace links found after install.
    pub links: Vec<String>,
    /// Internal dependencies copied into the package's node_modules.
    pub dependencies: Vec<CopiedDependency>,
    /// Where third-party dependencies were written.
    pub layer_node_modules: PathBuf,
    /// Files written into the layer.
    pub layer_files: usize,
    pub install: InstallOutcome,
}

/// Everything read before the first mutation.
struct Prepared {
    package_name: String,
    manifest: PackageManifest,
    rules: IgnoreRuleSet,
    catalog: WorkspaceCatalog,
}

/// Build the layer for the package described by `layout`.
///
/// Nothing is modified unless validation succeeds. After the backup,
/// restoration is attempted whatever happens; an earlier failure is
/// returned once the workspace is restored, and a failed restoration is
/// reported as [`MaterializeError::RestoreFailed`].
pub fn materialize(
    layout: &WorkspaceLayout,
    opts: &MaterializeOptions,
    installer: &dyn Installer,
    logger: &dyn Logger,
) -> Result<MaterializeReport> {
    step(logger, Phase::Validate, "starting application packaging");
    let prepared = validate(layout, opts)?;
    tracing::debug!(
        "{} workspace packages, {} ignore rules",
        prepared.catalog.len(),
        prepared.rules.len()
    );

    step(
        logger,
        Phase::Backup,
        &format!("saving workspace dir node_modules to {}", BACKUP_DIR_NAME),
    );
    backup(layout)?;

    let outcome = build_layer(layout, &prepared, installer, logger);

    step(logger, Phase::Restore, "removing temporary files");
    match (outcome, restore(layout)) {
        (Ok(report), Ok(())) => Ok(report),
        (Err(e), Ok(())) => Err(e),
        (outcome, Err(source)) => Err(MaterializeError::RestoreFailed {
            source,
            live: layout.shared_node_modules(),
            backup: layout.backup_node_modules(),
            cause: outcome.err().map(|e| e.to_string()),
        }),
    }
}

fn step(logger: &dyn Logger, phase: Phase, message: &str) {
    tracing::debug!("phase: {}", phase);
    logger.log(message);
}

fn validate(layout: &WorkspaceLayout, opts: &MaterializeOptions) -> Result<Prepared> {
    let root_manifest_path = layout.workspace_manifest();
    if !root_manifest_path.is_file() {
        return Err(MaterializeError::WorkspaceManifestNotFound {
            root: layout.workspace_root().to_path_buf(),
        });
    }
    let root_manifest = PackageManifest::load(&root_manifest_path)?;
    if !root_manifest.has_workspaces() {
        return Err(MaterializeError::MissingWorkspaces {
            path: root_manifest_path,
        });
    }

    let shared = layout.shared_node_modules();
    if !shared.is_dir() {
        return Err(MaterializeError::SharedDirMissing { path: shared });
    }

    let manifest = PackageManifest::load(&layout.package_manifest())?;
    let package_name = match (&manifest.name, layout.package_dir_name()) {
        (Some(name), _) => name.clone(),
        (None, Some(dir_name)) => {
            tracing::warn!(
                "{} has no name, using directory name `{}`",
                layout.package_manifest().display(),
                dir_name
            );
            dir_name
        }
        (None, None) => {
            return Err(MaterializeError::ManifestNotFound {
                path: layout.package_manifest(),
            })
        }
    };

    let rules = IgnoreRuleSet::build(
        &opts.patterns,
        read_ignore_file(layout.workspace_root())?.as_deref(),
        read_ignore_file(layout.package_dir())?.as_deref(),
    );

    let catalog = WorkspaceCatalog::scan(&[layout.workspace_root(), layout.siblings_dir()])?;

    Ok(Prepared {
        package_name,
        manifest,
        rules,
        catalog,
    })
}

fn backup(layout: &WorkspaceLayout) -> Result<()> {
    let live = layout.shared_node_modules();
    let backup = layout.backup_node_modules();

    if fs::symlink_metadata(&backup).is_ok() {
        tracing::warn!("removing stale {}", backup.display());
    }
    remove_path_if_exists(&backup).map_err(|e| MaterializeError::io(e, "removing stale backup", &backup))?;

    fs::rename(&live, &backup).map_err(|e| MaterializeError::io(e, "moving node_modules aside", &live))
}

fn build_layer(
    layout: &WorkspaceLayout,
    prepared: &Prepared,
    installer: &dyn Installer,
    logger: &dyn Logger,
) -> Result<MaterializeReport> {
    let name = &prepared.package_name;

    step(logger, Phase::Install, &format!("generating application {} dependencies", name));
    let install = installer.clean_install(layout.package_dir(), name);
    if let Some(err) = &install.spawn_error {
        logger.log(&format!("{} could not be started: {}", install.command, err));
    }
    if !install.stderr.is_empty() {
        logger.log(&format!("npm ci command stderr output: {}", install.stderr));
    }
    if let Some(code) = install.exit_code.filter(|c| *c != 0) {
        logger.log(&format!("{} exited with status {}", install.command, code));
    }

    let shared = layout.shared_node_modules();
    if !shared.is_dir() {
        logger.log(&format!(
            "workspace node_modules path not found, value is {} (workspace root {} resolved from package {})",
            shared.display(),
            layout.workspace_root().display(),
            layout.package_dir().display(),
        ));
        return Err(MaterializeError::InstallOutputMissing { path: shared });
    }
    step(logger, Phase::Index, "removing workspace package links");
    let links = SymlinkIndex::scan_and_unlink(&shared)?;
    tracing::debug!("found {} workspace package links", links.len());

    let layer_node_modules = layout.layer_node_modules();
    step(
        logger,
        Phase::Snapshot,
        &format!("copying node_modules to {}", layer_node_modules.display()),
    );
    remove_path_if_exists(layout.layer_dir())
        .map_err(|e| MaterializeError::io(e, "clearing layer", layout.layer_dir()))?;
    let stats = copy_dir_all(&shared, &layer_node_modules)
        .map_err(|e| MaterializeError::copy(e, &shared, &layer_node_modules))?;

    step(logger, Phase::Resolve, "copying internal dependencies");
    let dependencies = DependencyCopier::new(&links, &prepared.catalog, &prepared.rules, layout.local_node_modules())
        .copy_all(name, &prepared.manifest)?;

    Ok(MaterializeReport {
        package_name: name.clone(),
        links: links.names().map(str::to_string).collect(),
        dependencies,
        layer_node_modules,
        layer_files: stats.files,
        install,
    })
}

/// Drop the install-time node_modules and move the original back.
fn restore(layout: &WorkspaceLayout) -> std::io::Result<()> {
    let live = layout.shared_node_modules();
    remove_path_if_exists(&live)?;
    fs::rename(layout.backup_node_modules(), &live)
}
