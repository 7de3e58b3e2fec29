//! Test utilities for workspace-layer unit tests.
//!
//! Provides a scripted stand-in for the package manager, a logger that
//! records what the plugin reports, and helpers to compare directory trees
//! before and after a run.
//!
//! # Example
//!
//! ```rust,ignore
//! let fx = WorkspaceFixture::new()
//!     .package("app", &["lib-a"])
//!     .package("lib-a", &[])
//!     .link("lib-a");
//! let installer = FakeInstaller::mirroring(&fx);
//! let logger = RecordingLogger::default();
//! materialize(&fx.layout("app"), &MaterializeOptions::default(), &installer, &logger)?;
//! ```

pub mod fixtures;

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::core::workspace::{BACKUP_DIR_NAME, NODE_MODULES};
use crate::ops::install::{InstallOutcome, Installer};
use crate::plugin::Logger;
use crate::util::fs::{remove_path_if_exists, symlink};

pub use fixtures::*;

/// Logger that keeps every message.
#[derive(Debug, Default)]
pub struct RecordingLogger {
    lines: RefCell<Vec<String>>,
}

impl RecordingLogger {
    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    /// Whether any logged line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.borrow().iter().any(|l| l.contains(needle))
    }
}

impl Logger for RecordingLogger {
    fn log(&self, message: &str) {
        self.lines.borrow_mut().push(message.to_string());
    }
}

/// What the fake install does to the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InstallBehavior {
    /// Recreate node_modules as a copy of the backup, links included.
    Mirror,
    /// Leave node_modules missing.
    Nothing,
    /// Mirror, then delete the backup so restoration cannot succeed.
    LoseBackup,
}

/// Scripted package manager.
#[derive(Debug)]
pub struct FakeInstaller {
    root: PathBuf,
    behavior: InstallBehavior,
    exit_code: i32,
    stderr: String,
    calls: Cell<usize>,
}

impl FakeInstaller {
    fn with_behavior(root: PathBuf, behavior: InstallBehavior) -> Self {
        FakeInstaller {
            root,
            behavior,
            exit_code: 0,
            stderr: String::new(),
            calls: Cell::new(0),
        }
    }

    /// Reproduce the workspace's original node_modules, links included.
    pub fn mirroring(fx: &WorkspaceFixture) -> Self {
        Self::with_behavior(fx.root().to_path_buf(), InstallBehavior::Mirror)
    }

    /// Install nothing at all.
    pub fn producing_nothing() -> Self {
        Self::with_behavior(PathBuf::new(), InstallBehavior::Nothing)
    }

    /// Mirror, then make the backup disappear.
    pub fn losing_backup(fx: &WorkspaceFixture) -> Self {
        Self::with_behavior(fx.root().to_path_buf(), InstallBehavior::LoseBackup)
    }

    /// Report a non-zero exit with stderr output.
    pub fn with_failure(mut self, exit_code: i32, stderr: impl Into<String>) -> Self {
        self.exit_code = exit_code;
        self.stderr = stderr.into();
        self
    }

    /// How many installs ran.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl Installer for FakeInstaller {
    fn clean_install(&self, _package_dir: &Path, package_name: &str) -> InstallOutcome {
        self.calls.set(self.calls.get() + 1);

        let backup = self.root.join(BACKUP_DIR_NAME);
        let live = self.root.join(NODE_MODULES);
        match self.behavior {
            InstallBehavior::Nothing => {}
            InstallBehavior::Mirror => mirror_tree(&backup, &live),
            InstallBehavior::LoseBackup => {
                mirror_tree(&backup, &live);
                remove_path_if_exists(&backup).unwrap();
            }
        }

        InstallOutcome {
            command: format!("npm ci --workspace={}", package_name),
            exit_code: Some(self.exit_code),
            stdout: String::new(),
            stderr: self.stderr.clone(),
            spawn_error: None,
        }
    }
}

/// Copy `src` to `dst`, recreating links rather than following them.
fn mirror_tree(src: &Path, dst: &Path) {
    fs::create_dir_all(dst).unwrap();
    for entry in WalkDir::new(src).min_depth(1).follow_links(false) {
        let entry = entry.unwrap();
        let out = dst.join(entry.path().strip_prefix(src).unwrap());
        let ty = entry.file_type();
        if ty.is_symlink() {
            symlink(&fs::read_link(entry.path()).unwrap(), &out).unwrap();
        } else if ty.is_dir() {
            fs::create_dir_all(&out).unwrap();
        } else {
            fs::copy(entry.path(), &out).unwrap();
        }
    }
}

/// Describe every entry under `dir` (directories, file contents, link
/// targets) keyed by relative path. A missing directory is empty.
pub fn snapshot_tree(dir: &Path) -> BTreeMap<PathBuf, String> {
    let mut out = BTreeMap::new();
    if fs::symlink_metadata(dir).is_err() {
        return out;
    }
    for entry in WalkDir::new(dir).min_depth(1).follow_links(false) {
        let entry = entry.unwrap();
        let rel = entry.path().strip_prefix(dir).unwrap().to_path_buf();
        let ty = entry.file_type();
        let desc = if ty.is_symlink() {
            format!("link:{}", fs::read_link(entry.path()).unwrap().display())
        } else if ty.is_dir() {
            "dir".to_string()
        } else {
            format!("file:{}", fs::read_to_string(entry.path()).unwrap_or_default())
        };
        out.insert(rel, desc);
    }
    out
}
