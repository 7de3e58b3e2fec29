//! workspace-layer - deployable node_modules for one npm workspace package
//!
//! This crate builds a self-contained dependency tree for a package that
//! lives in an npm workspace: third-party packages are snapshotted into a
//! layer directory and linked workspace packages are copied, transitively,
//! into the package's own node_modules. The workspace's hoisted
//! node_modules is put back exactly as it was.

pub mod core;
pub mod error;
pub mod ops;
pub mod plugin;
pub mod util;

/// Test utilities for workspace-layer unit tests.
///
/// This module is only available when compiling with `--cfg test`. It
/// provides on-disk workspace fixtures, a scripted installer and a
/// recording logger.
#[cfg(test)]
pub mod test_support;

pub use crate::core::{
    IgnoreRuleSet, PackageManifest, SymlinkEntry, SymlinkIndex, WorkspaceCatalog, WorkspaceLayout,
};
pub use error::{ErrorKind, MaterializeError};
pub use ops::{materialize, MaterializeOptions, MaterializeReport};
pub use plugin::{HookRegistry, LifecycleEvent, Logger, Plugin, WorkspaceLayerPlugin, PLUGIN_NAME};
pub use util::Config;
