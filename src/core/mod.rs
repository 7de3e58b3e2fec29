//! Core data structures.
//!
//! This module contains what a layer build scans and reads:
//! - Package manifests (package.json)
//! - Ignore rules
//! - Workspace links in the hoisted node_modules
//! - The catalog of workspace packages
//! - Workspace layout (paths)

pub mod catalog;
pub mod ignore;
pub mod manifest;
pub mod symlinks;
pub mod workspace;

pub use catalog::{WorkspaceCatalog, WorkspaceCatalogEntry};
pub use ignore::IgnoreRuleSet;
pub use manifest::PackageManifest;
pub use symlinks::{SymlinkEntry, SymlinkIndex};
pub use workspace::WorkspaceLayout;
