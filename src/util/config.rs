//! Configuration file support.
//!
//! The resolved configuration comes from two places:
//! - Project: `workspace-layer.toml` in the package being deployed
//! - Command line flags and `WORKSPACE_LAYER_*` environment variables
//!
//! Command line values take precedence over the project file. Every setting
//! is optional; [`Config::workspace_root`] and [`Config::layer_path`]
//! apply the defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// File name of the per-package configuration.
pub const CONFIG_FILE_NAME: &str = "workspace-layer.toml";

/// Workspace root used when none is configured, relative to the package.
pub const DEFAULT_WORKSPACE_ROOT: &str = "../..";

/// Layer directory used when none is configured, relative to the package.
pub const DEFAULT_LAYER_PATH: &str = "layers/main";

/// Resolved plugin configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Path to the workspace root (the directory holding the workspace
    /// package.json), relative to the package.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_root_directory_path: Option<PathBuf>,

    /// Path to the layer directory, relative to the package.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer_path: Option<PathBuf>,

    /// Packaging settings of the host.
    pub package: PackageConfig,
}

/// Packaging settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageConfig {
    /// Packaging include/exclude patterns, e.g. `!dist/**`.
    pub patterns: Vec<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Load `workspace-layer.toml` from a package directory, if present.
    pub fn load_for_package(package_dir: &Path) -> Result<Self> {
        let path = package_dir.join(CONFIG_FILE_NAME);
        if path.exists() {
            tracing::debug!("loading config from {}", path.display());
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.workspace_root_directory_path.is_some() {
            self.workspace_root_directory_path = other.workspace_root_directory_path;
        }
        if other.layer_path.is_some() {
            self.layer_path = other.layer_path;
        }
        if !other.package.patterns.is_empty() {
            self.package.patterns = other.package.patterns;
        }
    }

    /// Workspace root, or the default.
    pub fn workspace_root(&self) -> PathBuf {
        self.workspace_root_directory_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_WORKSPACE_ROOT))
    }

    /// Layer directory, or the default.
    pub fn layer_path(&self) -> PathBuf {
        self.layer_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LAYER_PATH))
    }

    /// Serialize for display.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("failed to serialize config")
    }
}
