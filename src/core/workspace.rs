//! Workspace layout - every path a layer build reads or writes.

use std::path::{Path, PathBuf};

use crate::core::manifest::MANIFEST_FILE_NAME;
use crate::util::fs::normalize_path;
use crate::util::Config;

/// Name of the hoisted dependency directory.
pub const NODE_MODULES: &str = "node_modules";

/// Name the live node_modules is parked under while the install runs.
pub const BACKUP_DIR_NAME: &str = "node_modules_tmp";

/// Paths of one deployed package inside its workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceLayout {
    package_dir: PathBuf,
    workspace_root: PathBuf,
    layer_dir: PathBuf,
}

impl WorkspaceLayout {
    /// Resolve the layout for `package_dir` using the configured (or
    /// default) workspace root and layer path, both relative to the
    /// package.
    pub fn new(package_dir: &Path, config: &Config) -> Self {
        let package_dir = normalize_path(package_dir);
        let workspace_root = normalize_path(&package_dir.join(config.workspace_root()));
        let layer_dir = package_dir.join(config.layer_path());
        WorkspaceLayout {
            package_dir,
            workspace_root,
            layer_dir,
        }
    }

    /// The package being deployed.
    pub fn package_dir(&self) -> &Path {
        &self.package_dir
    }

    /// The package's own manifest.
    pub fn package_manifest(&self) -> PathBuf {
        self.package_dir.join(MANIFEST_FILE_NAME)
    }

    /// The package's local node_modules, where internal dependencies land.
    pub fn local_node_modules(&self) -> PathBuf {
        self.package_dir.join(NODE_MODULES)
    }

    /// Directory holding the package and its sibling workspace packages.
    pub fn siblings_dir(&self) -> &Path {
        self.package_dir.parent().unwrap_or(&self.package_dir)
    }

    /// Directory name of the package, used when its manifest has no name.
    pub fn package_dir_name(&self) -> Option<String> {
        self.package_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
    }

    /// The workspace root.
    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// The workspace root manifest.
    pub fn workspace_manifest(&self) -> PathBuf {
        self.workspace_root.join(MANIFEST_FILE_NAME)
    }

    /// The shared (hoisted) node_modules.
    pub fn shared_node_modules(&self) -> PathBuf {
        self.workspace_root.join(NODE_MODULES)
    }

    /// Where the shared node_modules is parked during a run.
    pub fn backup_node_modules(&self) -> PathBuf {
        self.workspace_root.join(BACKUP_DIR_NAME)
    }

    /// The layer directory, cleared on every run.
    pub fn layer_dir(&self) -> &Path {
        &self.layer_dir
    }

    /// Where third-party dependencies are copied inside the layer.
    pub fn layer_node_modules(&self) -> PathBuf {
        self.layer_dir.join("nodejs").join(NODE_MODULES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_layout() {
        let tmp = TempDir::new().unwrap();
        let root = normalize_path(tmp.path());
        let app = root.join("packages").join("app");
        std::fs::create_dir_all(&app).unwrap();

        let layout = WorkspaceLayout::new(&app, &Config::default());

        assert_eq!(layout.workspace_root(), root.as_path());
        assert_eq!(layout.shared_node_modules(), root.join("node_modules"));
        assert_eq!(layout.backup_node_modules(), root.join("node_modules_tmp"));
        assert_eq!(layout.siblings_dir(), root.join("packages").as_path());
        assert_eq!(
            layout.layer_node_modules(),
            app.join("layers/main/nodejs/node_modules")
        );
        assert_eq!(layout.local_node_modules(), app.join("node_modules"));
        assert_eq!(layout.package_dir_name().as_deref(), Some("app"));
    }

    #[test]
    fn test_configured_layout() {
        let tmp = TempDir::new().unwrap();
        let root = normalize_path(tmp.path());
        let app = root.join("app");
        std::fs::create_dir_all(&app).unwrap();

        let config = Config {
            workspace_root_directory_path: Some("..".into()),
            layer_path: Some("out/layer".into()),
            ..Config::default()
        };
        let layout = WorkspaceLayout::new(&app, &config);

        assert_eq!(layout.workspace_root(), root.as_path());
        assert_eq!(layout.siblings_dir(), root.as_path());
        assert_eq!(layout.layer_dir(), app.join("out/layer").as_path());
    }
}
