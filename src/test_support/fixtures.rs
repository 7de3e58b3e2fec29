//! On-disk npm workspace fixtures.
//!
//! Layout produced by [`WorkspaceFixture`]:
//!
//! ```text
//! <tmp>/package.json          { "workspaces": ["packages/*"] }
//! <tmp>/node_modules/...      third-party packages and workspace links
//! <tmp>/packages/<name>/      workspace packages
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::core::workspace::{WorkspaceLayout, BACKUP_DIR_NAME, NODE_MODULES};
use crate::util::fs::{normalize_path, symlink};
use crate::util::Config;

/// A temporary npm workspace.
pub struct WorkspaceFixture {
    _tmp: TempDir,
    root: PathBuf,
}

impl WorkspaceFixture {
    /// An empty workspace with a `packages/*` declaration and an empty
    /// node_modules.
    pub fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let root = normalize_path(tmp.path());
        fs::create_dir_all(root.join(NODE_MODULES)).unwrap();
        fs::create_dir_all(root.join("packages")).unwrap();
        let fx = WorkspaceFixture { _tmp: tmp, root };
        fx.root_manifest(r#"{ "name": "root", "private": true, "workspaces": ["packages/*"] }"#)
    }

    /// Replace the workspace root package.json.
    pub fn root_manifest(self, body: &str) -> Self {
        fs::write(self.root.join("package.json"), body).unwrap();
        self
    }

    /// Add `packages/<name>` declaring `deps`.
    pub fn package(self, name: &str, deps: &[&str]) -> Self {
        self.write_package(name, name, deps)
    }

    /// Add `packages/<name>` declared as `<scope>/<name>`.
    pub fn scoped_package(self, scope: &str, name: &str, deps: &[&str]) -> Self {
        self.write_package(name, &format!("{}/{}", scope, name), deps)
    }

    fn write_package(self, dir: &str, name: &str, deps: &[&str]) -> Self {
        let deps = deps
            .iter()
            .map(|d| format!("\"{}\": \"*\"", d))
            .collect::<Vec<_>>()
            .join(", ");
        let manifest = format!(
            r#"{{ "name": "{}", "version": "1.0.0", "dependencies": {{ {} }} }}"#,
            name, deps
        );
        self.file(&format!("packages/{}/package.json", dir), &manifest)
            .file(&format!("packages/{}/src/index.js", dir), &format!("// {}\n", name))
    }

    /// Link `node_modules/<name>` to `packages/<name>`.
    pub fn link(self, name: &str) -> Self {
        let target = Path::new("..").join("packages").join(name);
        self.link_to(name, &target.to_string_lossy())
    }

    /// Link `node_modules/<name>` to an arbitrary (possibly dangling) target.
    pub fn link_to(self, name: &str, target: &str) -> Self {
        symlink(Path::new(target), &self.shared().join(name)).unwrap();
        self
    }

    /// Link `node_modules/<scope>/<name>` to `packages/<name>`.
    pub fn scoped_link(self, scope: &str, name: &str) -> Self {
        let scope_dir = self.shared().join(scope);
        fs::create_dir_all(&scope_dir).unwrap();
        let target = Path::new("..").join("..").join("packages").join(name);
        symlink(&target, &scope_dir.join(name)).unwrap();
        self
    }

    /// Add a hoisted third-party package.
    pub fn third_party(self, name: &str) -> Self {
        self.file(
            &format!("{}/{}/package.json", NODE_MODULES, name),
            &format!(r#"{{ "name": "{}", "version": "1.0.0" }}"#, name),
        )
        .file(&format!("{}/{}/index.js", NODE_MODULES, name), "module.exports = {};\n")
    }

    /// Write a file relative to the workspace root.
    pub fn file(self, rel: &str, contents: &str) -> Self {
        let path = self.root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
        self
    }

    /// Remove the shared node_modules.
    pub fn without_shared(self) -> Self {
        fs::remove_dir_all(self.shared()).unwrap();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn shared(&self) -> PathBuf {
        self.root.join(NODE_MODULES)
    }

    pub fn backup(&self) -> PathBuf {
        self.root.join(BACKUP_DIR_NAME)
    }

    pub fn package_dir(&self, name: &str) -> PathBuf {
        self.root.join("packages").join(name)
    }

    /// Layout for `packages/<name>` with the default configuration.
    pub fn layout(&self, name: &str) -> WorkspaceLayout {
        WorkspaceLayout::new(&self.package_dir(name), &Config::default())
    }
}
