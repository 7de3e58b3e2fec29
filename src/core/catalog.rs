//! Map of workspace package names to their directories.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::manifest::{PackageManifest, MANIFEST_FILE_NAME};
use crate::error::{MaterializeError, Result};
use crate::util::fs::normalize_path;

/// A workspace package found on disk.
#[derive(Debug, Clone)]
pub struct WorkspaceCatalogEntry {
    /// Declared package name.
    pub package_name: String,
    /// Name of the directory holding the package.
    pub dir_name: String,
    /// Full path of that directory.
    pub dir: PathBuf,
    /// The package's parsed manifest.
    pub manifest: PackageManifest,
}

/// Workspace packages keyed by declared name.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceCatalog {
    packages: HashMap<String, WorkspaceCatalogEntry>,
}

impl WorkspaceCatalog {
    /// Scan the direct subdirectories of each directory in `dirs`.
    ///
    /// Directories without a package.json (or without a `name`) are not
    /// packages and are skipped. A manifest that fails to parse is skipped
    /// with a warning. When two directories declare the same name, the one
    /// scanned last wins. Duplicate scan directories are scanned once.
    pub fn scan<P: AsRef<Path>>(dirs: &[P]) -> Result<Self> {
        let mut catalog = WorkspaceCatalog::default();
        let mut scanned: Vec<PathBuf> = Vec::new();

        for dir in dirs {
            let dir = dir.as_ref();
            let canonical = normalize_path(dir);
            if scanned.contains(&canonical) {
                continue;
            }
            scanned.push(canonical);
            catalog.scan_dir(dir)?;
        }

        Ok(catalog)
    }

    fn scan_dir(&mut self, dir: &Path) -> Result<()> {
        let read = fs::read_dir(dir).map_err(|e| MaterializeError::io(e, "scanning workspace", dir))?;

        let mut subdirs = Vec::new();
        for entry in read {
            let entry = entry.map_err(|e| MaterializeError::io(e, "scanning workspace", dir))?;
            let path = entry.path();
            if path.is_dir() {
                subdirs.push((entry.file_name().to_string_lossy().into_owned(), path));
            }
        }
        subdirs.sort();

        for (dir_name, path) in subdirs {
            let manifest_path = path.join(MANIFEST_FILE_NAME);
            if !manifest_path.is_file() {
                continue;
            }
            let manifest = match PackageManifest::load(&manifest_path) {
                Ok(m) => m,
                Err(e) => {
                    tracing::warn!("skipping {}: {}", path.display(), e);
                    continue;
                }
            };
            let Some(package_name) = manifest.name.clone() else {
                tracing::debug!("skipping unnamed package in {}", path.display());
                continue;
            };
            if let Some(previous) = self.packages.get(&package_name) {
                tracing::debug!(
                    "`{}` declared by both {} and {}, using the latter",
                    package_name,
                    previous.dir.display(),
                    path.display()
                );
            }
            self.packages.insert(
                package_name.clone(),
                WorkspaceCatalogEntry {
                    package_name,
                    dir_name,
                    dir: path,
                    manifest,
                },
            );
        }

        Ok(())
    }

    /// Look up a package by declared name.
    pub fn get(&self, name: &str) -> Option<&WorkspaceCatalogEntry> {
        self.packages.get(name)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}
