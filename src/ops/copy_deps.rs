//! Copying internal workspace dependencies into a package's node_modules.
//!
//! Internal dependencies are copied flat: every transitive internal
//! dependency lands directly under the destination, the way npm hoists.

use std::collections::HashSet;
use std::path::PathBuf;

use crate::core::catalog::{WorkspaceCatalog, WorkspaceCatalogEntry};
use crate::core::ignore::{read_ignore_file, IgnoreRuleSet};
use crate::core::manifest::PackageManifest;
use crate::core::symlinks::SymlinkIndex;
use crate::error::{MaterializeError, Result};
use crate::util::fs::{copy_tree, remove_path_if_exists};

/// One internal dependency that was copied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopiedDependency {
    /// Name as declared by the dependent manifest.
    pub name: String,
    /// Workspace directory it was copied from.
    pub from: PathBuf,
    /// Directory it was copied to.
    pub to: PathBuf,
    /// Number of files written.
    pub files: usize,
}

/// Recursive copier for linked workspace packages.
pub struct DependencyCopier<'a> {
    links: &'a SymlinkIndex,
    catalog: &'a WorkspaceCatalog,
    rules: &'a IgnoreRuleSet,
    destination: PathBuf,
    /// Package names currently being expanded, outermost first.
    stack: Vec<String>,
    /// Declared names already copied.
    done: HashSet<String>,
    copied: Vec<CopiedDependency>,
}

impl<'a> DependencyCopier<'a> {
    pub fn new(
        links: &'a SymlinkIndex,
        catalog: &'a WorkspaceCatalog,
        rules: &'a IgnoreRuleSet,
        destination: impl Into<PathBuf>,
    ) -> Self {
        DependencyCopier {
            links,
            catalog,
            rules,
            destination: destination.into(),
            stack: Vec::new(),
            done: HashSet::new(),
            copied: Vec::new(),
        }
    }

    /// Copy every internal dependency reachable from `manifest`.
    ///
    /// `package_name` identifies the root of the walk for cycle reporting.
    /// Returns the copied dependencies in copy order.
    pub fn copy_all(mut self, package_name: &str, manifest: &PackageManifest) -> Result<Vec<CopiedDependency>> {
        self.stack.push(package_name.to_string());
        self.copy_dependencies_of(manifest)?;
        Ok(self.copied)
    }

    fn copy_dependencies_of(&mut self, manifest: &PackageManifest) -> Result<()> {
        for dep in manifest.dependency_names() {
            if !self.links.contains(dep) {
                continue;
            }

            let entry = self.resolve(dep)?;

            if self.stack.contains(&entry.package_name) {
                let mut chain = self.stack.clone();
                chain.push(entry.package_name.clone());
                return Err(MaterializeError::DependencyCycle { chain });
            }

            if !self.done.insert(dep.to_string()) {
                continue;
            }

            self.copy_one(dep, entry)?;

            self.stack.push(entry.package_name.clone());
            self.copy_dependencies_of(&entry.manifest)?;
            self.stack.pop();
        }
        Ok(())
    }

    /// Find the workspace package behind a linked dependency name.
    ///
    /// A bare name found under a scope (`lib-c` for `@org/lib-c`) falls back
    /// to the qualified name.
    fn resolve(&self, dep: &str) -> Result<&'a WorkspaceCatalogEntry> {
        let catalog = self.catalog;
        if let Some(entry) = catalog.get(dep) {
            return Ok(entry);
        }
        self.links
            .get(dep)
            .and_then(|link| catalog.get(&link.qualified_name()))
            .ok_or_else(|| MaterializeError::PackageNotInCatalog {
                name: dep.to_string(),
            })
    }

    fn copy_one(&mut self, dep: &str, entry: &WorkspaceCatalogEntry) -> Result<()> {
        let to = self.destination.join(dep);

        remove_path_if_exists(&to).map_err(|e| MaterializeError::io(e, "clearing dependency destination", &to))?;

        let dep_ignore = read_ignore_file(&entry.dir)?;
        let rules = self.rules.with_ignore_file(dep_ignore.as_deref());

        let stats = copy_tree(&entry.dir, &to, |rel| !rules.is_excluded(rel))
            .map_err(|e| MaterializeError::copy(e, &entry.dir, &to))?;

        tracing::info!(
            "copied internal dependency {} ({} files, {} excluded)",
            dep,
            stats.files,
            stats.excluded
        );

        self.copied.push(CopiedDependency {
            name: dep.to_string(),
            from: entry.dir.clone(),
            to,
            files: stats.files,
        });
        Ok(())
    }
}
