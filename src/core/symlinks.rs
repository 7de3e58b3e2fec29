//! Discovery of linked workspace packages in the hoisted node_modules.
//!
//! npm links every workspace member into the root `node_modules` instead of
//! installing it. Those links are what tells an internal dependency apart
//! from a third-party one.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{MaterializeError, Result};
use crate::util::fs::remove_path_if_exists;

/// One linked package found in node_modules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymlinkEntry {
    /// Name a dependency declaration may use (`lib-c` or `@org/lib-c`).
    pub logical_name: String,
    /// Directory holding the link (`node_modules` or `node_modules/@org`).
    pub physical_parent: PathBuf,
    /// File name of the link itself.
    pub physical_name: String,
    /// Scope, for links found under an `@scope` directory.
    pub scope: Option<String>,
}

impl SymlinkEntry {
    /// Fully-qualified package name (`@scope/name` for scoped links).
    pub fn qualified_name(&self) -> String {
        match &self.scope {
            Some(scope) => format!("{}/{}", scope, self.physical_name),
            None => self.physical_name.clone(),
        }
    }

    /// Where the link lived.
    pub fn physical_path(&self) -> PathBuf {
        self.physical_parent.join(&self.physical_name)
    }
}

/// Immutable set of linked packages, keyed by logical name.
#[derive(Debug, Clone, Default)]
pub struct SymlinkIndex {
    entries: BTreeMap<String, SymlinkEntry>,
}

impl SymlinkIndex {
    /// Scan `node_modules` and unlink every workspace link found.
    ///
    /// Direct children that are links are recorded under their own name.
    /// Links inside `@scope` directories are recorded twice, under the bare
    /// name and under `@scope/name`. Each link is removed as soon as it is
    /// recorded so a later plain copy of the directory sees real packages
    /// only.
    pub fn scan_and_unlink(node_modules: &Path) -> Result<Self> {
        if !node_modules.is_dir() {
            return Err(MaterializeError::InstallOutputMissing {
                path: node_modules.to_path_buf(),
            });
        }

        let mut found = Vec::new();
        for (name, is_link) in list_dir(node_modules)? {
            if name.starts_with('@') {
                let scope_dir = node_modules.join(&name);
                if !scope_dir.is_dir() {
                    continue;
                }
                for (child, child_is_link) in list_dir(&scope_dir)? {
                    if child_is_link {
                        found.push(SymlinkEntry {
                            logical_name: child.clone(),
                            physical_parent: scope_dir.clone(),
                            physical_name: child.clone(),
                            scope: Some(name.clone()),
                        });
                        found.push(SymlinkEntry {
                            logical_name: format!("{}/{}", name, child),
                            physical_parent: scope_dir.clone(),
                            physical_name: child,
                            scope: Some(name.clone()),
                        });
                    }
                }
            } else if is_link {
                found.push(SymlinkEntry {
                    logical_name: name.clone(),
                    physical_parent: node_modules.to_path_buf(),
                    physical_name: name,
                    scope: None,
                });
            }
        }

        let mut entries = BTreeMap::new();
        for entry in found {
            let path = entry.physical_path();
            remove_path_if_exists(&path)
                .map_err(|e| MaterializeError::io(e, "removing workspace link", &path))?;
            tracing::debug!("unlinked {} ({})", entry.logical_name, path.display());
            entries.entry(entry.logical_name.clone()).or_insert(entry);
        }

        Ok(SymlinkIndex { entries })
    }

    /// Look up a link by logical name.
    pub fn get(&self, name: &str) -> Option<&SymlinkEntry> {
        self.entries.get(name)
    }

    /// Whether `name` is a linked workspace package.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All logical names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    #[cfg(test)]
    pub(crate) fn from_entries(entries: impl IntoIterator<Item = SymlinkEntry>) -> Self {
        SymlinkIndex {
            entries: entries
                .into_iter()
                .map(|e| (e.logical_name.clone(), e))
                .collect(),
        }
    }
}

/// Children of `dir` as (name, is-symlink) pairs, sorted by name.
fn list_dir(dir: &Path) -> Result<Vec<(String, bool)>> {
    let read = fs::read_dir(dir).map_err(|e| MaterializeError::io(e, "reading directory", dir))?;
    let mut out = Vec::new();
    for entry in read {
        let entry = entry.map_err(|e| MaterializeError::io(e, "reading directory", dir))?;
        let file_type = entry
            .file_type()
            .map_err(|e| MaterializeError::io(e, "reading file type", entry.path()))?;
        out.push((
            entry.file_name().to_string_lossy().into_owned(),
            file_type.is_symlink(),
        ));
    }
    out.sort();
    Ok(out)
}
