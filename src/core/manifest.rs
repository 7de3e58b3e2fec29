//! package.json parsing.
//!
//! Only the fields the layer build needs are modeled; everything else in
//! the manifest is ignored.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{MaterializeError, Result};

/// File name of an npm package manifest.
pub const MANIFEST_FILE_NAME: &str = "package.json";

/// A parsed package.json.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PackageManifest {
    /// Declared package name.
    #[serde(default)]
    pub name: Option<String>,

    /// Runtime dependencies, name to version spec.
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,

    /// Workspace member declaration (workspace root only).
    #[serde(default)]
    pub workspaces: Option<Value>,
}

impl PackageManifest {
    /// Load a manifest from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MaterializeError::ManifestNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                MaterializeError::io(e, "reading manifest", path)
            }
        })?;
        Self::parse(&contents, path)
    }

    /// Parse manifest contents; `path` is used for error messages.
    pub fn parse(contents: &str, path: &Path) -> Result<Self> {
        serde_json::from_str(contents).map_err(|source| MaterializeError::ManifestParse {
            source,
            path: path.to_path_buf(),
        })
    }

    /// Whether this manifest declares at least one workspace member.
    ///
    /// Accepts the array form (`["packages/*"]`) and the object form
    /// (`{ "packages": [...] }`).
    pub fn has_workspaces(&self) -> bool {
        match &self.workspaces {
            Some(Value::Array(members)) => !members.is_empty(),
            Some(Value::Object(obj)) => obj
                .get("packages")
                .and_then(Value::as_array)
                .is_some_and(|members| !members.is_empty()),
            _ => false,
        }
    }

    /// Declared dependency names, in sorted order.
    pub fn dependency_names(&self) -> impl Iterator<Item = &str> {
        self.dependencies.keys().map(String::as_str)
    }
}
