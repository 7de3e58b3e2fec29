//! Path-segment exclusion rules.
//!
//! Rules are plain strings compared against each component of a relative
//! path. There is no glob matching: a rule `dist` excludes `dist/`,
//! `src/dist/x.js` and a file literally named `dist`, but not `dist.js`.

use std::collections::BTreeSet;
use std::io;
use std::path::{Component, Path};

use crate::error::{MaterializeError, Result};

/// Name of the ignore file read from the workspace root, the deployed
/// package and each internal dependency.
pub const IGNORE_FILE_NAME: &str = ".gitignore";

/// A flat set of path-segment exclusions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreRuleSet {
    rules: BTreeSet<String>,
}

impl IgnoreRuleSet {
    /// Create a rule set holding only the ignore file itself.
    pub fn new() -> Self {
        let mut rules = BTreeSet::new();
        rules.insert(IGNORE_FILE_NAME.to_string());
        IgnoreRuleSet { rules }
    }

    /// Build the base rule set from the host's packaging patterns and the
    /// contents of the workspace and package ignore files.
    pub fn build(patterns: &[String], workspace_ignore: Option<&str>, package_ignore: Option<&str>) -> Self {
        let mut set = IgnoreRuleSet::new();
        for pattern in patterns {
            set.rules.insert(normalize_pattern(pattern).to_string());
        }
        set.extend_from_ignore_file(workspace_ignore);
        set.extend_from_ignore_file(package_ignore);
        set
    }

    /// Add every line of an ignore file, verbatim apart from a trailing
    /// carriage return.
    pub fn extend_from_ignore_file(&mut self, contents: Option<&str>) {
        if let Some(contents) = contents {
            for line in contents.split('\n') {
                self.rules.insert(line.strip_suffix('\r').unwrap_or(line).to_string());
            }
        }
    }

    /// Copy of this set with a dependency's own ignore file merged in.
    pub fn with_ignore_file(&self, contents: Option<&str>) -> Self {
        let mut set = self.clone();
        set.extend_from_ignore_file(contents);
        set
    }

    /// Whether `rule` is part of the set.
    pub fn contains(&self, rule: &str) -> bool {
        self.rules.contains(rule)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether `relative` has any component equal to a rule.
    pub fn is_excluded(&self, relative: &Path) -> bool {
        is_excluded(relative, &self.rules)
    }
}

/// Read the ignore file of `dir`, if it has one.
pub fn read_ignore_file(dir: &Path) -> Result<Option<String>> {
    let path = dir.join(IGNORE_FILE_NAME);
    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(MaterializeError::io(e, "reading ignore file", path)),
    }
}

/// Strip a leading `!` and a trailing `/**` from a packaging pattern.
pub fn normalize_pattern(pattern: &str) -> &str {
    let pattern = pattern.strip_prefix('!').unwrap_or(pattern);
    pattern.strip_suffix("/**").unwrap_or(pattern)
}

/// Pure exclusion check: any normal component of `relative` matching a rule.
pub fn is_excluded(relative: &Path, rules: &BTreeSet<String>) -> bool {
    relative.components().any(|c| match c {
        Component::Normal(seg) => seg.to_str().is_some_and(|s| rules.contains(s)),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_pattern() {
        assert_eq!(normalize_pattern("!dist/**"), "dist");
        assert_eq!(normalize_pattern("!.env"), ".env");
        assert_eq!(normalize_pattern("coverage/**"), "coverage");
        assert_eq!(normalize_pattern("src"), "src");
        // Only one suffix is removed.
        assert_eq!(normalize_pattern("a/**/**"), "a/**");
    }

    #[test]
    fn test_build_unions_sources() {
        let rules = IgnoreRuleSet::build(
            &["!dist/**".to_string(), "!*.md".to_string()],
            Some("node_modules\n.env\n"),
            Some("coverage\r\ntmp"),
        );

        for rule in [".gitignore", "dist", "*.md", "node_modules", ".env", "coverage", "tmp", ""] {
            assert!(rules.contains(rule), "missing rule {rule:?}");
        }
    }

    #[test]
    fn test_absent_inputs_contribute_nothing() {
        let rules = IgnoreRuleSet::build(&[], None, None);
        assert_eq!(rules, IgnoreRuleSet::new());
        assert_eq!(rules.len(), 1);
    }

    #[test]
    fn test_segment_matching() {
        let rules = IgnoreRuleSet::build(&[], Some("dist\n\n"), None);

        assert!(rules.is_excluded(Path::new("dist")));
        assert!(rules.is_excluded(Path::new("src/dist/index.js")));
        assert!(rules.is_excluded(Path::new(".gitignore")));
        assert!(!rules.is_excluded(Path::new("dist.js")));
        assert!(!rules.is_excluded(Path::new("src/distribution/a.js")));
        // Blank rules never match a real segment.
        assert!(!rules.is_excluded(Path::new("src/index.js")));
    }

    #[test]
    fn test_read_ignore_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        assert!(read_ignore_file(tmp.path()).unwrap().is_none());
        std::fs::write(tmp.path().join(IGNORE_FILE_NAME), "dist\n").unwrap();
        assert_eq!(read_ignore_file(tmp.path()).unwrap().as_deref(), Some("dist\n"));
    }

    #[test]
    fn test_with_ignore_file_does_not_mutate_base() {
        let base = IgnoreRuleSet::new();
        let dep = base.with_ignore_file(Some("build"));
        assert!(dep.contains("build"));
        assert!(!base.contains("build"));
    }
}
