//! Breakpoint registry keyed by canonical source path and line.
//!
//! Invariant: no path entry with an empty line set ever persists.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::paths::{CanonicalPath, PathPolicy};

#[derive(Debug)]
pub enum BreakpointError {
    /// Line numbers start at 1.
    InvalidLine(u32),
    /// The path does not name an existing, accessible file.
    InvalidPath { path: PathBuf, source: io::Error },
}

impl fmt::Display for BreakpointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BreakpointError::InvalidLine(line) => write!(f, "invalid line number {}", line),
            BreakpointError::InvalidPath { path, source } => {
                write!(f, "invalid path {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for BreakpointError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BreakpointError::InvalidPath { source, .. } => Some(source),
            BreakpointError::InvalidLine(_) => None,
        }
    }
}

/// Active breakpoints. Ordered maps keep listings deterministic.
#[derive(Debug, Clone, Default)]
pub struct BreakpointRegistry {
    policy: PathPolicy,
    points: BTreeMap<CanonicalPath, BTreeSet<u32>>,
}

impl BreakpointRegistry {
    pub fn new(policy: PathPolicy) -> Self {
        Self {
            policy,
            points: BTreeMap::new(),
        }
    }

    pub fn policy(&self) -> PathPolicy {
        self.policy
    }

    /// Canonicalize a user-supplied path under this registry's policy.
    pub fn canonicalize(&self, path: impl AsRef<Path>) -> Result<CanonicalPath, BreakpointError> {
        let path = path.as_ref();
        self.policy
            .canonicalize(path)
            .map_err(|source| BreakpointError::InvalidPath {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Add a breakpoint. Returns false if it was already set.
    ///
    /// Nothing is mutated when the path or line is invalid.
    pub fn add(&mut self, path: impl AsRef<Path>, line: u32) -> Result<bool, BreakpointError> {
        if line == 0 {
            return Err(BreakpointError::InvalidLine(line));
        }
        let canonical = self.canonicalize(path)?;
        Ok(self.insert(canonical, line))
    }

    /// Remove a breakpoint. Returns false if it was not set.
    pub fn remove(&mut self, path: impl AsRef<Path>, line: u32) -> Result<bool, BreakpointError> {
        if line == 0 {
            return Err(BreakpointError::InvalidLine(line));
        }
        let canonical = self.canonicalize(path)?;
        Ok(self.delete(&canonical, line))
    }

    pub fn insert(&mut self, path: CanonicalPath, line: u32) -> bool {
        let added = self.points.entry(path.clone()).or_default().insert(line);
        if added {
            log::debug!("breakpoint set at {}:{}", path, line);
        }
        added
    }

    pub fn delete(&mut self, path: &CanonicalPath, line: u32) -> bool {
        let Some(lines) = self.points.get_mut(path) else {
            return false;
        };
        let removed = lines.remove(&line);
        if lines.is_empty() {
            self.points.remove(path);
        }
        if removed {
            log::debug!("breakpoint removed from {}:{}", path, line);
        }
        removed
    }

    pub fn contains(&self, path: &CanonicalPath, line: u32) -> bool {
        self.points
            .get(path)
            .is_some_and(|lines| lines.contains(&line))
    }

    /// Lookup by user-supplied path; unresolvable paths never match.
    pub fn contains_path(&self, path: impl AsRef<Path>, line: u32) -> bool {
        match self.canonicalize(path) {
            Ok(canonical) => self.contains(&canonical, line),
            Err(_) => false,
        }
    }

    /// `(path, lines)` pairs, lexically by path then numerically by line.
    pub fn list(&self) -> Vec<(CanonicalPath, Vec<u32>)> {
        self.points
            .iter()
            .map(|(path, lines)| (path.clone(), lines.iter().copied().collect()))
            .collect()
    }

    /// Number of path entries.
    pub fn path_count(&self) -> usize {
        self.points.len()
    }

    /// Number of (path, line) pairs.
    pub fn len(&self) -> usize {
        self.points.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn fixture(names: &[&str]) -> (TempDir, Vec<PathBuf>) {
        let dir = tempfile::tempdir().unwrap();
        let paths = names
            .iter()
            .map(|name| {
                let path = dir.path().join(name);
                File::create(&path).unwrap();
                path
            })
            .collect();
        (dir, paths)
    }

    fn registry() -> BreakpointRegistry {
        BreakpointRegistry::new(PathPolicy::case_sensitive())
    }

    #[test]
    fn test_add_is_idempotent() {
        let (_dir, paths) = fixture(&["a.lua"]);
        let mut bps = registry();

        assert!(bps.add(&paths[0], 10).unwrap());
        assert!(!bps.add(&paths[0], 10).unwrap());
        assert_eq!(bps.len(), 1);
        assert!(bps.contains_path(&paths[0], 10));
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let (_dir, paths) = fixture(&["a.lua"]);
        let mut bps = registry();

        assert!(!bps.remove(&paths[0], 3).unwrap());
        assert!(bps.is_empty());

        bps.add(&paths[0], 4).unwrap();
        assert!(!bps.remove(&paths[0], 3).unwrap());
        assert_eq!(bps.len(), 1);
    }

    #[test]
    fn test_removing_last_line_prunes_path() {
        let (_dir, paths) = fixture(&["a.lua"]);
        let mut bps = registry();

        bps.add(&paths[0], 1).unwrap();
        bps.add(&paths[0], 2).unwrap();
        assert!(bps.remove(&paths[0], 1).unwrap());
        assert_eq!(bps.path_count(), 1);

        assert!(bps.remove(&paths[0], 2).unwrap());
        assert_eq!(bps.path_count(), 0);
        assert!(bps.is_empty());
        assert!(bps.list().is_empty());
    }

    #[test]
    fn test_invalid_path_mutates_nothing() {
        let (dir, paths) = fixture(&["a.lua"]);
        let mut bps = registry();
        bps.add(&paths[0], 7).unwrap();

        let err = bps.add(dir.path().join("missing.lua"), 7).unwrap_err();
        assert!(matches!(err, BreakpointError::InvalidPath { .. }));
        assert_eq!(bps.len(), 1);
        assert_eq!(bps.path_count(), 1);
    }

    #[test]
    fn test_line_zero_rejected() {
        let (_dir, paths) = fixture(&["a.lua"]);
        let mut bps = registry();
        assert!(matches!(bps.add(&paths[0], 0), Err(BreakpointError::InvalidLine(0))));
        assert!(bps.is_empty());
    }

    #[test]
    fn test_list_is_sorted() {
        let (_dir, paths) = fixture(&["b.lua", "a.lua"]);
        let mut bps = registry();

        bps.add(&paths[0], 30).unwrap();
        bps.add(&paths[0], 4).unwrap();
        bps.add(&paths[1], 12).unwrap();
        bps.add(&paths[1], 9).unwrap();
        bps.add(&paths[0], 100).unwrap();

        let listed = bps.list();
        assert_eq!(listed.len(), 2);
        assert!(listed[0].0.as_str().ends_with("a.lua"));
        assert_eq!(listed[0].1, vec![9, 12]);
        assert!(listed[1].0.as_str().ends_with("b.lua"));
        assert_eq!(listed[1].1, vec![4, 30, 100]);
    }

    #[test]
    fn test_equivalent_spellings_share_entry() {
        let (dir, paths) = fixture(&["a.lua"]);
        let mut bps = registry();

        bps.add(&paths[0], 5).unwrap();
        let dotted = dir.path().join(".").join("a.lua");
        assert!(!bps.add(&dotted, 5).unwrap());
        assert!(bps.contains_path(&dotted, 5));
        assert_eq!(bps.len(), 1);
    }

    #[test]
    fn test_case_insensitive_policy_folds_keys() {
        let (dir, _paths) = fixture(&["Upper.lua"]);
        let mut bps = BreakpointRegistry::new(PathPolicy { case_insensitive: true });

        bps.add(dir.path().join("Upper.lua"), 2).unwrap();
        let key = bps.canonicalize(dir.path().join("Upper.lua")).unwrap();
        assert!(bps.contains(&key, 2));
        assert_eq!(key.as_str(), key.as_str().to_lowercase());
    }

    #[test]
    fn test_clear() {
        let (_dir, paths) = fixture(&["a.lua", "b.lua"]);
        let mut bps = registry();
        bps.add(&paths[0], 1).unwrap();
        bps.add(&paths[1], 1).unwrap();
        bps.clear();
        assert!(bps.is_empty());
        assert!(!bps.contains_path(&paths[0], 1));
    }
}
