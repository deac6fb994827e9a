//! Canonical source paths used as breakpoint keys.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

/// Absolute, symlink-resolved, platform-normalized path text.
///
/// Only constructed through [`PathPolicy::canonicalize`], so two values
/// compare equal exactly when they name the same file under the policy.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanonicalPath(String);

impl CanonicalPath {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// How paths are normalized before they become keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathPolicy {
    /// Fold to lower case (filesystems that ignore case).
    pub case_insensitive: bool,
}

impl Default for PathPolicy {
    fn default() -> Self {
        Self::native()
    }
}

impl PathPolicy {
    /// Windows and macOS default to case-insensitive filesystems.
    pub fn native() -> Self {
        Self {
            case_insensitive: cfg!(any(windows, target_os = "macos")),
        }
    }

    pub fn case_sensitive() -> Self {
        Self { case_insensitive: false }
    }

    /// Resolve `path` against the working directory and normalize it.
    ///
    /// Fails unless the path names an existing, accessible regular file.
    pub fn canonicalize(&self, path: impl AsRef<Path>) -> io::Result<CanonicalPath> {
        let resolved = fs::canonicalize(path.as_ref())?;
        if !fs::metadata(&resolved)?.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", resolved.display()),
            ));
        }

        let mut text = strip_verbatim_prefix(&resolved.to_string_lossy());
        if self.case_insensitive {
            text = text.to_lowercase();
        }
        Ok(CanonicalPath(text))
    }
}

/// `fs::canonicalize` on Windows yields `\\?\C:\...` / `\\?\UNC\host\share`.
/// Strip the verbatim prefix so keys read like the paths users type.
fn strip_verbatim_prefix(path: &str) -> String {
    if let Some(rest) = path.strip_prefix(r"\\?\UNC\") {
        format!(r"\\{}", rest)
    } else if let Some(rest) = path.strip_prefix(r"\\?\") {
        rest.to_string()
    } else {
        path.to_string()
    }
}
