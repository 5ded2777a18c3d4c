//! Context types for rule execution.

use std::path::{Path, PathBuf};

/// Context provided to per-file rules.
#[derive(Debug, Clone)]
pub struct FileContext<'a> {
    /// Absolute path to the file.
    pub path: &'a Path,
    /// File contents as a string.
    pub content: &'a str,
    /// Path relative to the project root.
    pub relative_path: PathBuf,
}

impl<'a> FileContext<'a> {
    /// Creates a new file context.
    #[must_use]
    pub fn new(path: &'a Path, content: &'a str, root: &Path) -> Self {
        let relative_path = path
            .strip_prefix(root)
            .map_or_else(|_| path.to_path_buf(), Path::to_path_buf);

        Self {
            path,
            content,
            relative_path,
        }
    }

    /// Creates a context for in-memory source, e.g. stdin or tests.
    #[must_use]
    pub fn for_source(name: &'a Path, content: &'a str) -> Self {
        Self {
            path: name,
            content,
            relative_path: name.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_path() {
        let ctx = FileContext::new(
            Path::new("/project/src/model.rs"),
            "",
            Path::new("/project"),
        );
        assert_eq!(ctx.relative_path, PathBuf::from("src/model.rs"));
    }

    #[test]
    fn test_relative_path_outside_root() {
        let ctx = FileContext::new(Path::new("/other/a.rs"), "", Path::new("/project"));
        assert_eq!(ctx.relative_path, PathBuf::from("/other/a.rs"));
    }
}
