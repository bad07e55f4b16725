//! Discovery of the Rust sources an object model is extracted from.

use crate::error::{CliResult, ScanError};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// A Rust source file read from disk.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,

    /// Path relative to the scan root; used for filtering and ordering.
    pub relative_path: PathBuf,

    pub content: String,
}

impl SourceFile {
    /// In-memory source, mostly for tests and piping.
    pub fn in_memory(name: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        let path = name.into();
        Self {
            relative_path: path.clone(),
            path,
            content: content.into(),
        }
    }
}

/// Walks a directory tree collecting `.rs` files.
///
/// Files come back sorted by relative path so that type lookup, which keeps
/// the first definition of a name, does not depend on directory iteration
/// order.
#[derive(Debug)]
pub struct SourceScanner {
    root: PathBuf,
    respect_gitignore: bool,
    filter: Option<glob::Pattern>,
}

impl SourceScanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            respect_gitignore: true,
            filter: None,
        }
    }

    pub fn with_gitignore(mut self, respect: bool) -> Self {
        self.respect_gitignore = respect;
        self
    }

    /// Restrict the scan to files whose relative path matches `pattern`.
    pub fn with_filter(mut self, pattern: &str) -> Result<Self, ScanError> {
        let glob_pattern = glob::Pattern::new(pattern)
            .map_err(|e| ScanError::invalid_pattern(pattern, e.to_string()))?;
        self.filter = Some(glob_pattern);
        Ok(self)
    }

    /// Scan the tree; finding no Rust file is an error.
    ///
    /// A root that is itself a `.rs` file scans just that file.
    pub fn scan(&self) -> CliResult<Vec<SourceFile>> {
        if !self.root.exists() {
            return Err(ScanError::not_found(self.root.clone()).into());
        }

        let mut files = Vec::new();

        // `target/` holds build output, never model sources.
        let walker = WalkBuilder::new(&self.root)
            .git_ignore(self.respect_gitignore)
            .git_global(self.respect_gitignore)
            .git_exclude(self.respect_gitignore)
            .hidden(false)
            .filter_entry(|entry| entry.file_name() != "target")
            .build();

        for entry in walker {
            let entry = entry.map_err(ScanError::Walk)?;
            let path = entry.path();

            if !path.is_file() || path.extension().map_or(true, |ext| ext != "rs") {
                continue;
            }

            let relative = self.relative_path(path);
            if let Some(ref pattern) = self.filter {
                if !pattern.matches_path(&relative) {
                    tracing::trace!(path = %relative.display(), "filtered out");
                    continue;
                }
            }

            let content = std::fs::read_to_string(path).map_err(|e| ScanError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

            files.push(SourceFile {
                path: path.to_path_buf(),
                relative_path: relative,
                content,
            });
        }

        if files.is_empty() {
            return Err(ScanError::no_rust_files(self.root.clone()).into());
        }

        files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        tracing::debug!(root = %self.root.display(), count = files.len(), "scanned sources");
        Ok(files)
    }

    fn relative_path(&self, path: &Path) -> PathBuf {
        match path.strip_prefix(&self.root) {
            Ok(relative) if !relative.as_os_str().is_empty() => relative.to_path_buf(),
            _ => path
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| path.to_path_buf()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}
