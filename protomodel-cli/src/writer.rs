//! Writing generated schemas to disk.

use crate::error::{CliResult, WriteError};
use std::path::{Path, PathBuf};

/// Outcome of writing one schema file.
#[derive(Debug, PartialEq, Eq)]
pub enum WriteResult {
    Written { path: PathBuf, bytes: usize },

    /// The file already held exactly this content and was left untouched.
    Unchanged { path: PathBuf },

    /// Dry run; nothing touched the filesystem.
    DryRun { path: PathBuf, content: String },
}

/// File writer with dry-run support.
#[derive(Debug)]
pub struct FileWriter {
    dry_run: bool,
}

impl FileWriter {
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    /// Write `content` to `path`, creating parent directories.
    ///
    /// Identical existing content is not rewritten so file timestamps stay
    /// stable for build tools watching the output.
    pub fn write(&self, path: &Path, content: &str) -> CliResult<WriteResult> {
        if self.dry_run {
            return Ok(WriteResult::DryRun {
                path: path.to_path_buf(),
                content: content.to_string(),
            });
        }

        if std::fs::read_to_string(path).is_ok_and(|existing| existing == content) {
            tracing::debug!(path = %path.display(), "schema unchanged");
            return Ok(WriteResult::Unchanged {
                path: path.to_path_buf(),
            });
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| WriteError::CreateDir {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        std::fs::write(path, content).map_err(|e| WriteError::WriteFile {
            path: path.to_path_buf(),
            source: e,
        })?;

        tracing::debug!(path = %path.display(), bytes = content.len(), "schema written");
        Ok(WriteResult::Written {
            path: path.to_path_buf(),
            bytes: content.len(),
        })
    }
}

impl WriteResult {
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path, .. }
            | WriteResult::Unchanged { path }
            | WriteResult::DryRun { path, .. } => path,
        }
    }

    pub fn was_written(&self) -> bool {
        matches!(self, WriteResult::Written { .. })
    }
}
