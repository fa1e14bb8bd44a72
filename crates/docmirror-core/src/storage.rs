//! Output document storage.
//!
//! The reconciliation engine treats the output location as a flat key/value
//! blob store keyed by document identifier. [`DirectoryStore`] is the
//! filesystem implementation; tests can substitute an in-memory store.

use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Flat store of named text documents.
pub trait DocumentStore: Send + Sync {
    /// Create or replace `name` with `content`.
    fn write_document(&self, name: &str, content: &str) -> Result<()>;

    /// Read `name`, or `None` if it does not exist.
    fn read_document(&self, name: &str) -> Result<Option<String>>;

    /// Whether `name` exists.
    fn has_document(&self, name: &str) -> bool;

    /// Names of all stored documents, sorted.
    fn list_documents(&self) -> Result<Vec<String>>;
}

/// Documents stored as files in a single directory.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Use `root` as the output directory; it is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The output directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn document_path(&self, name: &str) -> Result<PathBuf> {
        validate_name(name)?;
        Ok(self.root.join(name))
    }
}

impl DocumentStore for DirectoryStore {
    fn write_document(&self, name: &str, content: &str) -> Result<()> {
        let path = self.document_path(name)?;
        fs::create_dir_all(&self.root).map_err(|e| {
            Error::Storage(format!(
                "Failed to create output directory {}: {e}",
                self.root.display()
            ))
        })?;
        write_atomic(&path, content.as_bytes())?;
        debug!("Saved {}", name);
        Ok(())
    }

    fn read_document(&self, name: &str) -> Result<Option<String>> {
        let path = self.document_path(name)?;
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| Error::Storage(format!("Failed to read {name}: {e}")))
    }

    fn has_document(&self, name: &str) -> bool {
        self.document_path(name)
            .map(|path| path.is_file())
            .unwrap_or(false)
    }

    fn list_documents(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.root).map_err(|e| {
            Error::Storage(format!(
                "Failed to list output directory {}: {e}",
                self.root.display()
            ))
        })?;

        let mut names: Vec<String> = entries
            .flatten()
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
            .filter(|name| {
                !name.starts_with('.')
                    && Path::new(name)
                        .extension()
                        .is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
            })
            .collect();
        names.sort();
        Ok(names)
    }
}

/// Reject names that could escape the output directory.
fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::Storage("Document name cannot be empty".into()));
    }
    if name.contains("..") || name.contains('/') || name.contains('\\') || name.contains('\0') {
        return Err(Error::Storage(format!(
            "Invalid document name '{name}': contains path separators or traversal"
        )));
    }
    Ok(())
}

/// Write `bytes` to a sibling temp file and rename it over `path`.
///
/// Readers see either the previous file or the new one, never a partial write.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| Error::Storage(format!("Invalid target path {}", path.display())))?;
    let tmp_path = path.with_file_name(format!(".{file_name}.tmp"));

    fs::write(&tmp_path, bytes)
        .map_err(|e| Error::Storage(format!("Failed to write {}: {e}", tmp_path.display())))?;

    #[cfg(target_os = "windows")]
    if path.exists() {
        fs::remove_file(path).map_err(|e| {
            Error::Storage(format!("Failed to remove existing {}: {e}", path.display()))
        })?;
    }

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        Error::Storage(format!("Failed to commit {}: {e}", path.display()))
    })
}
