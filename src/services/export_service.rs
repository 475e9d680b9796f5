//! Category export.
//!
//! Writes a category snapshot to `<dir>/<name>.json` using tokio's async
//! filesystem API. The snapshot is taken by the caller so no store borrow
//! is held while the write is in flight.

use std::path::{Path, PathBuf};

use crate::types::category::CategorySnapshot;
use crate::types::errors::ExportError;

/// File extension of exported category files.
pub const EXPORT_EXTENSION: &str = "json";

/// Turns a category name into a file stem that is safe on every platform.
pub fn file_stem_for(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let stem = stem.trim().trim_matches('.').to_string();
    if stem.is_empty() {
        "bookmarks".to_string()
    } else {
        stem
    }
}

/// Serializes `snapshot` and writes it below `dir`, creating `dir` if needed.
///
/// Returns the path of the written file.
pub async fn export_category(snapshot: &CategorySnapshot, dir: &Path) -> Result<PathBuf, ExportError> {
    let body = serde_json::to_vec_pretty(snapshot)
        .map_err(|e| ExportError::Serialization(e.to_string()))?;

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| ExportError::Io(format!("{}: {}", dir.display(), e)))?;

    let path = dir.join(format!("{}.{}", file_stem_for(&snapshot.name), EXPORT_EXTENSION));
    tokio::fs::write(&path, body)
        .await
        .map_err(|e| ExportError::Io(format!("{}: {}", path.display(), e)))?;

    tracing::info!(path = %path.display(), bookmarks = snapshot.bookmarks.len(), "category exported");
    Ok(path)
}

/// Removes a previously exported file once sharing has finished.
pub async fn remove_export(path: &Path) -> Result<(), ExportError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ExportError::Io(format!("{}: {}", path.display(), e))),
    }
}
