//! Legacy category file conversion.
//!
//! Older builds kept each category as a standalone JSON file
//! (`{"name": ..., "bookmarks": [...]}`). Conversion imports every such
//! file in a directory as a new category and reports the outcome through
//! the store's notification channel.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::managers::category_manager::CategoryStore;
use crate::types::category::ExportedBookmark;
use crate::types::errors::ConversionError;

#[derive(Debug, Deserialize)]
struct LegacyCategoryFile {
    name: String,
    #[serde(default = "default_visible")]
    visible: bool,
    #[serde(default)]
    bookmarks: Vec<ExportedBookmark>,
}

fn default_visible() -> bool {
    true
}

/// Imports every `*.json` file in `dir`. Returns how many categories were created.
///
/// The store always receives a `ConversionFinished` notification, with
/// `false` when any file failed; files converted before a failure stay imported.
pub fn convert_legacy_files<S: CategoryStore>(store: &mut S, dir: &Path) -> Result<usize, ConversionError> {
    let result = import_dir(store, dir);
    match &result {
        Ok(count) => tracing::info!(dir = %dir.display(), count, "legacy categories converted"),
        Err(e) => tracing::warn!(dir = %dir.display(), error = %e, "legacy conversion failed"),
    }
    store.notify_conversion_finished(result.is_ok());
    result
}

fn import_dir<S: CategoryStore>(store: &mut S, dir: &Path) -> Result<usize, ConversionError> {
    let entries = fs::read_dir(dir).map_err(|e| ConversionError::Io(format!("{}: {}", dir.display(), e)))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| ConversionError::Io(e.to_string()))?.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
            files.push(path);
        }
    }
    // Directory order is platform dependent
    files.sort();

    let mut imported = 0;
    for path in files {
        let content = fs::read_to_string(&path)
            .map_err(|e| ConversionError::Io(format!("{}: {}", path.display(), e)))?;
        let legacy: LegacyCategoryFile = serde_json::from_str(&content).map_err(|e| ConversionError::Parse {
            file: path.display().to_string(),
            message: e.to_string(),
        })?;

        let name = unique_name(store, &legacy.name)?;
        let id = store.create_category(&name)?;
        for bookmark in &legacy.bookmarks {
            store.add_bookmark(&id, &bookmark.name, bookmark.latitude, bookmark.longitude)?;
        }
        if !legacy.visible {
            store.set_category_visible(&id, false)?;
        }
        imported += 1;
    }
    Ok(imported)
}

/// Appends " (2)", " (3)", ... until the name is free.
fn unique_name<S: CategoryStore>(store: &S, base: &str) -> Result<String, ConversionError> {
    let base = if base.trim().is_empty() { "Imported" } else { base };
    if !store.has_category_named(base)? {
        return Ok(base.to_string());
    }
    let mut n = 2;
    loop {
        let candidate = format!("{} ({})", base, n);
        if !store.has_category_named(&candidate)? {
            return Ok(candidate);
        }
        n += 1;
    }
}
