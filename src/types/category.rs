use serde::{Deserialize, Serialize};

/// A named, user-visible group of saved map points.
///
/// Rows are read through the store on every render; nothing here is cached
/// by the presentation layer beyond one pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub visible: bool,
    pub bookmarks_count: usize,
    pub position: i32,
}

/// A saved point inside a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: String,
    pub category_id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: i64,
}

/// Everything the exporter needs to write one category file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySnapshot {
    pub name: String,
    pub visible: bool,
    pub bookmarks: Vec<ExportedBookmark>,
}

/// Bookmark as it appears in exported and legacy category files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedBookmark {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Change notification sent by the store to its subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    /// A category was appended or inserted at the given index.
    CategoryAdded(usize),
    /// The category previously at the given index was removed.
    CategoryRemoved(usize),
    /// Name or contents of the category at the given index changed.
    CategoryUpdated(usize),
    /// One or more visibility flags changed.
    VisibilityChanged,
    /// Catch-up after suppression: consumers must reload everything.
    Reloaded,
    /// Legacy file conversion completed.
    ConversionFinished(bool),
}
