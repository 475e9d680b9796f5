use serde::{Deserialize, Serialize};

/// Semantic kind of a list section, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Categories,
    Actions,
    Notifications,
}

impl SectionKind {
    /// All kinds in their fixed relative order.
    pub const ALL: [SectionKind; 3] = [
        SectionKind::Categories,
        SectionKind::Actions,
        SectionKind::Notifications,
    ];
}

/// Rows of the actions section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Create,
}

/// Dense (section, row) address as the list view sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexPath {
    pub section: usize,
    pub row: usize,
}

impl IndexPath {
    pub fn new(section: usize, row: usize) -> Self {
        Self { section, row }
    }
}

/// Incremental list-view mutation emitted by the presentation model.
///
/// Each value is applied by the view as one atomic update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewUpdate {
    /// Reload the listed sections; an empty list means reload everything.
    SectionsChanged { sections: Vec<SectionKind> },
    /// Distinct, ascending paths as they are after the update.
    RowsInserted { paths: Vec<IndexPath> },
    /// Distinct, ascending paths as they were before the update.
    RowsDeleted { paths: Vec<IndexPath> },
    ConversionFinished { success: bool },
}

impl ViewUpdate {
    /// Full reload.
    pub fn reload_all() -> Self {
        ViewUpdate::SectionsChanged { sections: Vec::new() }
    }

    /// True for a reload-everything update.
    pub fn is_full_reload(&self) -> bool {
        matches!(self, ViewUpdate::SectionsChanged { sections } if sections.is_empty())
    }
}
