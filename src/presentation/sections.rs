//! Section layout of the bookmark lists screen.
//!
//! The layout is a pure function of the live category count and whether the
//! notifications prompt is still shown. It is recomputed for every query so
//! dense section indices can never drift from the store.

use crate::types::section::SectionKind;

/// Snapshot of the inputs that determine which sections are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionLayout {
    pub categories: usize,
    pub notifications_prompt: bool,
}

impl SectionLayout {
    pub fn new(categories: usize, notifications_prompt: bool) -> Self {
        Self {
            categories,
            notifications_prompt,
        }
    }

    /// Row count of `kind`, zero when the section is absent.
    pub fn rows(&self, kind: SectionKind) -> usize {
        match kind {
            SectionKind::Categories => self.categories,
            SectionKind::Actions => 1,
            SectionKind::Notifications => usize::from(self.notifications_prompt),
        }
    }

    /// Sections with at least one row, in display order.
    pub fn sections(&self) -> Vec<SectionKind> {
        SectionKind::ALL
            .into_iter()
            .filter(|kind| self.rows(*kind) > 0)
            .collect()
    }

    pub fn section_count(&self) -> usize {
        self.sections().len()
    }

    /// Maps a dense section index back to its kind.
    pub fn kind_at(&self, index: usize) -> Option<SectionKind> {
        self.sections().get(index).copied()
    }

    /// Dense index of `kind`, or `None` when the section is omitted.
    pub fn index_of(&self, kind: SectionKind) -> Option<usize> {
        self.sections().iter().position(|k| *k == kind)
    }
}
