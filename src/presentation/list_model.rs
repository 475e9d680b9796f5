//! List presentation model for the bookmark lists screen.
//!
//! Binds a [`CategoryStore`] to a three-section list: categories, the
//! "create list" action and the notifications prompt. User actions are
//! forwarded to the store and answered with [`ViewUpdate`] deltas; store
//! notifications are reconciled against the live category count, falling
//! back to a full reload whenever an incremental delta cannot be trusted.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::rc::Rc;

use crate::managers::category_manager::CategoryStore;
use crate::managers::notifier::Subscription;
use crate::presentation::sections::SectionLayout;
use crate::services::export_service;
use crate::types::category::{Category, StoreEvent};
use crate::types::errors::{CategoryError, ValidationError};
use crate::types::section::{Action, IndexPath, SectionKind, ViewUpdate};
use crate::types::settings::ListSettings;

/// Store handle shared between the screen and the rest of the app.
pub type SharedStore<S> = Rc<RefCell<S>>;

/// Result of exporting a category for sharing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    Success(PathBuf),
    Error { title: String, message: String },
}

/// Construction parameters of the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub min_category_name_length: usize,
    pub max_category_name_length: usize,
    pub notifications_prompt_visible: bool,
    pub export_dir: PathBuf,
}

impl ModelConfig {
    pub fn from_settings(settings: &ListSettings, export_dir: PathBuf) -> Self {
        Self {
            min_category_name_length: settings.naming.min_category_name_length,
            max_category_name_length: settings.naming.max_category_name_length,
            notifications_prompt_visible: !settings.notifications_prompt_dismissed,
            export_dir,
        }
    }
}

pub struct ListPresentationModel<S: CategoryStore> {
    store: SharedStore<S>,
    config: ModelConfig,
    observation: Option<Subscription>,
    /// True while this model holds the store's notifications switched off.
    suppressing: bool,
    /// Category rows the view currently displays.
    rendered_categories: usize,
    /// Notifications the store will send back for this model's own mutations.
    own_echoes: VecDeque<StoreEvent>,
    updates: Vec<ViewUpdate>,
    last_export: Option<PathBuf>,
}

impl<S: CategoryStore> ListPresentationModel<S> {
    pub fn new(store: SharedStore<S>, config: ModelConfig) -> Self {
        let mut model = Self {
            store,
            config,
            observation: None,
            suppressing: false,
            rendered_categories: 0,
            own_echoes: VecDeque::new(),
            updates: Vec::new(),
            last_export: None,
        };
        model.rendered_categories = model.categories_count();
        model
    }

    pub fn store(&self) -> &SharedStore<S> {
        &self.store
    }

    pub fn max_category_name_length(&self) -> usize {
        self.config.max_category_name_length
    }

    pub fn min_category_name_length(&self) -> usize {
        self.config.min_category_name_length
    }

    /// Category count straight from the store.
    pub fn live_categories_count(&self) -> Result<usize, CategoryError> {
        self.store.borrow().categories_count()
    }

    /// Count used for layout. A failed read keeps the rows already on screen
    /// instead of collapsing the categories section.
    fn categories_count(&self) -> usize {
        match self.live_categories_count() {
            Ok(count) => count,
            Err(e) => {
                tracing::error!(error = %e, rendered = self.rendered_categories, "failed to count categories");
                self.rendered_categories
            }
        }
    }

    fn layout(&self) -> SectionLayout {
        SectionLayout::new(self.categories_count(), self.config.notifications_prompt_visible)
    }

    fn categories_path(&self, row: usize) -> Option<IndexPath> {
        self.layout()
            .index_of(SectionKind::Categories)
            .map(|section| IndexPath::new(section, row))
    }

    // --- section/row model ---

    pub fn number_of_sections(&self) -> usize {
        self.layout().section_count()
    }

    pub fn section_type(&self, section: usize) -> Option<SectionKind> {
        self.layout().kind_at(section)
    }

    pub fn section_index(&self, kind: SectionKind) -> Option<usize> {
        self.layout().index_of(kind)
    }

    pub fn number_of_rows(&self, kind: SectionKind) -> usize {
        self.layout().rows(kind)
    }

    /// Category displayed at `row`, read through from the store.
    pub fn category(&self, row: usize) -> Result<Category, CategoryError> {
        let count = self.categories_count();
        if row >= count {
            tracing::error!(row, count, "category row out of range");
            return Err(CategoryError::OutOfRange { index: row, count });
        }
        self.store.borrow().category_at(row)
    }

    pub fn action(&self, row: usize) -> Result<Action, CategoryError> {
        match row {
            0 => Ok(Action::Create),
            _ => Err(CategoryError::OutOfRange { index: row, count: 1 }),
        }
    }

    /// Delete is offered only while more than one category exists.
    pub fn can_delete_categories(&self) -> bool {
        self.categories_count() > 1
    }

    pub fn notifications_prompt_visible(&self) -> bool {
        self.config.notifications_prompt_visible
    }

    // --- validation and mutations ---

    /// Checks `name` against the length bounds and existing category names.
    pub fn validate_category_name(&self, name: &str) -> Result<(), CategoryError> {
        if name.trim().is_empty() {
            return Err(ValidationError::Empty.into());
        }
        let len = name.chars().count();
        if len < self.config.min_category_name_length {
            return Err(ValidationError::TooShort {
                min: self.config.min_category_name_length,
            }
            .into());
        }
        if len > self.config.max_category_name_length {
            return Err(ValidationError::TooLong {
                max: self.config.max_category_name_length,
            }
            .into());
        }
        if self.store.borrow().has_category_named(name)? {
            return Err(ValidationError::Duplicate(name.to_string()).into());
        }
        Ok(())
    }

    pub fn check_category(&self, name: &str) -> bool {
        self.validate_category_name(name).is_ok()
    }

    /// Appends a category and emits one insert for its row. Returns the row.
    pub fn add_category(&mut self, name: &str) -> Result<usize, CategoryError> {
        self.validate_category_name(name)?;
        self.process_store_events();
        let echoed = self.echoes_expected();
        let id = self.store.borrow_mut().create_category(name)?;
        let count = self.live_categories_count()?;
        let row = count.saturating_sub(1);
        self.expect_echo(echoed, StoreEvent::CategoryAdded(row));
        tracing::info!(%id, row, "category added");

        if self.rendered_categories == 0 {
            // The categories section itself appears
            self.push_reload_all();
        } else {
            match self.categories_path(row) {
                Some(path) => self.updates.push(ViewUpdate::RowsInserted { paths: vec![path] }),
                None => self.push_reload_all(),
            }
        }
        self.rendered_categories = count;
        Ok(row)
    }

    /// Renames the category at `row`; the categories section is reloaded.
    pub fn rename_category(&mut self, row: usize, name: &str) -> Result<(), CategoryError> {
        let category = self.category(row)?;
        if category.name == name {
            return Ok(());
        }
        self.validate_category_name(name)?;
        self.process_store_events();
        let echoed = self.echoes_expected();
        self.store.borrow_mut().rename_category(&category.id, name)?;
        self.expect_echo(echoed, StoreEvent::CategoryUpdated(row));
        self.updates.push(ViewUpdate::SectionsChanged {
            sections: vec![SectionKind::Categories],
        });
        Ok(())
    }

    /// Deletes the category at `row` and emits one delete for that row.
    ///
    /// The last remaining category is never deleted; the request is rejected
    /// without touching the store or the view.
    pub fn delete_category(&mut self, row: usize) -> Result<(), CategoryError> {
        self.process_store_events();
        let count = self.live_categories_count()?;
        if row >= count {
            tracing::error!(row, count, "delete requested for missing row");
            return Err(CategoryError::OutOfRange { index: row, count });
        }
        if count <= 1 {
            tracing::warn!(row, "refusing to delete the last category");
            return Err(CategoryError::LastCategory);
        }
        // Resolve the path before the section layout changes
        let path = self.categories_path(row);
        let category = self.store.borrow().category_at(row)?;
        let echoed = self.echoes_expected();
        self.store.borrow_mut().delete_category(&category.id)?;
        self.expect_echo(echoed, StoreEvent::CategoryRemoved(row));
        tracing::info!(id = %category.id, row, "category deleted");

        match path {
            Some(path) => self.updates.push(ViewUpdate::RowsDeleted { paths: vec![path] }),
            None => self.push_reload_all(),
        }
        self.rendered_categories = count - 1;
        Ok(())
    }

    /// Writes the visibility flag through. Emits no delta; the caller decides
    /// whether the row needs reloading.
    pub fn set_category_visible(&mut self, row: usize, visible: bool) -> Result<(), CategoryError> {
        let category = self.category(row)?;
        let echoed = self.echoes_expected();
        self.store.borrow_mut().set_category_visible(&category.id, visible)?;
        self.expect_echo(echoed, StoreEvent::VisibilityChanged);
        Ok(())
    }

    /// Shows (`true`) or hides every category. Follow with [`Self::reload_data`].
    pub fn update_all_categories_visibility(&mut self, show_all: bool) -> Result<(), CategoryError> {
        let echoed = self.echoes_expected();
        self.store.borrow_mut().set_all_visible(show_all)?;
        self.expect_echo(echoed, StoreEvent::VisibilityChanged);
        Ok(())
    }

    /// True iff every category is hidden. Drives the header's "show all" toggle.
    pub fn are_all_categories_hidden(&self) -> bool {
        match self.store.borrow().list_categories() {
            Ok(categories) => categories.iter().all(|c| !c.visible),
            Err(e) => {
                tracing::error!(error = %e, "failed to read category visibility");
                false
            }
        }
    }

    /// Hides the notifications prompt for good; the section disappears.
    pub fn dismiss_notifications_prompt(&mut self) {
        if self.config.notifications_prompt_visible {
            self.config.notifications_prompt_visible = false;
            self.push_reload_all();
        }
    }

    // --- export ---

    /// Exports the category at `row` and calls `completion` exactly once.
    pub async fn share_category_file<F>(&mut self, row: usize, completion: F)
    where
        F: FnOnce(ShareOutcome),
    {
        let outcome = self.export_row(row).await;
        completion(outcome);
    }

    async fn export_row(&mut self, row: usize) -> ShareOutcome {
        // Snapshot first: no store borrow may live across the await
        let snapshot = match self
            .category(row)
            .and_then(|category| self.store.borrow().export_snapshot(&category.id))
        {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::error!(row, error = %e, "cannot snapshot category for export");
                return ShareOutcome::Error {
                    title: "Unable to share".to_string(),
                    message: e.to_string(),
                };
            }
        };

        match export_service::export_category(&snapshot, &self.config.export_dir).await {
            Ok(path) => {
                self.last_export = Some(path.clone());
                ShareOutcome::Success(path)
            }
            Err(e) => {
                tracing::warn!(row, error = %e, "category export failed");
                let (title, message) = e.user_message();
                ShareOutcome::Error { title, message }
            }
        }
    }

    /// Removes the file produced by the last successful export.
    pub async fn finish_share_category(&mut self) {
        if let Some(path) = self.last_export.take() {
            if let Err(e) = export_service::remove_export(&path).await {
                tracing::warn!(error = %e, "failed to remove shared export");
            }
        }
    }

    // --- store observation ---

    pub fn set_notifications_enabled(&mut self, enabled: bool) {
        self.suppressing = !enabled;
        self.store.borrow_mut().set_notifications_enabled(enabled);
    }

    pub fn is_observing(&self) -> bool {
        self.observation.is_some()
    }

    pub fn add_to_observer_list(&mut self) {
        if self.observation.is_none() {
            self.observation = Some(self.store.borrow_mut().subscribe());
        }
    }

    /// Stops observing. Events still queued for this model are discarded.
    pub fn remove_from_observer_list(&mut self) {
        if let Some(subscription) = self.observation.take() {
            self.store.borrow_mut().unsubscribe(subscription.id());
        }
        self.own_echoes.clear();
    }

    /// Foreground entry: suppress store notifications and start observing.
    pub fn enter_foreground(&mut self) {
        self.set_notifications_enabled(false);
        self.add_to_observer_list();
    }

    /// Foreground exit: re-enable notifications, consume the catch-up and stop observing.
    pub fn leave_foreground(&mut self) {
        self.set_notifications_enabled(true);
        self.process_store_events();
        self.remove_from_observer_list();
    }

    /// Scoped foreground lifetime: leaving happens when the guard drops.
    pub fn foreground(&mut self) -> ForegroundGuard<'_, S> {
        self.enter_foreground();
        ForegroundGuard { model: self }
    }

    /// Converts store notifications delivered so far into view updates.
    pub fn process_store_events(&mut self) {
        let delivered = match &mut self.observation {
            Some(subscription) => subscription.drain(),
            None => return,
        };
        let events = self.skip_own_echoes(delivered);
        if events.is_empty() {
            return;
        }
        tracing::debug!(count = events.len(), "processing store notifications");

        let mut full_reload = false;
        let mut reload_categories = false;
        let mut inserted = Vec::new();
        let mut removed = Vec::new();
        let mut conversions = Vec::new();
        for event in events {
            match event {
                StoreEvent::Reloaded => full_reload = true,
                StoreEvent::CategoryAdded(index) => inserted.push(index),
                StoreEvent::CategoryRemoved(index) => removed.push(index),
                StoreEvent::CategoryUpdated(_) | StoreEvent::VisibilityChanged => {
                    reload_categories = true
                }
                StoreEvent::ConversionFinished(success) => conversions.push(success),
            }
        }

        let live = self.categories_count();
        if !full_reload {
            full_reload = !self.reconcile_rows(live, &inserted, &removed);
        }

        if full_reload {
            self.push_reload_all();
        } else if reload_categories && live > 0 {
            self.updates.push(ViewUpdate::SectionsChanged {
                sections: vec![SectionKind::Categories],
            });
        }
        self.rendered_categories = live;

        for success in conversions {
            self.updates.push(ViewUpdate::ConversionFinished { success });
        }
    }

    /// Emits row deltas for a batch of structural events. Returns false when
    /// the batch does not line up with the live count and a full reload is needed.
    fn reconcile_rows(&mut self, live: usize, inserted: &[usize], removed: &[usize]) -> bool {
        let rendered = self.rendered_categories;
        if inserted.is_empty() && removed.is_empty() {
            return live == rendered;
        }
        if !inserted.is_empty() && !removed.is_empty() {
            return false;
        }
        // A section appearing or disappearing cannot be expressed as row deltas
        if rendered == 0 || live == 0 {
            return false;
        }

        let section = match self.categories_path(0) {
            Some(path) => path.section,
            None => return false,
        };
        if !inserted.is_empty() {
            let rows = rows_after_inserts(inserted);
            if live != rendered + rows.len() || rows.iter().any(|row| *row >= live) {
                return false;
            }
            let paths = rows.into_iter().map(|row| IndexPath::new(section, row)).collect();
            self.updates.push(ViewUpdate::RowsInserted { paths });
        } else {
            let rows = rows_before_removals(removed);
            if live + rows.len() != rendered || rows.iter().any(|row| *row >= rendered) {
                return false;
            }
            let paths = rows.into_iter().map(|row| IndexPath::new(section, row)).collect();
            self.updates.push(ViewUpdate::RowsDeleted { paths });
        }
        true
    }

    /// True when a mutation made now will be echoed back to this model.
    fn echoes_expected(&self) -> bool {
        self.observation.is_some() && self.store.borrow().notifications_enabled()
    }

    fn expect_echo(&mut self, echoed: bool, event: StoreEvent) {
        if echoed {
            self.own_echoes.push_back(event);
        }
    }

    /// Drops the notifications caused by this model's own mutations, which
    /// the view has already been told about.
    fn skip_own_echoes(&mut self, delivered: Vec<StoreEvent>) -> Vec<StoreEvent> {
        let mut external = Vec::with_capacity(delivered.len());
        for event in delivered {
            if self.own_echoes.front() == Some(&event) {
                self.own_echoes.pop_front();
            } else {
                external.push(event);
            }
        }
        if !self.own_echoes.is_empty() {
            tracing::warn!(missing = self.own_echoes.len(), "own mutations were not echoed by the store");
            self.own_echoes.clear();
        }
        external
    }

    // --- outbox ---

    /// Full reload (screen about to appear).
    pub fn reload_data(&mut self) {
        self.push_reload_all();
        self.rendered_categories = self.categories_count();
    }

    fn push_reload_all(&mut self) {
        self.updates.push(ViewUpdate::reload_all());
    }

    /// Drains view updates produced since the last call, oldest first.
    pub fn take_updates(&mut self) -> Vec<ViewUpdate> {
        std::mem::take(&mut self.updates)
    }
}

/// Maps sequential removal indices, each relative to the rows left by the
/// removals before it, back to distinct row indices before the whole batch.
fn rows_before_removals(removed: &[usize]) -> Vec<usize> {
    let mut original: Vec<usize> = Vec::with_capacity(removed.len());
    for &index in removed {
        let mut row = index;
        for &gone in &original {
            if gone <= row {
                row += 1;
            } else {
                break;
            }
        }
        let at = original.partition_point(|gone| *gone < row);
        original.insert(at, row);
    }
    original
}

/// Maps sequential insertion indices, each relative to the rows present right
/// after that insertion, to distinct row indices after the whole batch.
fn rows_after_inserts(inserted: &[usize]) -> Vec<usize> {
    let mut rows: Vec<usize> = Vec::with_capacity(inserted.len());
    for &index in inserted {
        for row in rows.iter_mut() {
            if *row >= index {
                *row += 1;
            }
        }
        rows.push(index);
    }
    rows.sort_unstable();
    rows
}

impl<S: CategoryStore> Drop for ListPresentationModel<S> {
    fn drop(&mut self) {
        // Never leave the shared store muted or holding a dead observer
        if let Ok(mut store) = self.store.try_borrow_mut() {
            if let Some(subscription) = self.observation.take() {
                store.unsubscribe(subscription.id());
            }
            if self.suppressing {
                store.set_notifications_enabled(true);
            }
        }
    }
}

/// Keeps the model in the foreground state until dropped.
pub struct ForegroundGuard<'a, S: CategoryStore> {
    model: &'a mut ListPresentationModel<S>,
}

impl<S: CategoryStore> Deref for ForegroundGuard<'_, S> {
    type Target = ListPresentationModel<S>;

    fn deref(&self) -> &Self::Target {
        self.model
    }
}

impl<S: CategoryStore> DerefMut for ForegroundGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.model
    }
}

impl<S: CategoryStore> Drop for ForegroundGuard<'_, S> {
    fn drop(&mut self) {
        self.model.leave_foreground();
    }
}
