//! Bookmark lists screen controller.
//!
//! Glue between a list widget, the presentation model, navigation and
//! alerts. Gestures become model calls; model updates are applied to the
//! widget in the order they were produced.

use std::path::Path;

use crate::managers::category_manager::CategoryStore;
use crate::presentation::list_model::{ListPresentationModel, ShareOutcome};
use crate::types::errors::{CategoryError, ValidationError};
use crate::types::section::{Action, IndexPath, SectionKind, ViewUpdate};

/// List widget hosting the screen.
pub trait ListView {
    /// Applies one update atomically.
    fn apply(&mut self, update: &ViewUpdate);
    fn reload_row(&mut self, path: IndexPath);
    /// Sets the categories header toggle ("show all" when true).
    fn set_show_all(&mut self, show_all: bool);
}

/// Navigation host.
pub trait Navigator {
    fn open_category(&mut self, category_id: &str);
    fn open_category_settings(&mut self, category_id: &str);
    fn pop(&mut self);
}

/// Modal prompts and alerts.
pub trait AlertPresenter {
    /// Asks for a category name. `rejected` carries the reason the previous
    /// entry was refused. `None` means the user cancelled.
    fn prompt_category_name(
        &mut self,
        min: usize,
        max: usize,
        rejected: Option<&ValidationError>,
    ) -> Option<String>;
    fn present_info(&mut self, title: &str, message: &str);
    fn present_conversion_error(&mut self);
    fn present_share(&mut self, path: &Path);
}

/// Content of one list cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellModel {
    Category {
        name: String,
        visible: bool,
        bookmarks_count: usize,
    },
    Action(Action),
    NotificationsPrompt,
}

/// Header of one section.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionHeader {
    Categories { title: String, show_all: bool },
    Actions,
    Notifications,
}

/// Entries of the per-category "more" menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Edit,
    ShowHide { visible: bool },
    Export,
    Delete { enabled: bool },
    Cancel,
}

pub struct CategoriesScreen<S, V, N, A>
where
    S: CategoryStore,
    V: ListView,
    N: Navigator,
    A: AlertPresenter,
{
    model: ListPresentationModel<S>,
    view: V,
    navigator: N,
    alerts: A,
}

impl<S, V, N, A> CategoriesScreen<S, V, N, A>
where
    S: CategoryStore,
    V: ListView,
    N: Navigator,
    A: AlertPresenter,
{
    pub fn new(model: ListPresentationModel<S>, view: V, navigator: N, alerts: A) -> Self {
        Self {
            model,
            view,
            navigator,
            alerts,
        }
    }

    pub fn model(&self) -> &ListPresentationModel<S> {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut ListPresentationModel<S> {
        &mut self.model
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn alerts(&self) -> &A {
        &self.alerts
    }

    /// Hands pending model updates to the widget.
    pub fn flush(&mut self) {
        for update in self.model.take_updates() {
            if let ViewUpdate::ConversionFinished { success: false } = update {
                self.alerts.present_conversion_error();
            }
            self.view.apply(&update);
        }
    }

    // --- lifecycle ---

    pub fn will_appear(&mut self) {
        self.model.reload_data();
        self.flush();
    }

    /// Store notifications stay muted while the screen is visible.
    pub fn did_appear(&mut self) {
        self.model.enter_foreground();
    }

    pub fn did_disappear(&mut self) {
        self.model.leave_foreground();
        self.flush();
    }

    // --- data source ---

    pub fn number_of_sections(&self) -> usize {
        self.model.number_of_sections()
    }

    pub fn number_of_rows(&self, section: usize) -> usize {
        match self.model.section_type(section) {
            Some(kind) => self.model.number_of_rows(kind),
            None => 0,
        }
    }

    pub fn cell(&self, path: IndexPath) -> Result<CellModel, CategoryError> {
        match self.section_kind(path.section)? {
            SectionKind::Categories => {
                let category = self.model.category(path.row)?;
                Ok(CellModel::Category {
                    name: category.name,
                    visible: category.visible,
                    bookmarks_count: category.bookmarks_count,
                })
            }
            SectionKind::Actions => Ok(CellModel::Action(self.model.action(path.row)?)),
            SectionKind::Notifications => Ok(CellModel::NotificationsPrompt),
        }
    }

    pub fn header(&self, section: usize) -> Option<SectionHeader> {
        let header = match self.model.section_type(section)? {
            SectionKind::Categories => SectionHeader::Categories {
                title: "Bookmark lists".to_string(),
                show_all: self.model.are_all_categories_hidden(),
            },
            SectionKind::Actions => SectionHeader::Actions,
            SectionKind::Notifications => SectionHeader::Notifications,
        };
        Some(header)
    }

    pub fn header_height(&self, section: usize) -> u16 {
        match self.model.section_type(section) {
            Some(SectionKind::Categories) | Some(SectionKind::Notifications) => 48,
            Some(SectionKind::Actions) => 24,
            None => 0,
        }
    }

    fn section_kind(&self, section: usize) -> Result<SectionKind, CategoryError> {
        self.model
            .section_type(section)
            .ok_or(CategoryError::OutOfRange {
                index: section,
                count: self.model.number_of_sections(),
            })
    }

    // --- gestures ---

    /// Swipe-to-delete is offered on category rows while more than one exists.
    pub fn can_edit_row(&self, path: IndexPath) -> bool {
        self.model.section_type(path.section) == Some(SectionKind::Categories)
            && self.model.can_delete_categories()
    }

    pub fn commit_delete(&mut self, path: IndexPath) -> Result<(), CategoryError> {
        if self.model.section_type(path.section) != Some(SectionKind::Categories) {
            tracing::error!(?path, "delete committed outside the categories section");
            return Err(CategoryError::OutOfRange {
                index: path.section,
                count: self.model.number_of_sections(),
            });
        }
        let result = self.model.delete_category(path.row);
        self.flush();
        result
    }

    pub fn did_select_row(&mut self, path: IndexPath) -> Result<(), CategoryError> {
        match self.section_kind(path.section)? {
            SectionKind::Categories => {
                let category = self.model.category(path.row)?;
                self.navigator.open_category(&category.id);
            }
            SectionKind::Actions => match self.model.action(path.row)? {
                Action::Create => {
                    self.create_new_category()?;
                }
            },
            SectionKind::Notifications => {
                tracing::warn!(?path, "notifications prompt row is not selectable");
            }
        }
        Ok(())
    }

    /// Prompts until a valid name is entered or the user cancels.
    /// Returns the new row, if any.
    pub fn create_new_category(&mut self) -> Result<Option<usize>, CategoryError> {
        let min = self.model.min_category_name_length();
        let max = self.model.max_category_name_length();
        let mut rejected: Option<ValidationError> = None;
        loop {
            let name = match self.alerts.prompt_category_name(min, max, rejected.as_ref()) {
                Some(name) => name,
                None => return Ok(None),
            };
            match self.model.add_category(&name) {
                Ok(row) => {
                    self.flush();
                    self.view.set_show_all(self.model.are_all_categories_hidden());
                    return Ok(Some(row));
                }
                Err(CategoryError::Validation(reason)) => rejected = Some(reason),
                Err(e) => return Err(e),
            }
        }
    }

    /// Visibility checkbox of a category cell.
    pub fn toggle_visibility(&mut self, row: usize, visible: bool) -> Result<(), CategoryError> {
        self.model.set_category_visible(row, visible)?;
        self.view.set_show_all(self.model.are_all_categories_hidden());
        Ok(())
    }

    /// Header button: show everything when all are hidden, hide everything otherwise.
    pub fn header_visibility_action(&mut self) -> Result<(), CategoryError> {
        let show_all = self.model.are_all_categories_hidden();
        self.model.update_all_categories_visibility(show_all)?;
        self.view.set_show_all(self.model.are_all_categories_hidden());
        self.model.reload_data();
        self.flush();
        Ok(())
    }

    pub fn menu_for_row(&self, row: usize) -> Result<Vec<MenuItem>, CategoryError> {
        let category = self.model.category(row)?;
        Ok(vec![
            MenuItem::Edit,
            MenuItem::ShowHide {
                visible: category.visible,
            },
            MenuItem::Export,
            MenuItem::Delete {
                enabled: self.model.can_delete_categories(),
            },
            MenuItem::Cancel,
        ])
    }

    pub async fn choose_menu_item(&mut self, row: usize, item: MenuItem) -> Result<(), CategoryError> {
        match item {
            MenuItem::Edit => {
                let category = self.model.category(row)?;
                self.navigator.open_category_settings(&category.id);
            }
            MenuItem::ShowHide { visible } => {
                self.toggle_visibility(row, !visible)?;
                if let Some(section) = self.model.section_index(SectionKind::Categories) {
                    self.view.reload_row(IndexPath::new(section, row));
                }
            }
            MenuItem::Export => self.share_category(row).await,
            MenuItem::Delete { enabled } => {
                if enabled {
                    let result = self.model.delete_category(row);
                    self.flush();
                    result?;
                } else {
                    tracing::warn!(row, "disabled delete item chosen");
                }
            }
            MenuItem::Cancel => {}
        }
        Ok(())
    }

    async fn share_category(&mut self, row: usize) {
        let mut outcome = None;
        self.model
            .share_category_file(row, |result| outcome = Some(result))
            .await;
        match outcome {
            Some(ShareOutcome::Success(path)) => self.alerts.present_share(&path),
            Some(ShareOutcome::Error { title, message }) => self.alerts.present_info(&title, &message),
            None => tracing::error!(row, "share completed without an outcome"),
        }
    }

    /// Share sheet dismissed.
    pub async fn finish_share(&mut self) {
        self.model.finish_share_category().await;
    }

    /// Category settings or detail screen finished (edited or deleted the category).
    pub fn child_screen_finished(&mut self) {
        self.navigator.pop();
    }
}
