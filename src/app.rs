//! App Core.
//!
//! Owns the database, the shared category store and the settings, and
//! manages the lifetime of the lists screen model.

use std::cell::RefCell;
use std::rc::Rc;

use crate::database::connection::Database;
use crate::managers::category_manager::CategoryManager;
use crate::presentation::list_model::{ListPresentationModel, ModelConfig, SharedStore};
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::types::section::ViewUpdate;

/// Central application struct.
pub struct App {
    pub db: Rc<Database>,
    pub store: SharedStore<CategoryManager>,
    pub settings_engine: SettingsEngine,
    screen: Option<ListPresentationModel<CategoryManager>>,
}

impl App {
    /// Opens the database at `db_path` and loads settings from `settings_path`
    /// (platform config dir when `None`).
    pub fn new(db_path: &str, settings_path: Option<String>) -> Result<Self, Box<dyn std::error::Error>> {
        let mut settings_engine = SettingsEngine::new(settings_path);
        let settings = settings_engine.load()?;

        let db = Rc::new(Database::open(db_path)?);
        let store = CategoryManager::open(db.clone(), &settings.naming.default_category_name)?;

        Ok(Self {
            db,
            store: Rc::new(RefCell::new(store)),
            settings_engine,
            screen: None,
        })
    }

    pub fn model_config(&self) -> ModelConfig {
        ModelConfig::from_settings(self.settings_engine.get_settings(), self.settings_engine.export_dir())
    }

    /// Shows the lists screen: a fresh model, full reload, foreground observation.
    pub fn open_screen(&mut self) -> &mut ListPresentationModel<CategoryManager> {
        // The previous model must release the store before the new one mutes it.
        // The reload below supersedes whatever it produced on the way out.
        let discarded = self.close_screen();
        if !discarded.is_empty() {
            tracing::debug!(count = discarded.len(), "discarded updates of the replaced screen");
        }
        let mut model = ListPresentationModel::new(self.store.clone(), self.model_config());
        model.reload_data();
        model.enter_foreground();
        tracing::debug!("lists screen opened");
        self.screen.insert(model)
    }

    /// Hides the lists screen and returns the updates it produced on the way out.
    pub fn close_screen(&mut self) -> Vec<ViewUpdate> {
        match self.screen.take() {
            Some(mut model) => {
                model.leave_foreground();
                tracing::debug!("lists screen closed");
                model.take_updates()
            }
            None => Vec::new(),
        }
    }

    pub fn screen(&self) -> Option<&ListPresentationModel<CategoryManager>> {
        self.screen.as_ref()
    }

    pub fn screen_mut(&mut self) -> Option<&mut ListPresentationModel<CategoryManager>> {
        self.screen.as_mut()
    }

    /// Closes the open screen before shutdown and hands back its final updates.
    pub fn shutdown(&mut self) -> Vec<ViewUpdate> {
        self.close_screen()
    }
}
