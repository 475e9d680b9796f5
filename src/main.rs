//! Bookmark lists console demo.
//!
//! Drives the lists screen through a scripted session with a console list
//! view, printing every delta the presentation model emits.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use bookmark_lists::database::Database;
use bookmark_lists::managers::category_manager::{CategoryManager, CategoryStore};
use bookmark_lists::presentation::screen::{AlertPresenter, CategoriesScreen, ListView, MenuItem, Navigator};
use bookmark_lists::presentation::{ListPresentationModel, ModelConfig};
use bookmark_lists::types::errors::ValidationError;
use bookmark_lists::types::section::{IndexPath, SectionKind, ViewUpdate};
use bookmark_lists::types::settings::ListSettings;
use tracing_subscriber::EnvFilter;

struct ConsoleView;

impl ListView for ConsoleView {
    fn apply(&mut self, update: &ViewUpdate) {
        println!("  view <- {:?}", update);
    }

    fn reload_row(&mut self, path: IndexPath) {
        println!("  view <- reload row {:?}", path);
    }

    fn set_show_all(&mut self, show_all: bool) {
        println!("  header toggle: {}", if show_all { "Show all" } else { "Hide all" });
    }
}

struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn open_category(&mut self, category_id: &str) {
        println!("  navigate -> category {}", category_id);
    }

    fn open_category_settings(&mut self, category_id: &str) {
        println!("  navigate -> settings of {}", category_id);
    }

    fn pop(&mut self) {
        println!("  navigate <- back");
    }
}

/// Answers name prompts from a script.
struct ScriptedAlerts {
    names: Vec<String>,
}

impl AlertPresenter for ScriptedAlerts {
    fn prompt_category_name(
        &mut self,
        min: usize,
        max: usize,
        rejected: Option<&ValidationError>,
    ) -> Option<String> {
        if let Some(reason) = rejected {
            println!("  prompt rejected: {}", reason);
        }
        let name = if self.names.is_empty() { None } else { Some(self.names.remove(0)) };
        println!("  prompt ({}..={} chars) -> {:?}", min, max, name);
        name
    }

    fn present_info(&mut self, title: &str, message: &str) {
        println!("  alert: {}: {}", title, message);
    }

    fn present_conversion_error(&mut self) {
        println!("  alert: bookmark conversion failed");
    }

    fn present_share(&mut self, path: &Path) {
        println!("  share sheet: {}", path.display());
    }
}

fn section(name: &str) {
    println!("───────────────────────────────────────────────────────────────");
    println!("  {}", name);
    println!("───────────────────────────────────────────────────────────────");
}

fn print_rows<S, V, N, A>(screen: &CategoriesScreen<S, V, N, A>)
where
    S: CategoryStore,
    V: ListView,
    N: Navigator,
    A: AlertPresenter,
{
    for s in 0..screen.number_of_sections() {
        println!("  [{}] {:?}", s, screen.header(s));
        for r in 0..screen.number_of_rows(s) {
            match screen.cell(IndexPath::new(s, r)) {
                Ok(cell) => println!("      {:?}", cell),
                Err(e) => println!("      error: {}", e),
            }
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    println!("Bookmark lists v{} demo", env!("CARGO_PKG_VERSION"));

    let settings = ListSettings::default();
    let export_dir = std::env::temp_dir().join("bookmark-lists-demo");
    let db = Rc::new(Database::open_in_memory()?);
    let store = Rc::new(RefCell::new(CategoryManager::open(
        db,
        &settings.naming.default_category_name,
    )?));
    {
        let mut s = store.borrow_mut();
        let first = s.category_at(0)?.id;
        s.add_bookmark(&first, "Home", 52.52, 13.405)?;
        s.add_bookmark(&first, "Office", 52.50, 13.39)?;
    }

    let model = ListPresentationModel::new(store.clone(), ModelConfig::from_settings(&settings, export_dir));
    let alerts = ScriptedAlerts {
        names: vec!["".to_string(), "My Places".to_string(), "Trips".to_string()],
    };
    let mut screen = CategoriesScreen::new(model, ConsoleView, ConsoleNavigator, alerts);

    section("Appear");
    screen.will_appear();
    screen.did_appear();
    print_rows(&screen);

    section("Create a list");
    let actions = screen
        .model()
        .section_index(SectionKind::Actions)
        .unwrap_or_default();
    screen.did_select_row(IndexPath::new(actions, 0))?;
    print_rows(&screen);

    section("Hide everything, then export");
    screen.header_visibility_action()?;
    screen.choose_menu_item(0, MenuItem::Export).await?;
    screen.finish_share().await;

    section("Delete down to one list");
    println!("  menu: {:?}", screen.menu_for_row(1)?);
    screen.commit_delete(IndexPath::new(0, 1))?;
    println!("  menu: {:?}", screen.menu_for_row(0)?);
    if let Err(e) = screen.commit_delete(IndexPath::new(0, 0)) {
        println!("  rejected: {}", e);
    }

    section("Background edits, then disappear");
    store.borrow_mut().create_category("Added elsewhere")?;
    screen.did_disappear();
    print_rows(&screen);

    Ok(())
}
