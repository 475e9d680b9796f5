//! RPC method handler for the bookmark lists JSON-RPC protocol.
//!
//! Kept apart from `rpc_server.rs` so it can be unit-tested independently.
//! Methods operating on the list require the screen to be open
//! (`screen.appear`); mutating methods return the view updates they produced.

use std::path::PathBuf;

use serde_json::{json, Value};

use crate::app::App;
use crate::managers::category_manager::{CategoryManager, CategoryStore};
use crate::presentation::list_model::{ListPresentationModel, ShareOutcome};
use crate::services::conversion;
use crate::services::settings_engine::SettingsEngineTrait;
use crate::types::errors::CategoryError;

fn param_str<'a>(params: &'a Value, key: &str) -> Result<&'a str, String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("missing {}", key))
}

fn param_usize(params: &Value, key: &str) -> Result<usize, String> {
    params
        .get(key)
        .and_then(|v| v.as_u64())
        .map(|v| v as usize)
        .ok_or_else(|| format!("missing {}", key))
}

fn param_bool(params: &Value, key: &str) -> Result<bool, String> {
    params
        .get(key)
        .and_then(|v| v.as_bool())
        .ok_or_else(|| format!("missing {}", key))
}

fn param_f64(params: &Value, key: &str) -> Result<f64, String> {
    params
        .get(key)
        .and_then(|v| v.as_f64())
        .ok_or_else(|| format!("missing {}", key))
}

fn open_screen(app: &mut App) -> Result<&mut ListPresentationModel<CategoryManager>, String> {
    app.screen_mut().ok_or_else(|| "screen not open".to_string())
}

/// Pending updates of the open screen, after consuming delivered notifications.
fn drain_updates(model: &mut ListPresentationModel<CategoryManager>) -> Value {
    model.process_store_events();
    json!(model.take_updates())
}

fn sections_json(model: &ListPresentationModel<CategoryManager>) -> Value {
    let sections: Vec<Value> = (0..model.number_of_sections())
        .filter_map(|index| model.section_type(index))
        .map(|kind| json!({"kind": kind, "rows": model.number_of_rows(kind)}))
        .collect();
    json!(sections)
}

fn categories_json(model: &ListPresentationModel<CategoryManager>) -> Result<Value, String> {
    let count = model.live_categories_count().map_err(|e| e.to_string())?;
    let mut items = Vec::with_capacity(count);
    for row in 0..count {
        let c = model.category(row).map_err(|e| e.to_string())?;
        items.push(json!({
            "row": row,
            "id": c.id,
            "name": c.name,
            "visible": c.visible,
            "bookmarks_count": c.bookmarks_count,
        }));
    }
    Ok(json!({
        "items": items,
        "can_delete": model.can_delete_categories(),
        "all_hidden": model.are_all_categories_hidden(),
    }))
}

/// Dispatch a JSON-RPC method call.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
pub async fn handle_method(app: &mut App, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        "ping" => Ok(json!({"pong": true})),

        // ─── Screen lifecycle ───
        "screen.appear" => {
            let model = app.open_screen();
            let updates = json!(model.take_updates());
            Ok(json!({"sections": sections_json(model), "updates": updates}))
        }
        "screen.disappear" => {
            let updates = app.close_screen();
            Ok(json!({"updates": updates}))
        }
        "updates.drain" => {
            let model = open_screen(app)?;
            Ok(json!({"updates": drain_updates(model)}))
        }

        // ─── Section/row model ───
        "sections.list" => {
            let model = open_screen(app)?;
            // Refuse to describe a layout the store cannot back
            model.live_categories_count().map_err(|e| e.to_string())?;
            Ok(sections_json(model))
        }
        "categories.list" => {
            let model = open_screen(app)?;
            categories_json(model)
        }

        // ─── Categories ───
        "category.check" => {
            let name = param_str(params, "name")?;
            let model = open_screen(app)?;
            match model.validate_category_name(name) {
                Ok(()) => Ok(json!({"valid": true})),
                Err(CategoryError::Validation(reason)) => {
                    Ok(json!({"valid": false, "reason": reason.to_string()}))
                }
                Err(e) => Err(e.to_string()),
            }
        }
        "category.add" => {
            let name = param_str(params, "name")?;
            let model = open_screen(app)?;
            let row = model.add_category(name).map_err(|e| e.to_string())?;
            Ok(json!({"row": row, "updates": drain_updates(model)}))
        }
        "category.rename" => {
            let row = param_usize(params, "row")?;
            let name = param_str(params, "name")?;
            let model = open_screen(app)?;
            model.rename_category(row, name).map_err(|e| e.to_string())?;
            Ok(json!({"updates": drain_updates(model)}))
        }
        "category.delete" => {
            let row = param_usize(params, "row")?;
            let model = open_screen(app)?;
            model.delete_category(row).map_err(|e| e.to_string())?;
            Ok(json!({"updates": drain_updates(model)}))
        }
        "category.set_visible" => {
            let row = param_usize(params, "row")?;
            let visible = param_bool(params, "visible")?;
            let model = open_screen(app)?;
            model.set_category_visible(row, visible).map_err(|e| e.to_string())?;
            Ok(json!({"all_hidden": model.are_all_categories_hidden()}))
        }
        "categories.set_all_visible" => {
            let show_all = param_bool(params, "show_all")?;
            let model = open_screen(app)?;
            model
                .update_all_categories_visibility(show_all)
                .map_err(|e| e.to_string())?;
            model.reload_data();
            Ok(json!({
                "all_hidden": model.are_all_categories_hidden(),
                "updates": drain_updates(model),
            }))
        }
        "category.export" => {
            let row = param_usize(params, "row")?;
            let model = open_screen(app)?;
            let mut outcome = None;
            model
                .share_category_file(row, |result| outcome = Some(result))
                .await;
            match outcome {
                Some(ShareOutcome::Success(path)) => Ok(json!({"path": path.to_string_lossy()})),
                Some(ShareOutcome::Error { title, message }) => Err(format!("{}: {}", title, message)),
                None => Err("export produced no result".to_string()),
            }
        }
        "category.export_finished" => {
            let model = open_screen(app)?;
            model.finish_share_category().await;
            Ok(json!({"ok": true}))
        }

        // ─── Bookmarks ───
        "bookmark.add" => {
            let row = param_usize(params, "row")?;
            let name = param_str(params, "name")?;
            let latitude = param_f64(params, "lat")?;
            let longitude = param_f64(params, "lon")?;
            if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
                return Err("invalid coordinates".to_string());
            }
            let model = open_screen(app)?;
            let category = model.category(row).map_err(|e| e.to_string())?;
            let id = model
                .store()
                .borrow_mut()
                .add_bookmark(&category.id, name, latitude, longitude)
                .map_err(|e| e.to_string())?;
            Ok(json!({"id": id}))
        }

        // ─── Notifications prompt ───
        "notifications.dismiss" => {
            open_screen(app)?;
            app.settings_engine
                .set_value("notifications_prompt_dismissed", json!(true))
                .map_err(|e| e.to_string())?;
            let model = open_screen(app)?;
            model.dismiss_notifications_prompt();
            Ok(json!({"updates": drain_updates(model)}))
        }

        // ─── Legacy conversion ───
        "legacy.convert" => {
            let dir = PathBuf::from(param_str(params, "dir")?);
            let converted = {
                let mut store = app.store.borrow_mut();
                conversion::convert_legacy_files(&mut *store, &dir)
            };
            let updates = match app.screen_mut() {
                Some(model) => drain_updates(model),
                None => json!([]),
            };
            match converted {
                Ok(count) => Ok(json!({"converted": count, "updates": updates})),
                Err(e) => Err(e.to_string()),
            }
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}
