//! Category Manager.
//!
//! Implements `CategoryStore`: CRUD for bookmark categories and the
//! bookmarks inside them, visibility flags and change notifications,
//! backed by SQLite via `rusqlite`.

use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

use crate::database::connection::Database;
use crate::managers::notifier::{Notifier, Subscription, SubscriptionId};
use crate::types::category::{Bookmark, Category, CategorySnapshot, ExportedBookmark, StoreEvent};
use crate::types::errors::CategoryError;

/// Contract of the bookmark store consumed by the presentation layer.
///
/// Categories are addressed either by dense index (display order) or by id.
pub trait CategoryStore {
    fn categories_count(&self) -> Result<usize, CategoryError>;
    fn category_at(&self, index: usize) -> Result<Category, CategoryError>;
    fn category_by_id(&self, id: &str) -> Result<Category, CategoryError>;
    fn list_categories(&self) -> Result<Vec<Category>, CategoryError>;
    fn has_category_named(&self, name: &str) -> Result<bool, CategoryError>;
    /// Appends a category at the end. Returns the generated ID.
    fn create_category(&mut self, name: &str) -> Result<String, CategoryError>;
    fn rename_category(&mut self, id: &str, name: &str) -> Result<(), CategoryError>;
    fn delete_category(&mut self, id: &str) -> Result<(), CategoryError>;
    fn set_category_visible(&mut self, id: &str, visible: bool) -> Result<(), CategoryError>;
    fn set_all_visible(&mut self, visible: bool) -> Result<(), CategoryError>;
    fn add_bookmark(
        &mut self,
        category_id: &str,
        name: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<String, CategoryError>;
    fn list_bookmarks(&self, category_id: &str) -> Result<Vec<Bookmark>, CategoryError>;
    fn export_snapshot(&self, id: &str) -> Result<CategorySnapshot, CategoryError>;
    fn set_notifications_enabled(&mut self, enabled: bool);
    fn notifications_enabled(&self) -> bool;
    fn subscribe(&mut self) -> Subscription;
    fn unsubscribe(&mut self, id: SubscriptionId);
    fn notify_conversion_finished(&mut self, success: bool);
}

const CATEGORY_COLUMNS: &str = "c.id, c.name, c.visible, c.position, \
     (SELECT COUNT(*) FROM category_bookmarks b WHERE b.category_id = c.id)";

/// Category store backed by a shared SQLite database.
pub struct CategoryManager {
    db: Rc<Database>,
    notifier: Notifier,
}

impl CategoryManager {
    /// Opens the store, creating `default_name` when no category exists yet.
    pub fn open(db: Rc<Database>, default_name: &str) -> Result<Self, CategoryError> {
        let mut mgr = Self {
            db,
            notifier: Notifier::new(),
        };
        if mgr.categories_count()? == 0 {
            let id = mgr.insert_category(default_name)?;
            tracing::info!(%id, name = default_name, "created default category");
        }
        Ok(mgr)
    }

    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }

    fn next_position(&self) -> Result<i32, CategoryError> {
        let pos: i32 = self.db.connection().query_row(
            "SELECT COALESCE(MAX(position), -1) + 1 FROM categories",
            [],
            |row| row.get(0),
        )?;
        Ok(pos)
    }

    /// Dense display index of the category with the given ID.
    fn index_of(&self, id: &str) -> Result<usize, CategoryError> {
        let position: Option<i32> = self
            .db
            .connection()
            .query_row(
                "SELECT position FROM categories WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        let position = position.ok_or_else(|| CategoryError::NotFound(id.to_string()))?;
        let index: i64 = self.db.connection().query_row(
            "SELECT COUNT(*) FROM categories WHERE position < ?1",
            params![position],
            |row| row.get(0),
        )?;
        Ok(index as usize)
    }

    fn insert_category(&mut self, name: &str) -> Result<String, CategoryError> {
        let id = Uuid::new_v4().to_string();
        let now = Self::now();
        let position = self.next_position()?;
        self.db.connection().execute(
            "INSERT INTO categories (id, name, visible, position, created_at, updated_at) \
             VALUES (?1, ?2, 1, ?3, ?4, ?5)",
            params![id, name, position, now, now],
        )?;
        Ok(id)
    }

    fn row_to_category(row: &rusqlite::Row) -> rusqlite::Result<Category> {
        let count: i64 = row.get(4)?;
        Ok(Category {
            id: row.get(0)?,
            name: row.get(1)?,
            visible: row.get(2)?,
            position: row.get(3)?,
            bookmarks_count: count as usize,
        })
    }

    fn row_to_bookmark(row: &rusqlite::Row) -> rusqlite::Result<Bookmark> {
        Ok(Bookmark {
            id: row.get(0)?,
            category_id: row.get(1)?,
            name: row.get(2)?,
            latitude: row.get(3)?,
            longitude: row.get(4)?,
            created_at: row.get(5)?,
        })
    }
}

impl CategoryStore for CategoryManager {
    fn categories_count(&self) -> Result<usize, CategoryError> {
        let count: i64 = self
            .db
            .connection()
            .query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn category_at(&self, index: usize) -> Result<Category, CategoryError> {
        let sql = format!(
            "SELECT {} FROM categories c ORDER BY c.position LIMIT 1 OFFSET ?1",
            CATEGORY_COLUMNS
        );
        let found = self
            .db
            .connection()
            .query_row(&sql, params![index as i64], Self::row_to_category)
            .optional()?;
        match found {
            Some(category) => Ok(category),
            None => Err(CategoryError::OutOfRange {
                index,
                count: self.categories_count()?,
            }),
        }
    }

    fn category_by_id(&self, id: &str) -> Result<Category, CategoryError> {
        let sql = format!("SELECT {} FROM categories c WHERE c.id = ?1", CATEGORY_COLUMNS);
        self.db
            .connection()
            .query_row(&sql, params![id], Self::row_to_category)
            .optional()?
            .ok_or_else(|| CategoryError::NotFound(id.to_string()))
    }

    fn list_categories(&self) -> Result<Vec<Category>, CategoryError> {
        let sql = format!("SELECT {} FROM categories c ORDER BY c.position", CATEGORY_COLUMNS);
        let conn = self.db.connection();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], Self::row_to_category)?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    fn has_category_named(&self, name: &str) -> Result<bool, CategoryError> {
        let count: i64 = self.db.connection().query_row(
            "SELECT COUNT(*) FROM categories WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn create_category(&mut self, name: &str) -> Result<String, CategoryError> {
        let id = self.insert_category(name)?;
        let index = self.categories_count()?.saturating_sub(1);
        tracing::debug!(%id, index, "category created");
        self.notifier.emit(StoreEvent::CategoryAdded(index));
        Ok(id)
    }

    fn rename_category(&mut self, id: &str, name: &str) -> Result<(), CategoryError> {
        let affected = self.db.connection().execute(
            "UPDATE categories SET name = ?1, updated_at = ?2 WHERE id = ?3",
            params![name, Self::now(), id],
        )?;
        if affected == 0 {
            return Err(CategoryError::NotFound(id.to_string()));
        }
        let index = self.index_of(id)?;
        self.notifier.emit(StoreEvent::CategoryUpdated(index));
        Ok(())
    }

    /// Deletes a category and, through the cascade, every bookmark in it.
    ///
    /// The last remaining category cannot be deleted.
    fn delete_category(&mut self, id: &str) -> Result<(), CategoryError> {
        let index = self.index_of(id)?;
        if self.categories_count()? <= 1 {
            return Err(CategoryError::LastCategory);
        }
        self.db
            .connection()
            .execute("DELETE FROM categories WHERE id = ?1", params![id])?;
        tracing::debug!(%id, index, "category deleted");
        self.notifier.emit(StoreEvent::CategoryRemoved(index));
        Ok(())
    }

    fn set_category_visible(&mut self, id: &str, visible: bool) -> Result<(), CategoryError> {
        let affected = self.db.connection().execute(
            "UPDATE categories SET visible = ?1, updated_at = ?2 WHERE id = ?3",
            params![visible, Self::now(), id],
        )?;
        if affected == 0 {
            return Err(CategoryError::NotFound(id.to_string()));
        }
        self.notifier.emit(StoreEvent::VisibilityChanged);
        Ok(())
    }

    fn set_all_visible(&mut self, visible: bool) -> Result<(), CategoryError> {
        self.db.connection().execute(
            "UPDATE categories SET visible = ?1, updated_at = ?2",
            params![visible, Self::now()],
        )?;
        self.notifier.emit(StoreEvent::VisibilityChanged);
        Ok(())
    }

    fn add_bookmark(
        &mut self,
        category_id: &str,
        name: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<String, CategoryError> {
        let index = self.index_of(category_id)?;
        let id = Uuid::new_v4().to_string();
        self.db.connection().execute(
            "INSERT INTO category_bookmarks (id, category_id, name, latitude, longitude, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![id, category_id, name, latitude, longitude, Self::now()],
        )?;
        self.notifier.emit(StoreEvent::CategoryUpdated(index));
        Ok(id)
    }

    fn list_bookmarks(&self, category_id: &str) -> Result<Vec<Bookmark>, CategoryError> {
        let conn = self.db.connection();
        let mut stmt = conn.prepare(
            "SELECT id, category_id, name, latitude, longitude, created_at \
             FROM category_bookmarks WHERE category_id = ?1 ORDER BY created_at, rowid",
        )?;
        let rows = stmt.query_map(params![category_id], Self::row_to_bookmark)?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    fn export_snapshot(&self, id: &str) -> Result<CategorySnapshot, CategoryError> {
        let category = self.category_by_id(id)?;
        let bookmarks = self
            .list_bookmarks(id)?
            .into_iter()
            .map(|b| ExportedBookmark {
                name: b.name,
                latitude: b.latitude,
                longitude: b.longitude,
            })
            .collect();
        Ok(CategorySnapshot {
            name: category.name,
            visible: category.visible,
            bookmarks,
        })
    }

    fn set_notifications_enabled(&mut self, enabled: bool) {
        self.notifier.set_enabled(enabled);
    }

    fn notifications_enabled(&self) -> bool {
        self.notifier.is_enabled()
    }

    fn subscribe(&mut self) -> Subscription {
        self.notifier.subscribe()
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.notifier.unsubscribe(id);
    }

    fn notify_conversion_finished(&mut self, success: bool) {
        self.notifier.report(StoreEvent::ConversionFinished(success));
    }
}
