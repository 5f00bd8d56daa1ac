//! SQLite persistence for tracked items
//!
//! Uses parameterized queries exclusively (no SQL string concatenation).
//! Best-by instants are stored as Unix epoch seconds.

use crate::error::{FoodrecError, Result};
use crate::models::Item;
use chrono::{DateTime, Local};
use rusqlite::{params, Connection, Row};
use std::path::Path;

/// Handle to the item table
///
/// Opened once at startup and passed to every command.
#[derive(Debug)]
pub struct ItemStore {
    conn: Connection,
}

impl ItemStore {
    /// Opens (or creates) the database file and ensures the schema exists.
    ///
    /// Missing parent directories are created.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| FoodrecError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
                log::info!("Created directory: {}", parent.display());
            }
        }

        let conn = Connection::open(path).map_err(|source| FoodrecError::StorageOpen {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Opened database: {}", path.display());

        let store = Self { conn };
        store.ensure_schema()?;
        Ok(store)
    }

    /// Opens a fresh in-memory database with the schema in place
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| FoodrecError::StorageOpen {
            path: ":memory:".into(),
            source,
        })?;
        let store = Self { conn };
        store.ensure_schema()?;
        Ok(store)
    }

    /// Creates the `items` table if it does not already exist.
    pub fn ensure_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "
                CREATE TABLE IF NOT EXISTS items (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    best_by INTEGER NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_items_best_by ON items(best_by);
                ",
            )
            .map_err(FoodrecError::Schema)?;

        log::debug!("Database schema initialized");
        Ok(())
    }

    /// Appends a new item and returns its id
    pub fn insert(&self, name: &str, best_by: &DateTime<Local>) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO items (name, best_by) VALUES (?1, ?2)",
                params![name, best_by.timestamp()],
            )
            .map_err(FoodrecError::StorageWrite)?;

        let id = self.conn.last_insert_rowid();
        log::info!("Inserted item {} ({}) with id {}", name, best_by, id);
        if log::log_enabled!(log::Level::Debug) {
            log::debug!("Store now holds {} items", self.count()?);
        }
        Ok(id)
    }

    /// All items, soonest best-by first
    pub fn list_all(&self) -> Result<Vec<Item>> {
        self.query_items(
            "SELECT id, name, best_by FROM items ORDER BY best_by ASC, id ASC",
            None,
        )
    }

    /// Items whose best-by is at or before `threshold`, soonest first
    pub fn list_expiring_by(&self, threshold: &DateTime<Local>) -> Result<Vec<Item>> {
        self.query_items(
            "SELECT id, name, best_by FROM items
             WHERE best_by <= ?1
             ORDER BY best_by ASC, id ASC",
            Some(threshold.timestamp()),
        )
    }

    /// Total number of stored items
    pub fn count(&self) -> Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))
            .map_err(FoodrecError::StorageRead)
    }

    fn query_items(&self, sql: &str, threshold: Option<i64>) -> Result<Vec<Item>> {
        let mut stmt = self.conn.prepare(sql).map_err(FoodrecError::StorageRead)?;
        let rows = match threshold {
            Some(limit) => stmt.query_map(params![limit], item_from_row),
            None => stmt.query_map([], item_from_row),
        }
        .map_err(FoodrecError::StorageRead)?;

        let items = rows
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(FoodrecError::StorageRead)?;
        log::debug!("Query returned {} items", items.len());
        Ok(items)
    }
}

fn item_from_row(row: &Row<'_>) -> rusqlite::Result<Item> {
    let epoch: i64 = row.get(2)?;
    let best_by = DateTime::from_timestamp(epoch, 0)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(2, epoch))?
        .with_timezone(&Local);

    Ok(Item {
        id: row.get(0)?,
        name: row.get(1)?,
        best_by,
    })
}
