use crate::model::{Item, ItemId, List, ListId};
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, Row, Transaction, params};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

const SCHEMA: &str = "
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS lists (
    id INTEGER PRIMARY KEY AUTOINCREMENT
);

CREATE TABLE IF NOT EXISTS items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    list_id INTEGER NOT NULL REFERENCES lists(id) ON DELETE CASCADE,
    text TEXT NOT NULL DEFAULT '',
    position INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_items_list ON items(list_id, position);
";

/// SQLite-backed repository for lists and their items.
///
/// Wraps a single connection behind a mutex; handles are cheap to clone and
/// safe to move onto the blocking pool. Every call is an explicit SQL
/// statement, and every mutating call that touches more than one row runs in
/// a transaction.
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    pub lists: u64,
    pub items: u64,
}

impl Store {
    pub fn open<P: AsRef<Path>>(path: P) -> rusqlite::Result<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> rusqlite::Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> rusqlite::Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Creates an empty list.
    pub fn create_list(&self) -> rusqlite::Result<List> {
        let conn = self.conn.lock();
        conn.execute("INSERT INTO lists DEFAULT VALUES", [])?;
        let id = ListId(conn.last_insert_rowid());
        debug!(list_id = %id, "created list");
        Ok(List { id })
    }

    /// Creates a list together with its first item in one transaction.
    pub fn create_list_with_first_item(&self, text: &str) -> rusqlite::Result<(List, Item)> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        tx.execute("INSERT INTO lists DEFAULT VALUES", [])?;
        let list_id = ListId(tx.last_insert_rowid());
        let item = insert_item_tx(&tx, list_id, text)?;
        tx.commit()?;
        debug!(list_id = %list_id, item_id = %item.id, "created list with first item");
        Ok((List { id: list_id }, item))
    }

    /// Appends an item to an existing list.
    ///
    /// Returns `None` when the list does not exist; the existence check and
    /// the insert share a transaction so the position sequence stays gapless
    /// under concurrent writers.
    pub fn insert_item(&self, list_id: ListId, text: &str) -> rusqlite::Result<Option<Item>> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let exists: Option<i64> = tx
            .query_row(
                "SELECT id FROM lists WHERE id = ?1",
                params![list_id.as_i64()],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_none() {
            return Ok(None);
        }
        let item = insert_item_tx(&tx, list_id, text)?;
        tx.commit()?;
        debug!(list_id = %list_id, item_id = %item.id, position = item.position, "inserted item");
        Ok(Some(item))
    }

    pub fn get_list(&self, list_id: ListId) -> rusqlite::Result<Option<List>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id FROM lists WHERE id = ?1",
            params![list_id.as_i64()],
            |row| Ok(List { id: ListId(row.get(0)?) }),
        )
        .optional()
    }

    /// All items of a list in display order.
    pub fn items_for_list(&self, list_id: ListId) -> rusqlite::Result<Vec<Item>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, list_id, text, position, created_at FROM items \
             WHERE list_id = ?1 ORDER BY position, id",
        )?;
        let rows = stmt.query_map(params![list_id.as_i64()], row_to_item)?;
        rows.collect()
    }

    pub fn count_lists(&self) -> rusqlite::Result<u64> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM lists", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    pub fn count_items(&self) -> rusqlite::Result<u64> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    pub fn stats(&self) -> rusqlite::Result<StoreStats> {
        Ok(StoreStats {
            lists: self.count_lists()?,
            items: self.count_items()?,
        })
    }

    pub fn first_list(&self) -> rusqlite::Result<Option<List>> {
        let conn = self.conn.lock();
        conn.query_row("SELECT id FROM lists ORDER BY id LIMIT 1", [], |row| {
            Ok(List { id: ListId(row.get(0)?) })
        })
        .optional()
    }

    pub fn first_item(&self) -> rusqlite::Result<Option<Item>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, list_id, text, position, created_at FROM items ORDER BY id LIMIT 1",
            [],
            row_to_item,
        )
        .optional()
    }

    /// Deletes a list; items follow through the cascade.
    ///
    /// Returns whether a list was actually removed.
    pub fn delete_list(&self, list_id: ListId) -> rusqlite::Result<bool> {
        let conn = self.conn.lock();
        let changed =
            conn.execute("DELETE FROM lists WHERE id = ?1", params![list_id.as_i64()])?;
        debug!(list_id = %list_id, deleted = changed > 0, "deleted list");
        Ok(changed > 0)
    }

    /// Cheap connectivity probe used by the readiness check.
    pub fn ping(&self) -> rusqlite::Result<()> {
        let conn = self.conn.lock();
        conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
    }
}

fn insert_item_tx(tx: &Transaction<'_>, list_id: ListId, text: &str) -> rusqlite::Result<Item> {
    let position: i64 = tx.query_row(
        "SELECT COALESCE(MAX(position) + 1, 0) FROM items WHERE list_id = ?1",
        params![list_id.as_i64()],
        |row| row.get(0),
    )?;
    let created_at = Utc::now();
    tx.execute(
        "INSERT INTO items (list_id, text, position, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![list_id.as_i64(), text, position, created_at],
    )?;
    Ok(Item {
        id: ItemId(tx.last_insert_rowid()),
        list_id,
        text: text.to_string(),
        position,
        created_at,
    })
}

fn row_to_item(row: &Row<'_>) -> rusqlite::Result<Item> {
    Ok(Item {
        id: ItemId(row.get(0)?),
        list_id: ListId(row.get(1)?),
        text: row.get(2)?,
        position: row.get(3)?,
        created_at: row.get(4)?,
    })
}
