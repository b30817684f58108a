//! `SQLite` entity store backend.
//!
//! One store per directory: a single `store.sqlite` file holding an
//! `entities` table. Bulk loads run inside one long-lived transaction so
//! commit/release semantics map directly onto the database transaction.

use crate::models::{Entity, EntityId, EntityKind};
use crate::storage::traits::StoreBackend;
use crate::{Error, Result};
use rusqlite::{Connection, OpenFlags, params};
use std::path::{Path, PathBuf};

/// Store database file name under the store root.
const STORE_FILE: &str = "store.sqlite";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS entities (
    id       TEXT PRIMARY KEY,
    kind     TEXT NOT NULL,
    stamp_ms INTEGER NOT NULL,
    payload  TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_entities_stamp ON entities (stamp_ms);
";

/// SQLite-backed entity store.
///
/// Obtained through [`open`](Self::open) for bulk loading or
/// [`attach`](Self::attach) for reading. The open path takes an
/// exclusive lock on the database, so at most one writable instance can
/// exist per root.
pub struct SqliteStore {
    conn: Connection,
    root: PathBuf,
    in_txn: bool,
}

impl SqliteStore {
    /// Opens a writable store rooted at `root`, creating the directory
    /// and database if absent, and begins the bulk-load transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the root cannot be created or the database
    /// cannot be opened, locked, or initialized.
    pub fn open(root: &Path) -> Result<Self> {
        std::fs::create_dir_all(root).map_err(|e| Error::operation("create_store_root", e))?;

        let conn = Connection::open(root.join(STORE_FILE))
            .map_err(|e| Error::operation("open_store", e))?;

        // Note: pragma_update returns the result which we ignore - locking_mode
        // returns the new mode as a row.
        let _ = conn.pragma_update(None, "locking_mode", "EXCLUSIVE");
        let _ = conn.pragma_update(None, "synchronous", "NORMAL");

        conn.execute_batch(SCHEMA)
            .map_err(|e| Error::operation("init_store_schema", e))?;
        conn.execute_batch("BEGIN IMMEDIATE")
            .map_err(|e| Error::operation("begin_bulk_load", e))?;

        Ok(Self {
            conn,
            root: root.to_path_buf(),
            in_txn: true,
        })
    }

    /// Attaches a read view of an existing store.
    ///
    /// # Errors
    ///
    /// Returns an error if no store exists at `root` or the database
    /// cannot be opened.
    pub fn attach(root: &Path) -> Result<Self> {
        let db_path = root.join(STORE_FILE);
        if !db_path.is_file() {
            return Err(Error::operation(
                "attach_store",
                format!("no store at {}", db_path.display()),
            ));
        }

        let conn = Connection::open_with_flags(&db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|e| Error::operation("attach_store", e))?;

        Ok(Self {
            conn,
            root: root.to_path_buf(),
            in_txn: false,
        })
    }

    /// Returns the store root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Streams entities in insertion order, optionally restricted to
    /// half-open `[from_ms, to_ms)` bounds over version stamps.
    ///
    /// # Errors
    ///
    /// Returns an error on query failure, on a corrupt row, or when the
    /// callback fails.
    pub fn scan(
        &self,
        bounds: Option<(i64, i64)>,
        f: &mut dyn FnMut(Entity) -> Result<()>,
    ) -> Result<()> {
        let (sql, bounds) = match bounds {
            Some((from_ms, to_ms)) => (
                "SELECT id, kind, stamp_ms, payload FROM entities
                 WHERE stamp_ms >= ?1 AND stamp_ms < ?2 ORDER BY rowid",
                vec![from_ms, to_ms],
            ),
            None => (
                "SELECT id, kind, stamp_ms, payload FROM entities ORDER BY rowid",
                vec![],
            ),
        };

        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| Error::operation("scan_store", e))?;
        let mut rows = stmt
            .query(rusqlite::params_from_iter(bounds))
            .map_err(|e| Error::operation("scan_store", e))?;

        while let Some(row) = rows.next().map_err(|e| Error::operation("scan_store", e))? {
            f(row_to_entity(row)?)?;
        }
        Ok(())
    }

    /// Returns the number of entities currently visible in the store.
    ///
    /// # Errors
    ///
    /// Returns an error on query failure.
    pub fn len(&self) -> Result<u64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM entities", [], |row| {
                row.get::<_, i64>(0).map(|n| n as u64)
            })
            .map_err(|e| Error::operation("count_store", e))
    }

    /// Returns whether the store is empty.
    ///
    /// # Errors
    ///
    /// Returns an error on query failure.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

fn row_to_entity(row: &rusqlite::Row<'_>) -> Result<Entity> {
    let id: String = row.get(0).map_err(|e| Error::operation("read_row", e))?;
    let kind: String = row.get(1).map_err(|e| Error::operation("read_row", e))?;
    let stamp_ms: i64 = row.get(2).map_err(|e| Error::operation("read_row", e))?;
    let payload: String = row.get(3).map_err(|e| Error::operation("read_row", e))?;

    let id = EntityId::parse(&id)
        .map_err(|e| Error::operation("read_row", format!("corrupt id '{id}': {e}")))?;
    let kind = EntityKind::parse(&kind)
        .ok_or_else(|| Error::operation("read_row", format!("corrupt kind '{kind}'")))?;
    let payload = serde_json::from_str(&payload)
        .map_err(|e| Error::operation("read_row", format!("corrupt payload: {e}")))?;

    Ok(Entity::new(id, kind, stamp_ms, payload))
}

impl StoreBackend for SqliteStore {
    fn write(&mut self, entity: &Entity) -> Result<()> {
        let payload = serde_json::to_string(&entity.payload)
            .map_err(|e| Error::operation("encode_payload", e))?;
        self.conn
            .execute(
                "INSERT INTO entities (id, kind, stamp_ms, payload) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET
                     kind = excluded.kind,
                     stamp_ms = excluded.stamp_ms,
                     payload = excluded.payload",
                params![entity.id.to_string(), entity.kind.as_str(), entity.stamp_ms, payload],
            )
            .map_err(|e| Error::operation("write_entity", e))?;
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        if self.in_txn {
            self.conn
                .execute_batch("COMMIT")
                .map_err(|e| Error::operation("commit_store", e))?;
            self.in_txn = false;
        }
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<()> {
        let Self { conn, in_txn, .. } = *self;
        if in_txn {
            conn.execute_batch("ROLLBACK")
                .map_err(|e| Error::operation("rollback_store", e))?;
        }
        conn.close()
            .map_err(|(_, e)| Error::operation("close_store", e))
    }
}
