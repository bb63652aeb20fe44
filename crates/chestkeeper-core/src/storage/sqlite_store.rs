//! SqliteRecordStore: SQLite WAL persistent storage for inventory records
//!
//! - WAL mode: loads from the coordination path never wait on background saves
//! - One row per identity: a save replaces the previous record
//! - Display names live in their own table and survive record deletion

use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::path::Path;

use super::RecordStore;
use crate::{CoreError, Identity, Result, Slot};

/// Record store backed by a single SQLite connection
pub struct SqliteRecordStore {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for SqliteRecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteRecordStore").finish_non_exhaustive()
    }
}

impl SqliteRecordStore {
    /// Open (or create) the database in WAL mode.
    ///
    /// ```no_run
    /// use chestkeeper_core::SqliteRecordStore;
    /// let store = SqliteRecordStore::open("data/chests.db").unwrap();
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = 5000;",
        )?;

        tracing::debug!("Opened record store at {}", path.display());
        Self::with_connection(conn)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    /// Idempotent schema migration
    fn migrate(&self) -> Result<()> {
        self.conn.lock().execute_batch(
            "
            CREATE TABLE IF NOT EXISTS records (
                identity      TEXT PRIMARY KEY,
                slots_json    TEXT NOT NULL,
                updated_at_ms INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS players (
                identity      TEXT PRIMARY KEY,
                display_name  TEXT NOT NULL,
                seen_at_ms    INTEGER NOT NULL,
                sighting      INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_players_name
                ON players(display_name, sighting DESC);
            ",
        )?;
        Ok(())
    }

    /// Number of stored records
    pub fn record_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .lock()
            .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn parse_identity(raw: String) -> Result<Identity> {
    raw.parse()
}

impl RecordStore for SqliteRecordStore {
    fn load(&self, identity: Identity) -> Result<Option<Vec<Slot>>> {
        let result = self.conn.lock().query_row(
            "SELECT slots_json FROM records WHERE identity = ?1",
            params![identity.to_string()],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, identity: Identity, slots: &[Slot]) -> Result<()> {
        let slots_json = serde_json::to_string(slots)?;
        let now_ms = chrono::Utc::now().timestamp_millis();

        self.conn.lock().execute(
            "INSERT INTO records (identity, slots_json, updated_at_ms)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(identity) DO UPDATE SET
                slots_json = excluded.slots_json,
                updated_at_ms = excluded.updated_at_ms",
            params![identity.to_string(), slots_json, now_ms],
        )?;
        tracing::debug!("Saved record for {}", identity);
        Ok(())
    }

    fn delete(&self, identity: Identity) -> Result<()> {
        let removed = self.conn.lock().execute(
            "DELETE FROM records WHERE identity = ?1",
            params![identity.to_string()],
        )?;
        tracing::debug!("Deleted record for {} ({} row(s))", identity, removed);
        Ok(())
    }

    fn find_by_name(&self, name: &str) -> Result<Option<Identity>> {
        let result = self.conn.lock().query_row(
            "SELECT p.identity FROM players p
             JOIN records r ON r.identity = p.identity
             WHERE p.display_name = ?1
             ORDER BY p.sighting DESC LIMIT 1",
            params![name],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(raw) => parse_identity(raw).map(Some),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn known_names(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT DISTINCT p.display_name FROM players p
             JOIN records r ON r.identity = p.identity
             ORDER BY p.display_name",
        )?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(CoreError::from)
    }

    fn remember_name(&self, identity: Identity, name: &str) -> Result<()> {
        let now_ms = chrono::Utc::now().timestamp_millis();
        self.conn.lock().execute(
            "INSERT INTO players (identity, display_name, seen_at_ms, sighting)
             VALUES (?1, ?2, ?3, (SELECT COALESCE(MAX(sighting), 0) + 1 FROM players))
             ON CONFLICT(identity) DO UPDATE SET
                display_name = excluded.display_name,
                seen_at_ms = excluded.seen_at_ms,
                sighting = excluded.sighting",
            params![identity.to_string(), name, now_ms],
        )?;
        Ok(())
    }
}
