//! SQLite-backed key-value medium
//!
//! One table of string records shared by every persisted cache. Caches are
//! kept apart by their key prefix, so the medium itself never interprets
//! keys or values.

use std::path::{Path, PathBuf};

use anistream_common::cache::{CacheResult, KeyValueMedium};
use anistream_domain::{AniStreamError, Result};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use crate::errors::{sql_to_cache, InfraError};

const SCHEMA_VERSION: i32 = 1;
const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS cache_records (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL,
    updated_at INTEGER NOT NULL
);
";

/// Durable medium stored in a single SQLite file
pub struct SqliteMedium {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl SqliteMedium {
    /// Open (or create) the database at `db_path` and ensure the schema
    ///
    /// # Errors
    /// Returns `AniStreamError::Storage` if the file cannot be opened or
    /// the schema cannot be created.
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let path = db_path.as_ref().to_path_buf();
        let conn = Connection::open(&path).map_err(map_sql_error)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))
            .map_err(map_sql_error)?;
        let medium = Self::from_connection(conn, Some(path))?;
        info!(db_path = %medium.path_display(), "sqlite cache medium opened");
        Ok(medium)
    }

    /// Private in-memory database, gone when the medium drops
    ///
    /// # Errors
    /// Returns `AniStreamError::Storage` if SQLite cannot allocate it.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(map_sql_error)?;
        Self::from_connection(conn, None)
    }

    fn from_connection(conn: Connection, path: Option<PathBuf>) -> Result<Self> {
        conn.busy_timeout(std::time::Duration::from_secs(5)).map_err(map_sql_error)?;
        create_schema(&conn)?;
        Ok(Self { conn: Mutex::new(conn), path })
    }

    /// Database file, `None` for in-memory databases
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of stored records across all prefixes
    ///
    /// # Errors
    /// Returns `AniStreamError::Storage` if the count query fails.
    pub fn record_count(&self) -> Result<usize> {
        let conn = self.conn.lock();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM cache_records", [], |row| row.get(0))
            .map_err(map_sql_error)?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Verify the database is accessible and responding
    ///
    /// # Errors
    /// Returns `AniStreamError::Storage` if the health-check query fails.
    pub fn health_check(&self) -> Result<()> {
        let conn = self.conn.lock();
        conn.query_row("SELECT 1", [], |row| row.get::<_, i32>(0)).map_err(map_sql_error)?;
        Ok(())
    }

    fn path_display(&self) -> String {
        self.path.as_ref().map_or_else(|| ":memory:".to_string(), |p| p.display().to_string())
    }
}

impl std::fmt::Debug for SqliteMedium {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteMedium").field("path", &self.path_display()).finish()
    }
}

impl KeyValueMedium for SqliteMedium {
    fn keys_with_prefix(&self, prefix: &str) -> CacheResult<Vec<String>> {
        let prefix_len = i64::try_from(prefix.chars().count()).unwrap_or(i64::MAX);
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT key FROM cache_records WHERE substr(key, 1, ?1) = ?2 ORDER BY key",
            )
            .map_err(|e| sql_to_cache("keys", e))?;
        let rows = stmt
            .query_map(params![prefix_len, prefix], |row| row.get::<_, String>(0))
            .map_err(|e| sql_to_cache("keys", e))?;
        rows.collect::<std::result::Result<Vec<_>, _>>().map_err(|e| sql_to_cache("keys", e))
    }

    fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let conn = self.conn.lock();
        conn.query_row("SELECT value FROM cache_records WHERE key = ?1", params![key], |row| {
            row.get::<_, String>(0)
        })
        .optional()
        .map_err(|e| sql_to_cache("get", e))
    }

    fn set(&self, key: &str, value: &str) -> CacheResult<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO cache_records (key, value, updated_at)
             VALUES (?1, ?2, CAST(strftime('%s','now') AS INTEGER))
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value],
        )
        .map_err(|e| sql_to_cache("set", e))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> CacheResult<()> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM cache_records WHERE key = ?1", params![key])
            .map_err(|e| sql_to_cache("remove", e))?;
        Ok(())
    }
}

fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA_SQL).map_err(map_sql_error)?;
    let version: i32 =
        conn.query_row("PRAGMA user_version", [], |row| row.get(0)).map_err(map_sql_error)?;
    if version > SCHEMA_VERSION {
        return Err(AniStreamError::Storage(format!(
            "cache database schema v{version} is newer than supported v{SCHEMA_VERSION}"
        )));
    }
    conn.pragma_update(None, "user_version", SCHEMA_VERSION).map_err(map_sql_error)?;
    Ok(())
}

fn map_sql_error(err: rusqlite::Error) -> AniStreamError {
    AniStreamError::from(InfraError::from(err))
}
