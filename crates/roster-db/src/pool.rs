//! Connection pool creation and configuration.

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use thiserror::Error;

/// Runtime tunables for SQLite connection behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbRuntimeSettings {
    /// Busy timeout for SQLite connections, in milliseconds.
    pub busy_timeout_ms: u64,

    /// Maximum number of pooled SQLite connections.
    ///
    /// Every connection to `:memory:` opens its own empty database, so
    /// [`create_pool`] caps in-memory pools at one connection.
    pub pool_max_size: u32,
}

impl Default for DbRuntimeSettings {
    fn default() -> Self {
        Self {
            busy_timeout_ms: 5_000,
            pool_max_size: 8,
        }
    }
}

/// Path that opens a private in-memory database per connection.
pub const IN_MEMORY_PATH: &str = ":memory:";

impl DbRuntimeSettings {
    /// Settings adjusted for the database at `db_path`.
    ///
    /// An in-memory database is pinned to one connection so every store
    /// sees the same tables. A pool size of zero becomes one.
    pub fn for_path(self, db_path: &str) -> Self {
        let pool_max_size = if db_path == IN_MEMORY_PATH {
            if self.pool_max_size != 1 {
                tracing::debug!(
                    requested = self.pool_max_size,
                    "in-memory database pinned to a single connection"
                );
            }
            1
        } else {
            self.pool_max_size.max(1)
        };
        Self {
            pool_max_size,
            ..self
        }
    }
}

/// The SQLite connection pool shared by every store in this crate.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Errors that can occur when creating the database pool.
#[derive(Debug, Error)]
pub enum PoolError {
    /// Failed to build the connection pool.
    #[error("failed to create database connection pool: {0}")]
    PoolInit(#[from] r2d2::Error),
}

/// Creates a SQLite connection pool with WAL journaling and foreign keys on.
///
/// `db_path` may be `:memory:` for tests.
///
/// # Errors
///
/// Returns `PoolError::PoolInit` if the first connections cannot be opened
/// or initialised.
pub fn create_pool(db_path: &str, settings: DbRuntimeSettings) -> Result<DbPool, PoolError> {
    let settings = settings.for_path(db_path);
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;

    let manager = SqliteConnectionManager::file(db_path)
        .with_flags(flags)
        .with_init(move |conn| {
            // In-memory databases report "memory"; anything else means the
            // WAL request was refused.
            let mode: String = conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))?;
            if mode != "wal" && mode != "memory" {
                return Err(rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
                    Some(format!("journal_mode stayed {mode}, expected wal")),
                ));
            }
            conn.execute_batch(&format!(
                "PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = {};",
                settings.busy_timeout_ms
            ))
        });

    Ok(Pool::builder()
        .max_size(settings.pool_max_size)
        .build(manager)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_pool_applies_pragmas() {
        let settings = DbRuntimeSettings {
            busy_timeout_ms: 1_500,
            pool_max_size: 1,
        };

        let pool = create_pool(":memory:", settings).expect("pool creation should succeed");
        let conn = pool.get().expect("should get a connection");

        let fk: i32 = conn
            .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
            .expect("should query foreign_keys");
        assert_eq!(fk, 1, "foreign keys should be enabled");

        let busy_timeout: i32 = conn
            .query_row("PRAGMA busy_timeout;", [], |row| row.get(0))
            .expect("should query busy_timeout");
        assert_eq!(busy_timeout, 1_500);

        assert_eq!(pool.max_size(), 1);
    }

    #[test]
    fn in_memory_pool_is_pinned_to_one_connection() {
        let pool = create_pool(IN_MEMORY_PATH, DbRuntimeSettings::default())
            .expect("pool creation should succeed");
        assert_eq!(pool.max_size(), 1);

        pool.get()
            .unwrap()
            .execute_batch("CREATE TABLE t (x INTEGER);")
            .unwrap();
        let count: i64 = pool
            .get()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM t", [], |row| row.get(0))
            .expect("table should be visible through the pool");
        assert_eq!(count, 0);
    }

    #[test]
    fn pool_size_is_adjusted_per_path() {
        let zero = DbRuntimeSettings {
            busy_timeout_ms: 10,
            pool_max_size: 0,
        };
        assert_eq!(zero.for_path("roster.db").pool_max_size, 1);
        assert_eq!(zero.for_path(IN_MEMORY_PATH).pool_max_size, 1);

        let settings = DbRuntimeSettings::default();
        assert_eq!(settings.for_path("roster.db"), settings);
        assert_eq!(settings.for_path(IN_MEMORY_PATH).busy_timeout_ms, 5_000);
    }

    #[test]
    fn file_pool_uses_wal() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let path = dir.path().join("roster.db");

        let pool = create_pool(path.to_str().unwrap(), DbRuntimeSettings::default())
            .expect("pool creation should succeed");
        let conn = pool.get().expect("should get a connection");

        let mode: String = conn
            .query_row("PRAGMA journal_mode;", [], |row| row.get(0))
            .expect("should query journal_mode");
        assert_eq!(mode, "wal");
    }
}
