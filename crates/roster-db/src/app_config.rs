//! Application configuration values (feature flags).

use crate::{DbPool, StoreError};
use roster_types::{AppConfig, BackendError};
use rusqlite::{params, OptionalExtension};

/// [`AppConfig`] backed by the `app_config` table.
///
/// Values are read on every call; nothing is cached.
#[derive(Clone)]
pub struct SqliteAppConfig {
    pool: DbPool,
}

impl SqliteAppConfig {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Stores `value` for `app`/`key`, replacing any previous value.
    pub fn set_app_value(&self, app: &str, key: &str, value: &str) -> Result<(), StoreError> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO app_config (app, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT (app, key) DO UPDATE SET value = excluded.value",
            params![app, key, value],
        )?;
        Ok(())
    }

    /// Removes the value for `app`/`key`. Returns whether a value existed.
    pub fn delete_app_value(&self, app: &str, key: &str) -> Result<bool, StoreError> {
        let conn = self.pool.get()?;
        let removed = conn.execute(
            "DELETE FROM app_config WHERE app = ?1 AND key = ?2",
            params![app, key],
        )?;
        Ok(removed > 0)
    }

    fn lookup(&self, app: &str, key: &str) -> Result<Option<String>, StoreError> {
        let conn = self.pool.get()?;
        let value = conn
            .query_row(
                "SELECT value FROM app_config WHERE app = ?1 AND key = ?2",
                params![app, key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }
}

impl AppConfig for SqliteAppConfig {
    fn get_app_value(&self, app: &str, key: &str, default: &str) -> Result<String, BackendError> {
        Ok(self
            .lookup(app, key)?
            .unwrap_or_else(|| default.to_string()))
    }
}
