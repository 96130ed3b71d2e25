//! Local user accounts.

use crate::{DbPool, StoreError};
use roster_types::SYSTEM_USERNAME;
use rusqlite::{params, OptionalExtension};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Password store for the local users the address book is shared with.
///
/// Passwords are kept as a SHA-256 digest over a per-user random salt
/// followed by the password. The `system` login is reserved for
/// federation peers and cannot be registered here.
#[derive(Clone)]
pub struct SqliteUserStore {
    pool: DbPool,
}

impl SqliteUserStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Registers a user.
    ///
    /// # Errors
    ///
    /// `ReservedUsername` for `system`, `UserExists` if the name is taken.
    pub fn create_user(&self, username: &str, password: &str) -> Result<i64, StoreError> {
        if username.eq_ignore_ascii_case(SYSTEM_USERNAME) || username.trim().is_empty() {
            return Err(StoreError::ReservedUsername(username.to_string()));
        }

        let salt: [u8; 16] = rand::random();
        let conn = self.pool.get()?;
        let inserted = conn.execute(
            "INSERT INTO users (username, password_salt, password_hash) VALUES (?1, ?2, ?3)
             ON CONFLICT (username) DO NOTHING",
            params![username, hex::encode(salt), password_hash(&salt, password)],
        )?;
        if inserted == 0 {
            return Err(StoreError::UserExists(username.to_string()));
        }

        tracing::info!(username, "created local user");
        Ok(conn.last_insert_rowid())
    }

    /// Checks a username and password. Unknown users simply fail.
    pub fn verify_password(&self, username: &str, password: &str) -> Result<bool, StoreError> {
        let conn = self.pool.get()?;
        let stored: Option<(String, String)> = conn
            .query_row(
                "SELECT password_salt, password_hash FROM users WHERE username = ?1",
                [username],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((salt, expected)) = stored else {
            return Ok(false);
        };
        let Ok(salt) = hex::decode(salt) else {
            tracing::warn!(username, "stored password salt is not hex");
            return Ok(false);
        };

        let presented = password_hash(&salt, password);
        Ok(presented.as_bytes().ct_eq(expected.as_bytes()).into())
    }

    /// Removes a user. Returns whether the user existed.
    pub fn delete_user(&self, username: &str) -> Result<bool, StoreError> {
        let conn = self.pool.get()?;
        let removed = conn.execute("DELETE FROM users WHERE username = ?1", [username])?;
        Ok(removed > 0)
    }
}

fn password_hash(salt: &[u8], password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}
