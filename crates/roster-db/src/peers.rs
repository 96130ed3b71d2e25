//! Trusted federation peers.

use crate::{DbPool, StoreError};
use roster_types::{BackendError, PeerRegistry, PeerStatus, TrustedPeer};
use rusqlite::params;

/// [`PeerRegistry`] backed by the `trusted_servers` table.
#[derive(Clone)]
pub struct SqlitePeerRegistry {
    pool: DbPool,
}

impl SqlitePeerRegistry {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Registers a server whose secret exchange has not completed yet.
    pub fn add_trusted_server(&self, url: &str) -> Result<i64, StoreError> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO trusted_servers (url, status) VALUES (?1, ?2)",
            params![url, PeerStatus::Pending.as_str()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Records the secret a server authenticates with and marks it `ok`.
    ///
    /// Returns `false` if no server with that URL is registered.
    pub fn set_shared_secret(&self, url: &str, secret: &str) -> Result<bool, StoreError> {
        let conn = self.pool.get()?;
        let updated = conn.execute(
            "UPDATE trusted_servers
             SET shared_secret = ?2, status = ?3, updated_at = datetime('now')
             WHERE url = ?1",
            params![url, secret, PeerStatus::Ok.as_str()],
        )?;
        Ok(updated > 0)
    }

    /// Updates a server's registration state.
    pub fn set_status(&self, url: &str, status: PeerStatus) -> Result<bool, StoreError> {
        let conn = self.pool.get()?;
        let updated = conn.execute(
            "UPDATE trusted_servers SET status = ?2, updated_at = datetime('now') WHERE url = ?1",
            params![url, status.as_str()],
        )?;
        Ok(updated > 0)
    }

    /// Forgets a server. Returns whether it was registered.
    pub fn remove_trusted_server(&self, url: &str) -> Result<bool, StoreError> {
        let conn = self.pool.get()?;
        let removed = conn.execute("DELETE FROM trusted_servers WHERE url = ?1", [url])?;
        Ok(removed > 0)
    }

    fn load(&self) -> Result<Vec<TrustedPeer>, StoreError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT url, shared_secret, status FROM trusted_servers
             WHERE shared_secret IS NOT NULL
             ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            let status: String = row.get(2)?;
            let status = status.parse::<PeerStatus>().map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    2,
                    rusqlite::types::Type::Text,
                    e.into(),
                )
            })?;
            Ok(TrustedPeer {
                url: row.get(0)?,
                shared_secret: row.get(1)?,
                status,
            })
        })?;

        let mut peers = Vec::new();
        for row in rows {
            peers.push(row?);
        }
        Ok(peers)
    }
}

impl PeerRegistry for SqlitePeerRegistry {
    fn list_peers(&self) -> Result<Vec<TrustedPeer>, BackendError> {
        Ok(self.load()?)
    }
}
