//! Card storage with change tracking.
//!
//! Every write bumps the owning address book's `synctoken` and records an
//! `addressbook_changes` row at the previous token value, inside the same
//! transaction as the card write. Incremental sync reads those rows back.

use crate::{DbPool, StoreError};
use roster_types::{
    AddressBookInfo, BackendError, CardBackend, ChangeSet, StoredCard, SyncSupport,
};
use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Maximum number of URIs bound into one `IN (...)` clause.
const MAX_URIS_PER_QUERY: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChangeOp {
    Added = 1,
    Modified = 2,
    Deleted = 3,
}

/// [`CardBackend`] and [`SyncSupport`] over the `cards` table.
#[derive(Clone)]
pub struct SqliteCardStore {
    pool: DbPool,
}

impl SqliteCardStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Creates an address book.
    pub fn create_address_book(
        &self,
        principal_uri: &str,
        uri: &str,
        display_name: Option<&str>,
    ) -> Result<AddressBookInfo, StoreError> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO addressbooks (principal_uri, uri, display_name) VALUES (?1, ?2, ?3)",
            params![principal_uri, uri, display_name],
        )?;
        let id = conn.last_insert_rowid();
        tracing::info!(address_book_id = id, uri, "created address book");

        Ok(AddressBookInfo {
            id,
            uri: uri.to_string(),
            principal_uri: principal_uri.to_string(),
            display_name: display_name.map(str::to_string),
        })
    }

    /// Looks up an address book by owner and URI.
    pub fn get_address_book_by_uri(
        &self,
        principal_uri: &str,
        uri: &str,
    ) -> Result<Option<AddressBookInfo>, StoreError> {
        let conn = self.pool.get()?;
        let info = conn
            .query_row(
                "SELECT id, uri, principal_uri, display_name FROM addressbooks
                 WHERE principal_uri = ?1 AND uri = ?2",
                params![principal_uri, uri],
                |row| {
                    Ok(AddressBookInfo {
                        id: row.get(0)?,
                        uri: row.get(1)?,
                        principal_uri: row.get(2)?,
                        display_name: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(info)
    }

    /// Returns the address book, creating it first if it does not exist.
    pub fn ensure_address_book(
        &self,
        principal_uri: &str,
        uri: &str,
        display_name: Option<&str>,
    ) -> Result<AddressBookInfo, StoreError> {
        match self.get_address_book_by_uri(principal_uri, uri)? {
            Some(info) => Ok(info),
            None => self.create_address_book(principal_uri, uri, display_name),
        }
    }

    /// Stores a new card and returns its etag.
    pub fn create_card(
        &self,
        address_book_id: i64,
        uri: &str,
        card_data: &[u8],
    ) -> Result<String, StoreError> {
        let etag = etag(card_data);
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO cards (addressbook_id, uri, carddata, etag, size, lastmodified)
             VALUES (?1, ?2, ?3, ?4, ?5, strftime('%s', 'now'))",
            params![address_book_id, uri, card_data, etag, card_data.len() as i64],
        )?;
        record_change(&tx, address_book_id, uri, ChangeOp::Added)?;
        tx.commit()?;

        tracing::debug!(address_book_id, card = uri, "created card");
        Ok(etag)
    }

    /// Replaces a card's data. Returns the new etag, or `None` if the card
    /// does not exist.
    pub fn update_card(
        &self,
        address_book_id: i64,
        uri: &str,
        card_data: &[u8],
    ) -> Result<Option<String>, StoreError> {
        let etag = etag(card_data);
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        let updated = tx.execute(
            "UPDATE cards SET carddata = ?3, etag = ?4, size = ?5, lastmodified = strftime('%s', 'now')
             WHERE addressbook_id = ?1 AND uri = ?2",
            params![address_book_id, uri, card_data, etag, card_data.len() as i64],
        )?;
        if updated == 0 {
            return Ok(None);
        }
        record_change(&tx, address_book_id, uri, ChangeOp::Modified)?;
        tx.commit()?;

        tracing::debug!(address_book_id, card = uri, "updated card");
        Ok(Some(etag))
    }

    /// Deletes a card. Returns whether it existed.
    pub fn delete_card(&self, address_book_id: i64, uri: &str) -> Result<bool, StoreError> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        let removed = tx.execute(
            "DELETE FROM cards WHERE addressbook_id = ?1 AND uri = ?2",
            params![address_book_id, uri],
        )?;
        if removed == 0 {
            return Ok(false);
        }
        record_change(&tx, address_book_id, uri, ChangeOp::Deleted)?;
        tx.commit()?;

        tracing::debug!(address_book_id, card = uri, "deleted card");
        Ok(true)
    }

    fn fetch_one(&self, address_book_id: i64, uri: &str) -> Result<Option<StoredCard>, StoreError> {
        let conn = self.pool.get()?;
        let card = conn
            .query_row(
                "SELECT uri, carddata FROM cards
                 WHERE addressbook_id = ?1 AND uri = ?2",
                params![address_book_id, uri],
                map_card,
            )
            .optional()?;
        Ok(card)
    }

    fn fetch_many(&self, address_book_id: i64, uris: &[String]) -> Result<Vec<StoredCard>, StoreError> {
        if uris.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.pool.get()?;
        let mut cards = Vec::with_capacity(uris.len());
        for chunk in uris.chunks(MAX_URIS_PER_QUERY) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let sql = format!(
                "SELECT uri, carddata FROM cards
                 WHERE addressbook_id = ? AND uri IN ({placeholders})"
            );
            let mut bound = Vec::with_capacity(chunk.len() + 1);
            bound.push(Value::Integer(address_book_id));
            bound.extend(chunk.iter().map(|uri| Value::Text(uri.clone())));

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(rusqlite::params_from_iter(bound), map_card)?;
            for row in rows {
                cards.push(row?);
            }
        }

        // The same URI may be requested in more than one chunk.
        cards.sort_by(|a, b| a.uri.cmp(&b.uri));
        cards.dedup_by(|a, b| a.uri == b.uri);
        Ok(cards)
    }

    fn fetch_all(&self, address_book_id: i64) -> Result<Vec<StoredCard>, StoreError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT uri, carddata FROM cards
             WHERE addressbook_id = ?1 ORDER BY uri",
        )?;
        let rows = stmt.query_map([address_book_id], map_card)?;
        let mut cards = Vec::new();
        for row in rows {
            cards.push(row?);
        }
        Ok(cards)
    }

    fn changes(
        &self,
        address_book_id: i64,
        sync_token: Option<&str>,
        limit: Option<u32>,
    ) -> Result<ChangeSet, StoreError> {
        let conn = self.pool.get()?;
        let current = current_token(&conn, address_book_id)?;

        let Some(token) = sync_token.filter(|t| !t.is_empty()) else {
            let mut stmt = conn.prepare("SELECT uri FROM cards WHERE addressbook_id = ?1 ORDER BY uri")?;
            let added = stmt
                .query_map([address_book_id], |row| row.get(0))?
                .collect::<Result<Vec<String>, _>>()?;
            return Ok(ChangeSet {
                sync_token: current.to_string(),
                added,
                ..ChangeSet::default()
            });
        };

        let from: i64 = token
            .parse()
            .ok()
            .filter(|t| *t >= 0)
            .ok_or_else(|| StoreError::InvalidSyncToken(token.to_string()))?;
        let limit = limit.filter(|l| *l > 0);

        // SQLite treats a negative LIMIT as unbounded.
        let mut stmt = conn.prepare(
            "SELECT uri, operation, synctoken FROM addressbook_changes
             WHERE addressbook_id = ?1 AND synctoken >= ?2 AND synctoken < ?3
             ORDER BY synctoken, id
             LIMIT ?4",
        )?;
        let rows = stmt
            .query_map(
                params![address_book_id, from, current, limit.map_or(-1, i64::from)],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?, row.get::<_, i64>(2)?)),
            )?
            .collect::<Result<Vec<_>, _>>()?;

        let next_token = match (limit, rows.last()) {
            (Some(limit), Some((_, _, last))) if rows.len() == limit as usize => last + 1,
            _ => current,
        };

        // Collapse per URI: the last operation wins, first appearance orders.
        let mut order = Vec::new();
        let mut last_op: HashMap<String, i64> = HashMap::new();
        for (uri, op, _) in rows {
            if last_op.insert(uri.clone(), op).is_none() {
                order.push(uri);
            }
        }

        let mut changes = ChangeSet {
            sync_token: next_token.to_string(),
            ..ChangeSet::default()
        };
        for uri in order {
            match last_op.get(&uri).copied() {
                Some(op) if op == ChangeOp::Added as i64 => changes.added.push(uri),
                Some(op) if op == ChangeOp::Modified as i64 => changes.modified.push(uri),
                Some(op) if op == ChangeOp::Deleted as i64 => changes.deleted.push(uri),
                _ => {}
            }
        }

        Ok(changes)
    }
}

impl CardBackend for SqliteCardStore {
    fn get_card(&self, address_book_id: i64, uri: &str) -> Result<Option<StoredCard>, BackendError> {
        Ok(self.fetch_one(address_book_id, uri)?)
    }

    fn get_multiple_cards(
        &self,
        address_book_id: i64,
        uris: &[String],
    ) -> Result<Vec<StoredCard>, BackendError> {
        Ok(self.fetch_many(address_book_id, uris)?)
    }

    fn list_cards(&self, address_book_id: i64) -> Result<Vec<StoredCard>, BackendError> {
        Ok(self.fetch_all(address_book_id)?)
    }

    fn sync_support(&self) -> Option<&dyn SyncSupport> {
        Some(self)
    }
}

impl SyncSupport for SqliteCardStore {
    fn get_changes_for_address_book(
        &self,
        address_book_id: i64,
        sync_token: Option<&str>,
        _sync_level: u32,
        limit: Option<u32>,
    ) -> Result<ChangeSet, BackendError> {
        Ok(self.changes(address_book_id, sync_token, limit)?)
    }
}

fn map_card(row: &Row<'_>) -> rusqlite::Result<StoredCard> {
    Ok(StoredCard {
        uri: row.get(0)?,
        card_data: row.get(1)?,
    })
}

fn current_token(conn: &Connection, address_book_id: i64) -> Result<i64, StoreError> {
    conn.query_row(
        "SELECT synctoken FROM addressbooks WHERE id = ?1",
        [address_book_id],
        |row| row.get(0),
    )
    .optional()?
    .ok_or(StoreError::AddressBookNotFound(address_book_id))
}

fn record_change(
    tx: &Transaction<'_>,
    address_book_id: i64,
    uri: &str,
    op: ChangeOp,
) -> Result<(), StoreError> {
    let token = current_token(tx, address_book_id)?;
    tx.execute(
        "INSERT INTO addressbook_changes (addressbook_id, uri, synctoken, operation)
         VALUES (?1, ?2, ?3, ?4)",
        params![address_book_id, uri, token, op as i64],
    )?;
    tx.execute(
        "UPDATE addressbooks SET synctoken = synctoken + 1 WHERE id = ?1",
        [address_book_id],
    )?;
    Ok(())
}

fn etag(card_data: &[u8]) -> String {
    hex::encode(&Sha256::digest(card_data)[..16])
}
