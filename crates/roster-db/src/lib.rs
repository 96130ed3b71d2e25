//! SQLite storage for Roster.
//!
//! Provides connection pooling (via `r2d2`), embedded SQL migrations, and
//! the SQLite implementations of the collaborator contracts declared in
//! `roster-types`: card storage with change tracking, the trusted-peer
//! registry, and application configuration values. Local user accounts
//! live here too.
//!
//! Every table is created through versioned migrations managed by this
//! crate. All stores share one [`DbPool`] and check a connection out per
//! call; no store keeps a connection across calls.

mod app_config;
mod cards;
mod migrations;
mod peers;
mod pool;
mod users;

use thiserror::Error;

pub use app_config::SqliteAppConfig;
pub use cards::SqliteCardStore;
pub use migrations::{run_migrations, MigrationError};
pub use peers::SqlitePeerRegistry;
pub use pool::{create_pool, DbPool, DbRuntimeSettings, PoolError, IN_MEMORY_PATH};
pub use users::SqliteUserStore;

/// Errors raised by the SQLite stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("address book not found: {0}")]
    AddressBookNotFound(i64),
    #[error("invalid sync token: {0}")]
    InvalidSyncToken(String),
    #[error("username is reserved: {0}")]
    ReservedUsername(String),
    #[error("user already exists: {0}")]
    UserExists(String),
}

impl From<StoreError> for roster_types::BackendError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::AddressBookNotFound(id) => Self::UnknownAddressBook(id),
            StoreError::InvalidSyncToken(token) => Self::InvalidSyncToken(token),
            other => Self::storage(other),
        }
    }
}
