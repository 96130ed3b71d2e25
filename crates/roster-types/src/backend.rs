//! Contracts the federation core expects from its collaborators.
//!
//! Storage, the trusted-peer registry, and the feature-flag store are owned
//! outside the core. Each is expressed as a trait so the core can be driven
//! by SQLite in production and by in-memory fakes in tests.

use crate::{BackendError, ChangeSet, ContactRecord, Credential, DirectoryError, TrustedPeer};

/// A card row as held by storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCard {
    /// Card URI within its address book.
    pub uri: String,
    /// Serialized vCard.
    pub card_data: Vec<u8>,
}

/// Read access to stored cards.
pub trait CardBackend: Send + Sync {
    /// Returns a single card, or `None` if it does not exist.
    fn get_card(&self, address_book_id: i64, uri: &str) -> Result<Option<StoredCard>, BackendError>;

    /// Returns every existing card among `uris`. Missing URIs are skipped.
    ///
    /// Implementations must return the same order for the same input.
    fn get_multiple_cards(
        &self,
        address_book_id: i64,
        uris: &[String],
    ) -> Result<Vec<StoredCard>, BackendError>;

    /// Returns every card of the address book.
    fn list_cards(&self, address_book_id: i64) -> Result<Vec<StoredCard>, BackendError>;

    /// Returns the change-tracking capability, if this backend has one.
    fn sync_support(&self) -> Option<&dyn SyncSupport> {
        None
    }
}

/// Change tracking for incremental sync.
pub trait SyncSupport: Send + Sync {
    /// Returns the cards changed since `sync_token`.
    ///
    /// Without a token, every current card is reported as added.
    fn get_changes_for_address_book(
        &self,
        address_book_id: i64,
        sync_token: Option<&str>,
        sync_level: u32,
        limit: Option<u32>,
    ) -> Result<ChangeSet, BackendError>;
}

/// The registry of trusted federation peers.
pub trait PeerRegistry: Send + Sync {
    /// Returns the full current set of trusted peers.
    fn list_peers(&self) -> Result<Vec<TrustedPeer>, BackendError>;
}

/// Application configuration values.
pub trait AppConfig: Send + Sync {
    /// Returns the value stored for `app`/`key`, or `default` when unset.
    fn get_app_value(&self, app: &str, key: &str, default: &str) -> Result<String, BackendError>;
}

/// A directory of contacts as seen by one caller.
///
/// Implementations enforce their own access control on `caller`.
pub trait ContactDirectory: Send + Sync {
    /// Lists every card the caller may enumerate.
    fn list_all(&self, caller: Option<&Credential>) -> Result<Vec<ContactRecord>, DirectoryError>;

    /// Fetches one card by name.
    fn fetch_one(
        &self,
        caller: Option<&Credential>,
        name: &str,
    ) -> Result<ContactRecord, DirectoryError>;

    /// Fetches every existing card among `names`.
    fn fetch_many(
        &self,
        caller: Option<&Credential>,
        names: &[String],
    ) -> Result<Vec<ContactRecord>, DirectoryError>;

    /// Returns the changes since `sync_token`, or `None` when the directory
    /// has no incremental-sync support.
    fn get_changes(
        &self,
        caller: Option<&Credential>,
        sync_token: Option<&str>,
        sync_level: u32,
        limit: Option<u32>,
    ) -> Result<Option<ChangeSet>, DirectoryError>;
}
