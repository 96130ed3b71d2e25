//! Error taxonomy for directory operations.

use thiserror::Error;

/// Failures raised by storage, the peer registry, or the feature-flag store.
///
/// These are the collaborators' own errors; the federation core passes them
/// through unchanged and never retries.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The underlying store failed.
    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The presented sync token is not one this store issues.
    #[error("invalid sync token: {0}")]
    InvalidSyncToken(String),

    /// The address book does not exist in storage.
    #[error("unknown address book: {0}")]
    UnknownAddressBook(i64),
}

impl BackendError {
    /// Wraps any error as a storage failure.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage(Box::new(err))
    }
}

/// Signals surfaced to callers of a contact directory.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The card does not exist.
    #[error("card not found: {0}")]
    NotFound(String),

    /// The caller may not see the named card or address book.
    #[error("access forbidden: {0}")]
    Forbidden(String),

    /// The caller presented no credentials.
    #[error("authentication required")]
    Unauthenticated,

    /// A bounded page size was combined with an initial (token-less) sync.
    #[error("a limit is not supported on an initial sync")]
    UnsupportedLimitOnInitialSync,

    /// A collaborator failed.
    #[error(transparent)]
    Backend(#[from] BackendError),
}
