//! Federated visibility filter for the shared contact directory.
//!
//! Decides, per request, whether the caller is a trusted federation peer
//! and, if so, strips locally-scoped vCard properties before a card is
//! returned or counted in an incremental-sync feed.
//!
//! - [`trust`] checks `system` credentials against the trusted-peer set.
//! - [`redact`] removes `X-NC-SCOPE=v2-local` properties and re-validates.
//! - [`reconcile`] moves undisclosable cards of a change set to `deleted`.
//! - [`FederatedAccessGate`] wires the three around the directory reads.
//!
//! Callers that are not trusted peers get the underlying directory's
//! behavior unchanged ([`PlainDirectory`] by default). A peer probing for a
//! card whose identity properties are all local-only sees it as deleted in
//! sync feeds and as forbidden on direct fetch; it never sees its content.

mod directory;
mod enumeration;
mod gate;
pub mod reconcile;
pub mod redact;
pub mod trust;

pub use directory::PlainDirectory;
pub use enumeration::EnumerationPolicy;
pub use gate::FederatedAccessGate;
pub use reconcile::{reconcile, Disclosure};
pub use redact::{redact, RedactionError};
pub use trust::is_federated_peer;
