//! Shared types, error definitions, and collaborator contracts for Roster.
//!
//! This crate provides the value objects that cross every crate boundary in
//! the workspace (credentials, trusted peers, contact records, change sets),
//! the error taxonomy surfaced by directory operations, and the traits the
//! federation core uses to reach storage, the peer registry, and feature
//! flags.
//!
//! The federation core depends on nothing *except* `roster-types` for these
//! definitions, so concrete collaborators (SQLite storage, HTTP transport)
//! can be swapped without touching the decision logic.

use serde::{Deserialize, Serialize};

pub mod backend;
mod error;

pub use backend::{AppConfig, CardBackend, ContactDirectory, PeerRegistry, StoredCard, SyncSupport};
pub use error::{BackendError, DirectoryError};

/// Username a federation peer authenticates with.
pub const SYSTEM_USERNAME: &str = "system";

/// Principal that owns the shared system address book.
pub const SYSTEM_PRINCIPAL: &str = "principals/system/system";

/// Pseudo-principal matching every authenticated local user.
pub const AUTHENTICATED_PRINCIPAL: &str = "{DAV:}authenticated";

/// vCard parameter that carries a property's visibility scope.
pub const SCOPE_PARAM: &str = "X-NC-SCOPE";

/// Credentials extracted from an inbound request.
///
/// Produced once per request by the transport layer and never mutated.
/// For any username other than [`SYSTEM_USERNAME`] the transport must have
/// verified the secret before handing the credential on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    /// The authenticated username.
    pub username: String,
    /// The password or shared secret presented with the username.
    pub secret: Option<String>,
}

impl Credential {
    /// Creates a credential with a secret.
    pub fn new(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            secret: Some(secret.into()),
        }
    }

    /// Builds a credential from the parts the transport could extract.
    ///
    /// Returns `None` when no username was presented at all.
    pub fn from_parts(username: Option<String>, secret: Option<String>) -> Option<Self> {
        username.map(|username| Self { username, secret })
    }

    /// The principal a local user acts as.
    ///
    /// `None` for the `system` login, which only ever acts as a federation
    /// peer and is never granted anything through an ACL.
    pub fn principal_uri(&self) -> Option<String> {
        (self.username != SYSTEM_USERNAME).then(|| format!("principals/users/{}", self.username))
    }
}

/// Registration state of a trusted server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerStatus {
    /// The shared secret was exchanged successfully.
    Ok,
    /// The secret exchange has not completed yet.
    Pending,
    /// The peer rejected or failed the secret exchange.
    Failure,
    /// The peer must re-run the secret exchange.
    AccessRevoked,
}

impl PeerStatus {
    /// Returns the storage label for this status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Pending => "pending",
            Self::Failure => "failure",
            Self::AccessRevoked => "access_revoked",
        }
    }
}

impl std::str::FromStr for PeerStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ok" => Ok(Self::Ok),
            "pending" => Ok(Self::Pending),
            "failure" => Ok(Self::Failure),
            "access_revoked" => Ok(Self::AccessRevoked),
            other => Err(format!("unknown peer status: {other}")),
        }
    }
}

/// A federation peer known to the local server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustedPeer {
    /// Base URL of the remote server.
    pub url: String,
    /// Secret the peer presents when authenticating as [`SYSTEM_USERNAME`].
    pub shared_secret: String,
    /// Registration state.
    pub status: PeerStatus,
}

/// Visibility scope attached to a contact property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Visible to the owner only.
    Private,
    /// Visible to users of this server only; never federated.
    Local,
    /// Shared with trusted federation peers.
    Federated,
    /// Published to the global lookup.
    Published,
}

impl Scope {
    /// Returns the parameter value used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Private => "v2-private",
            Self::Local => "v2-local",
            Self::Federated => "v2-federated",
            Self::Published => "v2-published",
        }
    }

    /// Parses a wire value. Unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "v2-private" => Some(Self::Private),
            "v2-local" => Some(Self::Local),
            "v2-federated" => Some(Self::Federated),
            "v2-published" => Some(Self::Published),
            _ => None,
        }
    }
}

/// WebDAV privilege granted by an ACL entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Privilege {
    /// `{DAV:}read`
    Read,
    /// `{DAV:}write`
    Write,
    /// `{DAV:}all`
    All,
}

impl Privilege {
    /// Returns the clark-notation name of the privilege.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "{DAV:}read",
            Self::Write => "{DAV:}write",
            Self::All => "{DAV:}all",
        }
    }
}

/// A single access-control entry on a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AclEntry {
    pub privilege: Privilege,
    pub principal: String,
    pub protected: bool,
}

impl AclEntry {
    /// Whether this entry lets `principal` read.
    ///
    /// [`AUTHENTICATED_PRINCIPAL`] entries match every principal.
    pub fn grants_read_to(&self, principal: &str) -> bool {
        matches!(self.privilege, Privilege::Read | Privilege::All)
            && (self.principal == principal || self.principal == AUTHENTICATED_PRINCIPAL)
    }
}

/// The address book a directory instance serves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressBookInfo {
    /// Storage ID of the address book.
    pub id: i64,
    /// URI segment the address book is addressed by.
    pub uri: String,
    /// Principal that owns the address book.
    pub principal_uri: String,
    /// Human-readable name.
    pub display_name: Option<String>,
}

impl AddressBookInfo {
    /// The access-control list every card of this address book carries.
    ///
    /// The owning principal may read. Cards of the system address book are
    /// also readable by every authenticated local user.
    pub fn child_acl(&self) -> Vec<AclEntry> {
        let mut acl = vec![AclEntry {
            privilege: Privilege::Read,
            principal: self.principal_uri.clone(),
            protected: true,
        }];
        if self.principal_uri == SYSTEM_PRINCIPAL {
            acl.push(AclEntry {
                privilege: Privilege::Read,
                principal: AUTHENTICATED_PRINCIPAL.to_string(),
                protected: true,
            });
        }
        acl
    }

    /// Whether `caller` may read the cards of this address book.
    ///
    /// Anonymous callers and the `system` login are never granted read.
    pub fn grants_read_to(&self, caller: Option<&Credential>) -> bool {
        let Some(principal) = caller.and_then(Credential::principal_uri) else {
            return false;
        };
        self.child_acl()
            .iter()
            .any(|entry| entry.grants_read_to(&principal))
    }
}

/// A contact as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRecord {
    /// Card URI within its address book.
    pub id: String,
    /// Serialized vCard.
    pub raw_data: Vec<u8>,
    /// Access-control list of the card.
    pub acl: Vec<AclEntry>,
}

/// Cards changed within an incremental-sync window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    /// Opaque token the caller presents to continue from this point.
    #[serde(rename = "syncToken")]
    pub sync_token: String,
    pub added: Vec<String>,
    pub modified: Vec<String>,
    pub deleted: Vec<String>,
}
