//! Federation peer authentication.

use roster_types::{Credential, TrustedPeer, SYSTEM_USERNAME};
use subtle::ConstantTimeEq;

/// Returns `true` if `credential` authenticates a trusted federation peer.
///
/// A peer authenticates as [`SYSTEM_USERNAME`] with one of the known shared
/// secrets as its password. Any other username, a missing secret, or an
/// empty peer set yields `false`.
pub fn is_federated_peer(credential: Option<&Credential>, known_peers: &[TrustedPeer]) -> bool {
    let Some(credential) = credential else {
        return false;
    };
    if credential.username != SYSTEM_USERNAME {
        return false;
    }
    let Some(secret) = credential.secret.as_deref() else {
        return false;
    };

    known_peers
        .iter()
        .any(|peer| secrets_match(secret, &peer.shared_secret))
}

/// Compares secrets without leaking how long their common prefix is.
fn secrets_match(presented: &str, expected: &str) -> bool {
    presented.as_bytes().ct_eq(expected.as_bytes()).into()
}
