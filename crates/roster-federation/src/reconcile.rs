//! Rewriting of incremental-sync change sets for federated peers.

use roster_types::{ChangeSet, ContactRecord};

/// Outcome of fetching one card on behalf of a trusted peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disclosure {
    /// The card exists and its redacted form may be shown.
    Visible(ContactRecord),
    /// Storage has no such card.
    NotFound,
    /// The card exists but its redacted form is invalid.
    Forbidden,
}

/// Moves every added or modified card the peer cannot fetch to `deleted`.
///
/// `disclose` is asked about each id in `added`, then each id in `modified`.
/// Ids that are not [`Disclosure::Visible`] are appended to `deleted` in
/// that order, after the entries storage already reported as deleted.
/// Those original entries are passed through without being checked.
///
/// # Errors
///
/// Returns the first error `disclose` reports; nothing is reclassified then.
pub fn reconcile<E, F>(changes: ChangeSet, mut disclose: F) -> Result<ChangeSet, E>
where
    F: FnMut(&str) -> Result<Disclosure, E>,
{
    let ChangeSet {
        sync_token,
        added,
        modified,
        mut deleted,
    } = changes;

    let added = keep_disclosed(added, &mut disclose, &mut deleted)?;
    let modified = keep_disclosed(modified, &mut disclose, &mut deleted)?;

    Ok(ChangeSet {
        sync_token,
        added,
        modified,
        deleted,
    })
}

fn keep_disclosed<E, F>(
    ids: Vec<String>,
    disclose: &mut F,
    deleted: &mut Vec<String>,
) -> Result<Vec<String>, E>
where
    F: FnMut(&str) -> Result<Disclosure, E>,
{
    let mut kept = Vec::with_capacity(ids.len());
    for id in ids {
        match disclose(&id)? {
            Disclosure::Visible(_) => kept.push(id),
            Disclosure::NotFound | Disclosure::Forbidden => {
                tracing::debug!(card = %id, "reporting undisclosable card as deleted");
                deleted.push(id);
            }
        }
    }
    Ok(kept)
}
