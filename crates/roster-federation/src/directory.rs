//! The non-federated directory.

use roster_types::{
    AddressBookInfo, CardBackend, ChangeSet, ContactDirectory, ContactRecord, Credential,
    DirectoryError, StoredCard,
};
use std::sync::Arc;

/// Serves cards exactly as storage holds them, to callers the address
/// book's ACL lets read.
///
/// This is the path every caller that is not a trusted federation peer
/// takes through [`crate::FederatedAccessGate`]. Anonymous callers are
/// `Unauthenticated`; callers without a read grant, the `system` login
/// included, are `Forbidden`.
#[derive(Clone)]
pub struct PlainDirectory {
    address_book: AddressBookInfo,
    backend: Arc<dyn CardBackend>,
}

impl PlainDirectory {
    pub fn new(address_book: AddressBookInfo, backend: Arc<dyn CardBackend>) -> Self {
        Self {
            address_book,
            backend,
        }
    }

    fn authorize(&self, caller: Option<&Credential>) -> Result<(), DirectoryError> {
        let Some(credential) = caller else {
            return Err(DirectoryError::Unauthenticated);
        };
        if self.address_book.grants_read_to(caller) {
            return Ok(());
        }

        tracing::debug!(
            username = %credential.username,
            address_book = %self.address_book.uri,
            "caller has no read grant on address book"
        );
        Err(DirectoryError::Forbidden(self.address_book.uri.clone()))
    }

    fn to_record(&self, card: StoredCard) -> ContactRecord {
        ContactRecord {
            id: card.uri,
            raw_data: card.card_data,
            acl: self.address_book.child_acl(),
        }
    }
}

impl ContactDirectory for PlainDirectory {
    fn list_all(
        &self,
        caller: Option<&Credential>,
    ) -> Result<Vec<ContactRecord>, DirectoryError> {
        self.authorize(caller)?;
        let cards = self.backend.list_cards(self.address_book.id)?;
        Ok(cards.into_iter().map(|c| self.to_record(c)).collect())
    }

    fn fetch_one(
        &self,
        caller: Option<&Credential>,
        name: &str,
    ) -> Result<ContactRecord, DirectoryError> {
        self.authorize(caller)?;
        self.backend
            .get_card(self.address_book.id, name)?
            .map(|c| self.to_record(c))
            .ok_or_else(|| DirectoryError::NotFound(name.to_string()))
    }

    fn fetch_many(
        &self,
        caller: Option<&Credential>,
        names: &[String],
    ) -> Result<Vec<ContactRecord>, DirectoryError> {
        self.authorize(caller)?;
        let cards = self
            .backend
            .get_multiple_cards(self.address_book.id, names)?;
        Ok(cards.into_iter().map(|c| self.to_record(c)).collect())
    }

    fn get_changes(
        &self,
        caller: Option<&Credential>,
        sync_token: Option<&str>,
        sync_level: u32,
        limit: Option<u32>,
    ) -> Result<Option<ChangeSet>, DirectoryError> {
        self.authorize(caller)?;
        let Some(sync) = self.backend.sync_support() else {
            return Ok(None);
        };
        let changes =
            sync.get_changes_for_address_book(self.address_book.id, sync_token, sync_level, limit)?;
        Ok(Some(changes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_types::{BackendError, SYSTEM_PRINCIPAL};

    const CARD: &[u8] =
        b"BEGIN:VCARD\r\nVERSION:4.0\r\nFN;X-NC-SCOPE=v2-local:Dana\r\nEND:VCARD\r\n";

    struct OneCard;

    impl CardBackend for OneCard {
        fn get_card(&self, _: i64, uri: &str) -> Result<Option<StoredCard>, BackendError> {
            Ok((uri == "dana.vcf").then(|| StoredCard {
                uri: uri.to_string(),
                card_data: CARD.to_vec(),
            }))
        }

        fn get_multiple_cards(&self, id: i64, uris: &[String]) -> Result<Vec<StoredCard>, BackendError> {
            let mut cards = Vec::new();
            for uri in uris {
                cards.extend(self.get_card(id, uri)?);
            }
            Ok(cards)
        }

        fn list_cards(&self, id: i64) -> Result<Vec<StoredCard>, BackendError> {
            self.get_multiple_cards(id, &["dana.vcf".to_string()])
        }
    }

    fn directory(owner: &str) -> PlainDirectory {
        PlainDirectory::new(
            AddressBookInfo {
                id: 1,
                uri: "contacts".to_string(),
                principal_uri: owner.to_string(),
                display_name: None,
            },
            Arc::new(OneCard),
        )
    }

    #[test]
    fn anonymous_callers_are_unauthenticated() {
        let dir = directory(SYSTEM_PRINCIPAL);
        assert!(matches!(
            dir.fetch_one(None, "dana.vcf"),
            Err(DirectoryError::Unauthenticated)
        ));
        assert!(matches!(dir.list_all(None), Err(DirectoryError::Unauthenticated)));
        assert!(matches!(
            dir.fetch_many(None, &["dana.vcf".to_string()]),
            Err(DirectoryError::Unauthenticated)
        ));
        assert!(matches!(
            dir.get_changes(None, Some("1"), 1, None),
            Err(DirectoryError::Unauthenticated)
        ));
    }

    #[test]
    fn untrusted_system_login_is_forbidden() {
        let dir = directory(SYSTEM_PRINCIPAL);
        let system = Credential::new("system", "wrong");
        assert!(matches!(
            dir.fetch_one(Some(&system), "dana.vcf"),
            Err(DirectoryError::Forbidden(ref uri)) if uri == "contacts"
        ));
        assert!(matches!(
            dir.list_all(Some(&system)),
            Err(DirectoryError::Forbidden(_))
        ));
    }

    #[test]
    fn local_users_read_the_system_book_unredacted() {
        let dir = directory(SYSTEM_PRINCIPAL);
        let alice = Credential::new("alice", "pw");

        let record = dir.fetch_one(Some(&alice), "dana.vcf").unwrap();
        assert_eq!(record.raw_data, CARD);
        assert!(matches!(
            dir.fetch_one(Some(&alice), "nobody.vcf"),
            Err(DirectoryError::NotFound(_))
        ));
        assert_eq!(dir.list_all(Some(&alice)).unwrap().len(), 1);
        assert_eq!(dir.get_changes(Some(&alice), Some("1"), 1, None).unwrap(), None);
    }

    #[test]
    fn personal_books_are_owner_only() {
        let dir = directory("principals/users/bob");
        let alice = Credential::new("alice", "pw");
        let bob = Credential::new("bob", "pw");

        assert!(matches!(
            dir.fetch_many(Some(&alice), &["dana.vcf".to_string()]),
            Err(DirectoryError::Forbidden(_))
        ));
        assert_eq!(
            dir.fetch_many(Some(&bob), &["dana.vcf".to_string()])
                .unwrap()
                .len(),
            1
        );
    }
}
