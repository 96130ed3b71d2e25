//! Trust-gated access to the shared directory.

use crate::directory::PlainDirectory;
use crate::enumeration::EnumerationPolicy;
use crate::reconcile::{reconcile, Disclosure};
use crate::redact::redact;
use crate::trust::is_federated_peer;
use roster_types::{
    AddressBookInfo, AppConfig, BackendError, CardBackend, ChangeSet, ContactDirectory,
    ContactRecord, Credential, DirectoryError, PeerRegistry, StoredCard, SYSTEM_USERNAME,
};
use std::sync::Arc;

/// Directory front that redacts cards for trusted federation peers.
///
/// Every read first decides whether the caller is a trusted peer. Callers
/// that are not get the wrapped directory's behavior unchanged. Trusted
/// peers get cards fetched straight from storage with their local-only
/// properties removed. Peers, feature flags, and cards are read fresh on
/// every call.
pub struct FederatedAccessGate {
    address_book: AddressBookInfo,
    backend: Arc<dyn CardBackend>,
    config: Arc<dyn AppConfig>,
    directory: Arc<dyn ContactDirectory>,
    peers: Option<Arc<dyn PeerRegistry>>,
}

impl FederatedAccessGate {
    /// Creates a gate with no peer registry.
    ///
    /// Until [`with_peer_registry`](Self::with_peer_registry) is called no
    /// caller is ever treated as a peer.
    pub fn new(
        address_book: AddressBookInfo,
        backend: Arc<dyn CardBackend>,
        config: Arc<dyn AppConfig>,
    ) -> Self {
        let directory = Arc::new(PlainDirectory::new(address_book.clone(), backend.clone()));
        Self {
            address_book,
            backend,
            config,
            directory,
            peers: None,
        }
    }

    /// Sets the registry trusted peers are looked up in.
    pub fn with_peer_registry(mut self, peers: Arc<dyn PeerRegistry>) -> Self {
        self.peers = Some(peers);
        self
    }

    /// Replaces the directory non-peer callers are delegated to.
    pub fn with_directory(mut self, directory: Arc<dyn ContactDirectory>) -> Self {
        self.directory = directory;
        self
    }

    /// The address book this gate serves.
    pub fn address_book(&self) -> &AddressBookInfo {
        &self.address_book
    }

    /// Lists the directory, or nothing if enumeration is restricted.
    ///
    /// The enumeration flags apply to every caller, trusted or not. A
    /// trusted peer gets every card redacted, with undisclosable cards
    /// left out as in [`fetch_many`](Self::fetch_many).
    pub fn list_all(
        &self,
        caller: Option<&Credential>,
    ) -> Result<Vec<ContactRecord>, DirectoryError> {
        let policy = EnumerationPolicy::load(self.config.as_ref())?;
        if !policy.allows_listing() {
            tracing::debug!(?policy, "directory enumeration disabled");
            return Ok(Vec::new());
        }

        if !self.is_trusted_peer(caller)? {
            return self.directory.list_all(caller);
        }

        let cards = self.backend.list_cards(self.address_book.id)?;
        Ok(self.visible(cards, "federated listing"))
    }

    /// Fetches one card.
    ///
    /// # Errors
    ///
    /// For a trusted peer: `NotFound` if storage has no such card,
    /// `Forbidden` if the card exists but cannot be disclosed after
    /// redaction. Other callers get the wrapped directory's errors.
    pub fn fetch_one(
        &self,
        caller: Option<&Credential>,
        name: &str,
    ) -> Result<ContactRecord, DirectoryError> {
        if !self.is_trusted_peer(caller)? {
            return self.directory.fetch_one(caller, name);
        }

        match self.disclose(name)? {
            Disclosure::Visible(record) => Ok(record),
            Disclosure::NotFound => Err(DirectoryError::NotFound(name.to_string())),
            Disclosure::Forbidden => Err(DirectoryError::Forbidden(name.to_string())),
        }
    }

    /// Fetches every existing card among `names`.
    ///
    /// For a trusted peer, cards that cannot be disclosed after redaction
    /// are left out of the result rather than failing the whole batch.
    pub fn fetch_many(
        &self,
        caller: Option<&Credential>,
        names: &[String],
    ) -> Result<Vec<ContactRecord>, DirectoryError> {
        if !self.is_trusted_peer(caller)? {
            return self.directory.fetch_many(caller, names);
        }

        let cards = self
            .backend
            .get_multiple_cards(self.address_book.id, names)?;
        Ok(self.visible(cards, "federated multiget"))
    }

    /// Returns the changes since `sync_token`.
    ///
    /// Returns `Ok(None)` when storage has no change tracking. For a
    /// trusted peer, added or modified cards the peer cannot fetch are
    /// reported as deleted.
    ///
    /// # Errors
    ///
    /// `UnsupportedLimitOnInitialSync` if a limit is combined with an
    /// absent token, whoever the caller is.
    pub fn get_changes(
        &self,
        caller: Option<&Credential>,
        sync_token: Option<&str>,
        sync_level: u32,
        limit: Option<u32>,
    ) -> Result<Option<ChangeSet>, DirectoryError> {
        let initial = sync_token.map_or(true, str::is_empty);
        if initial && limit.is_some_and(|l| l > 0) {
            return Err(DirectoryError::UnsupportedLimitOnInitialSync);
        }

        let Some(sync) = self.backend.sync_support() else {
            return Ok(None);
        };

        if !self.is_trusted_peer(caller)? {
            return self.directory.get_changes(caller, sync_token, sync_level, limit);
        }

        let changes =
            sync.get_changes_for_address_book(self.address_book.id, sync_token, sync_level, limit)?;
        let reconciled = reconcile(changes, |id| self.disclose(id))?;

        tracing::debug!(
            added = reconciled.added.len(),
            modified = reconciled.modified.len(),
            deleted = reconciled.deleted.len(),
            "reconciled change set for federated peer"
        );
        Ok(Some(reconciled))
    }

    fn is_trusted_peer(&self, caller: Option<&Credential>) -> Result<bool, BackendError> {
        let Some(registry) = &self.peers else {
            return Ok(false);
        };
        // Only a `system` login with a secret can match; skip the registry
        // read for everyone else.
        let Some(credential) =
            caller.filter(|c| c.username == SYSTEM_USERNAME && c.secret.is_some())
        else {
            return Ok(false);
        };

        let trusted = is_federated_peer(Some(credential), &registry.list_peers()?);
        if !trusted {
            tracing::debug!("system credential matches no trusted peer, using plain directory");
        }
        Ok(trusted)
    }

    fn visible(&self, cards: Vec<StoredCard>, context: &'static str) -> Vec<ContactRecord> {
        let found = cards.len();
        let records: Vec<ContactRecord> = cards
            .into_iter()
            .filter_map(|card| match self.redacted(card) {
                Disclosure::Visible(record) => Some(record),
                _ => None,
            })
            .collect();

        if records.len() < found {
            tracing::debug!(
                withheld = found - records.len(),
                returned = records.len(),
                context,
                "omitted undisclosable cards"
            );
        }
        records
    }

    fn disclose(&self, name: &str) -> Result<Disclosure, BackendError> {
        match self.backend.get_card(self.address_book.id, name)? {
            Some(card) => Ok(self.redacted(card)),
            None => Ok(Disclosure::NotFound),
        }
    }

    fn redacted(&self, card: StoredCard) -> Disclosure {
        let record = ContactRecord {
            id: card.uri,
            raw_data: card.card_data,
            acl: self.address_book.child_acl(),
        };
        match redact(&record) {
            Ok(redacted) => Disclosure::Visible(redacted),
            Err(e) => {
                tracing::debug!(card = %record.id, error = %e, "card withheld from federated peer");
                Disclosure::Forbidden
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_types::{PeerStatus, Privilege, SyncSupport, TrustedPeer};
    use roster_vcard::VCard;
    use std::collections::{BTreeMap, HashMap};
    use std::sync::Mutex;

    const FN_LOCAL: &str = "BEGIN:VCARD\r\nVERSION:4.0\r\nUID:a\r\nFN;X-NC-SCOPE=v2-local:Alice\r\nEMAIL:alice@example.org\r\nEND:VCARD\r\n";
    const EMAIL_LOCAL: &str = "BEGIN:VCARD\r\nVERSION:4.0\r\nUID:b\r\nFN:Bob\r\nEMAIL;X-NC-SCOPE=v2-local:bob@example.org\r\nEND:VCARD\r\n";
    const PLAIN: &str = "BEGIN:VCARD\r\nVERSION:4.0\r\nUID:c\r\nFN:Carol\r\nEND:VCARD\r\n";

    struct FakeBackend {
        cards: Mutex<BTreeMap<String, Vec<u8>>>,
        changes: Option<ChangeSet>,
        reads: Mutex<Vec<String>>,
    }

    impl FakeBackend {
        fn new(cards: &[(&str, &str)]) -> Self {
            Self {
                cards: Mutex::new(
                    cards
                        .iter()
                        .map(|(k, v)| (k.to_string(), v.as_bytes().to_vec()))
                        .collect(),
                ),
                changes: None,
                reads: Mutex::new(Vec::new()),
            }
        }

        fn with_changes(mut self, changes: ChangeSet) -> Self {
            self.changes = Some(changes);
            self
        }

        fn stored(&self, uri: &str) -> Option<StoredCard> {
            self.reads.lock().unwrap().push(uri.to_string());
            self.cards.lock().unwrap().get(uri).map(|data| StoredCard {
                uri: uri.to_string(),
                card_data: data.clone(),
            })
        }
    }

    impl CardBackend for FakeBackend {
        fn get_card(&self, _: i64, uri: &str) -> Result<Option<StoredCard>, BackendError> {
            Ok(self.stored(uri))
        }

        fn get_multiple_cards(&self, _: i64, uris: &[String]) -> Result<Vec<StoredCard>, BackendError> {
            let mut uris = uris.to_vec();
            uris.sort();
            uris.dedup();
            Ok(uris.iter().filter_map(|u| self.stored(u)).collect())
        }

        fn list_cards(&self, _: i64) -> Result<Vec<StoredCard>, BackendError> {
            let uris: Vec<String> = self.cards.lock().unwrap().keys().cloned().collect();
            Ok(uris.iter().filter_map(|u| self.stored(u)).collect())
        }

        fn sync_support(&self) -> Option<&dyn SyncSupport> {
            self.changes.as_ref().map(|_| self as &dyn SyncSupport)
        }
    }

    impl SyncSupport for FakeBackend {
        fn get_changes_for_address_book(
            &self,
            _: i64,
            _: Option<&str>,
            _: u32,
            _: Option<u32>,
        ) -> Result<ChangeSet, BackendError> {
            Ok(self.changes.clone().unwrap_or_default())
        }
    }

    #[derive(Default)]
    struct FakePeers {
        peers: Mutex<Vec<TrustedPeer>>,
        reads: Mutex<usize>,
    }

    impl FakePeers {
        fn with_secret(secret: &str) -> Self {
            let peers = Self::default();
            peers.add(secret);
            peers
        }

        fn add(&self, secret: &str) {
            self.peers.lock().unwrap().push(TrustedPeer {
                url: "https://peer.example".to_string(),
                shared_secret: secret.to_string(),
                status: PeerStatus::Ok,
            });
        }
    }

    impl PeerRegistry for FakePeers {
        fn list_peers(&self) -> Result<Vec<TrustedPeer>, BackendError> {
            *self.reads.lock().unwrap() += 1;
            Ok(self.peers.lock().unwrap().clone())
        }
    }

    #[derive(Default)]
    struct FakeConfig(Mutex<HashMap<String, String>>);

    impl FakeConfig {
        fn set(&self, key: &str, value: &str) {
            self.0
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
        }
    }

    impl AppConfig for FakeConfig {
        fn get_app_value(&self, _: &str, key: &str, default: &str) -> Result<String, BackendError> {
            Ok(self
                .0
                .lock()
                .unwrap()
                .get(key)
                .cloned()
                .unwrap_or_else(|| default.to_string()))
        }
    }

    /// Stands in for the non-federated directory and records every call.
    #[derive(Default)]
    struct RecordingDirectory {
        calls: Mutex<Vec<String>>,
    }

    impl RecordingDirectory {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ContactDirectory for RecordingDirectory {
        fn list_all(
            &self,
            _: Option<&Credential>,
        ) -> Result<Vec<ContactRecord>, DirectoryError> {
            self.calls.lock().unwrap().push("list_all".to_string());
            Ok(Vec::new())
        }

        fn fetch_one(
            &self,
            _: Option<&Credential>,
            name: &str,
        ) -> Result<ContactRecord, DirectoryError> {
            self.calls.lock().unwrap().push(format!("fetch_one:{name}"));
            Err(DirectoryError::NotFound(name.to_string()))
        }

        fn fetch_many(
            &self,
            _: Option<&Credential>,
            names: &[String],
        ) -> Result<Vec<ContactRecord>, DirectoryError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("fetch_many:{}", names.join(",")));
            Ok(Vec::new())
        }

        fn get_changes(
            &self,
            _: Option<&Credential>,
            sync_token: Option<&str>,
            _: u32,
            _: Option<u32>,
        ) -> Result<Option<ChangeSet>, DirectoryError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("get_changes:{}", sync_token.unwrap_or("")));
            Ok(Some(ChangeSet::default()))
        }
    }

    fn address_book() -> AddressBookInfo {
        AddressBookInfo {
            id: 1,
            uri: "system".to_string(),
            principal_uri: "principals/system/system".to_string(),
            display_name: None,
        }
    }

    struct Harness {
        gate: FederatedAccessGate,
        backend: Arc<FakeBackend>,
        peers: Arc<FakePeers>,
        config: Arc<FakeConfig>,
        directory: Arc<RecordingDirectory>,
    }

    fn harness(backend: FakeBackend, peers: FakePeers) -> Harness {
        let backend = Arc::new(backend);
        let peers = Arc::new(peers);
        let config = Arc::new(FakeConfig::default());
        let directory = Arc::new(RecordingDirectory::default());
        let gate = FederatedAccessGate::new(address_book(), backend.clone(), config.clone())
            .with_peer_registry(peers.clone())
            .with_directory(directory.clone());
        Harness {
            gate,
            backend,
            peers,
            config,
            directory,
        }
    }

    fn standard_cards() -> FakeBackend {
        FakeBackend::new(&[("a", FN_LOCAL), ("b", EMAIL_LOCAL), ("c", PLAIN)])
    }

    fn peer() -> Credential {
        Credential::new("system", "s3cret")
    }

    #[test]
    fn unknown_secret_takes_the_plain_path() {
        let h = harness(standard_cards(), FakePeers::with_secret("s3cret"));
        let stranger = Credential::new("system", "secretX");

        let err = h.gate.fetch_one(Some(&stranger), "missing").unwrap_err();
        assert!(matches!(err, DirectoryError::NotFound(ref n) if n == "missing"));
        assert_eq!(h.directory.calls(), ["fetch_one:missing"]);
        assert!(h.backend.reads.lock().unwrap().is_empty());
    }

    #[test]
    fn non_system_callers_never_consult_the_registry() {
        let h = harness(standard_cards(), FakePeers::with_secret("s3cret"));
        let user = Credential::new("alice", "s3cret");

        let _ = h.gate.fetch_one(Some(&user), "a");
        let _ = h.gate.fetch_one(None, "a");
        assert_eq!(*h.peers.reads.lock().unwrap(), 0);
        assert_eq!(h.directory.calls(), ["fetch_one:a", "fetch_one:a"]);
    }

    #[test]
    fn without_registry_everyone_takes_the_plain_path() {
        let directory = Arc::new(RecordingDirectory::default());
        let gate = FederatedAccessGate::new(
            address_book(),
            Arc::new(standard_cards()),
            Arc::new(FakeConfig::default()),
        )
        .with_directory(directory.clone());

        let _ = gate.fetch_one(Some(&peer()), "b");
        assert_eq!(directory.calls(), ["fetch_one:b"]);
    }

    #[test]
    fn local_only_identity_is_forbidden_to_peers() {
        let h = harness(standard_cards(), FakePeers::with_secret("s3cret"));
        let err = h.gate.fetch_one(Some(&peer()), "a").unwrap_err();
        assert!(matches!(err, DirectoryError::Forbidden(ref n) if n == "a"));
    }

    #[test]
    fn local_email_is_redacted_for_peers() {
        let h = harness(standard_cards(), FakePeers::with_secret("s3cret"));
        let record = h.gate.fetch_one(Some(&peer()), "b").unwrap();

        let card = VCard::parse(&record.raw_data).unwrap();
        assert!(card.get("EMAIL").is_none());
        assert_eq!(card.get("FN").map(|p| p.value.as_str()), Some("Bob"));
        assert_eq!(record.id, "b");
        assert_eq!(record.acl[0].privilege, Privilege::Read);
        assert_eq!(record.acl[0].principal, "principals/system/system");
        assert!(h.directory.calls().is_empty());
    }

    #[test]
    fn missing_card_is_not_found_for_peers() {
        let h = harness(standard_cards(), FakePeers::with_secret("s3cret"));
        let err = h.gate.fetch_one(Some(&peer()), "zzz").unwrap_err();
        assert!(matches!(err, DirectoryError::NotFound(_)));
    }

    #[test]
    fn peer_added_mid_session_is_trusted_on_next_call() {
        let h = harness(standard_cards(), FakePeers::default());
        let _ = h.gate.fetch_one(Some(&peer()), "b");
        assert_eq!(h.directory.calls(), ["fetch_one:b"]);

        h.peers.add("s3cret");
        assert!(h.gate.fetch_one(Some(&peer()), "b").is_ok());
        assert_eq!(h.directory.calls().len(), 1);
    }

    #[test]
    fn multiget_drops_undisclosable_cards() {
        let h = harness(standard_cards(), FakePeers::with_secret("s3cret"));
        let names: Vec<String> = ["c", "a", "b", "nope"].iter().map(|s| s.to_string()).collect();

        let records = h.gate.fetch_many(Some(&peer()), &names).unwrap();
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["b", "c"]);
        for record in &records {
            let card = VCard::parse(&record.raw_data).unwrap();
            assert!(card
                .properties
                .iter()
                .all(|p| p.param("X-NC-SCOPE") != Some("v2-local")));
        }

        let again = h.gate.fetch_many(Some(&peer()), &names).unwrap();
        assert_eq!(again, records, "same input should give the same output");
    }

    #[test]
    fn multiget_delegates_for_non_peers() {
        let h = harness(standard_cards(), FakePeers::with_secret("s3cret"));
        let names = vec!["a".to_string(), "b".to_string()];
        h.gate.fetch_many(None, &names).unwrap();
        assert_eq!(h.directory.calls(), ["fetch_many:a,b"]);
    }

    #[test]
    fn limit_without_token_is_rejected_for_everyone() {
        let changes = ChangeSet::default();
        let h = harness(
            standard_cards().with_changes(changes),
            FakePeers::with_secret("s3cret"),
        );
        for caller in [None, Some(peer())] {
            for token in [None, Some("")] {
                let err = h
                    .gate
                    .get_changes(caller.as_ref(), token, 1, Some(10))
                    .unwrap_err();
                assert!(matches!(err, DirectoryError::UnsupportedLimitOnInitialSync));
            }
        }
        assert!(h.directory.calls().is_empty());
    }

    #[test]
    fn zero_limit_counts_as_no_limit() {
        let h = harness(
            standard_cards().with_changes(ChangeSet::default()),
            FakePeers::with_secret("s3cret"),
        );
        assert!(h.gate.get_changes(None, None, 1, Some(0)).is_ok());
    }

    #[test]
    fn missing_sync_support_yields_none() {
        let h = harness(standard_cards(), FakePeers::with_secret("s3cret"));
        assert!(h.gate.get_changes(Some(&peer()), Some("5"), 1, None).unwrap().is_none());
        assert!(h.gate.get_changes(None, Some("5"), 1, None).unwrap().is_none());
        assert!(h.directory.calls().is_empty());
    }

    #[test]
    fn peer_sync_reports_undisclosable_cards_as_deleted() {
        let changes = ChangeSet {
            sync_token: "42".to_string(),
            added: vec!["a".to_string(), "b".to_string()],
            modified: vec!["c".to_string()],
            deleted: vec!["d".to_string()],
        };
        let h = harness(
            standard_cards().with_changes(changes),
            FakePeers::with_secret("s3cret"),
        );

        let out = h
            .gate
            .get_changes(Some(&peer()), Some("40"), 1, None)
            .unwrap()
            .expect("sync is supported");
        assert_eq!(out.added, ["b"]);
        assert_eq!(out.modified, ["c"]);
        assert_eq!(out.deleted, ["d", "a"]);
        assert_eq!(out.sync_token, "42");
        assert!(!h.backend.reads.lock().unwrap().contains(&"d".to_string()));
    }

    #[test]
    fn non_peer_sync_is_delegated() {
        let h = harness(
            standard_cards().with_changes(ChangeSet::default()),
            FakePeers::with_secret("s3cret"),
        );
        h.gate.get_changes(None, Some("3"), 1, None).unwrap();
        assert_eq!(h.directory.calls(), ["get_changes:3"]);
    }

    #[test]
    fn listing_follows_enumeration_flags_for_every_caller() {
        let h = harness(standard_cards(), FakePeers::with_secret("s3cret"));

        h.gate.list_all(None).unwrap();
        assert_eq!(h.directory.calls(), ["list_all"]);

        for (key, value) in [
            ("shareapi_allow_share_dialog_user_enumeration", "no"),
            ("shareapi_restrict_user_enumeration_to_group", "yes"),
            ("shareapi_restrict_user_enumeration_to_phone", "yes"),
        ] {
            let h = harness(standard_cards(), FakePeers::with_secret("s3cret"));
            h.config.set(key, value);
            assert!(h.gate.list_all(None).unwrap().is_empty());
            assert!(h.gate.list_all(Some(&peer())).unwrap().is_empty());
            assert!(h.directory.calls().is_empty(), "{key} should block listing");
            assert!(h.backend.reads.lock().unwrap().is_empty());
        }
    }

    #[test]
    fn enumeration_flags_are_reread_on_every_call() {
        let h = harness(standard_cards(), FakePeers::with_secret("s3cret"));
        h.config
            .set("shareapi_restrict_user_enumeration_to_phone", "yes");
        h.gate.list_all(None).unwrap();
        assert!(h.directory.calls().is_empty());

        h.config
            .set("shareapi_restrict_user_enumeration_to_phone", "no");
        h.gate.list_all(None).unwrap();
        assert_eq!(h.directory.calls(), ["list_all"]);
    }

    #[test]
    fn peer_listing_is_redacted() {
        let h = harness(standard_cards(), FakePeers::with_secret("s3cret"));

        let records = h.gate.list_all(Some(&peer())).unwrap();
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["b", "c"]);
        for record in &records {
            let text = String::from_utf8(record.raw_data.clone()).unwrap();
            assert!(!text.contains("X-NC-SCOPE"), "{text}");
            assert!(!text.contains("@example.org"), "{text}");
        }
        assert!(h.directory.calls().is_empty());
    }

    #[test]
    fn plain_directory_lists_raw_cards_for_local_users() {
        let gate = FederatedAccessGate::new(
            address_book(),
            Arc::new(standard_cards()),
            Arc::new(FakeConfig::default()),
        );
        let alice = Credential::new("alice", "pw");
        let records = gate.list_all(Some(&alice)).unwrap();
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert_eq!(records[1].raw_data, EMAIL_LOCAL.as_bytes());
    }

    #[test]
    fn untrusted_system_login_gets_no_raw_cards() {
        let gate = FederatedAccessGate::new(
            address_book(),
            Arc::new(standard_cards()),
            Arc::new(FakeConfig::default()),
        )
        .with_peer_registry(Arc::new(FakePeers::with_secret("s3cret")));
        let stranger = Credential::new("system", "guess");

        assert!(matches!(
            gate.fetch_one(Some(&stranger), "b"),
            Err(DirectoryError::Forbidden(_))
        ));
        assert!(matches!(
            gate.list_all(Some(&stranger)),
            Err(DirectoryError::Forbidden(_))
        ));
        assert!(matches!(
            gate.fetch_many(None, &["b".to_string()]),
            Err(DirectoryError::Unauthenticated)
        ));
    }
}
