use allowlist_vault::entries::{EntryStore, MemoryEntryStore, NewEntry};
use allowlist_vault::migration::reseal_all;
use allowlist_vault::vault::{
    KeyMaterial, KeyRing, OpenedToken, StoredToken, Vault, open, open_with_rotation,
};

fn entry(username: &str, token: StoredToken) -> NewEntry {
    NewEntry {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        panel_url: "https://panel".to_string(),
        token,
        active: true,
        external_id: None,
    }
}

/// Full key lifecycle:
/// deploy K1 -> rotate to K2 (K1 previous) -> reseal -> retire K1.
#[tokio::test]
async fn qa_tc_key_rotation_lifecycle() {
    let k1 = KeyMaterial::generate();
    let k2 = KeyMaterial::generate();
    let store = MemoryEntryStore::new();

    // Phase 1: K1 only
    let phase1 = Vault::new(KeyRing::new(Some(k1.clone()), None));
    let stored = phase1.seal_token("s3cret").unwrap();
    assert!(stored.is_sealed());
    let created = store.insert(entry("ana", stored)).await.unwrap();

    // Phase 2: K2 current, K1 previous. Old value still opens.
    let phase2 = Vault::new(KeyRing::new(Some(k2.clone()), Some(k1.clone())));
    let fetched = store.get(created.id).await.unwrap().unwrap();
    assert_eq!(
        phase2.open_token(&fetched.token),
        OpenedToken::Recovered("s3cret".to_string())
    );

    // New writes land under K2 only
    let fresh = phase2.seal_token("fresh").unwrap();
    let StoredToken::Sealed(fresh_sealed) = &fresh else {
        panic!("keyed vault must seal");
    };
    assert_eq!(open(fresh_sealed, &k2).unwrap(), "fresh");
    assert!(open(fresh_sealed, &k1).is_err());
    store.insert(entry("bob", fresh)).await.unwrap();

    // Retiring K1 now would lose ana's token
    let StoredToken::Sealed(old_sealed) = &fetched.token else {
        panic!("expected sealed token");
    };
    assert_eq!(
        open_with_rotation(old_sealed, Some(&k2), None),
        OpenedToken::Unrecoverable
    );

    // Phase 3: re-seal everything under K2
    let report = reseal_all(&store, &phase2).await.unwrap();
    assert_eq!(report.scanned, 2);
    assert_eq!(report.resealed, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.unrecoverable, 0);

    // Phase 4: K1 retired, every token still opens
    let phase4 = Vault::new(KeyRing::new(Some(k2), None));
    for id in [1, 2] {
        let e = store.get(id).await.unwrap().unwrap();
        assert!(phase4.open_token(&e.token).is_recovered(), "entry {id}");
    }
}

/// Unkeyed deployment stores plain; enabling a key hides those values until
/// the explicit re-seal migration runs.
#[tokio::test]
async fn qa_tc_plain_to_keyed_migration() {
    let store = MemoryEntryStore::new();

    let unkeyed = Vault::default();
    let stored = unkeyed.seal_token("legacy").unwrap();
    assert!(!stored.is_sealed());
    store.insert(entry("old", stored)).await.unwrap();

    let keyed = Vault::new(KeyRing::new(Some(KeyMaterial::generate()), None));
    let before = store.get(1).await.unwrap().unwrap();
    assert_eq!(keyed.open_token(&before.token), OpenedToken::Unrecoverable);

    let report = reseal_all(&store, &keyed).await.unwrap();
    assert_eq!(report.resealed, 1);

    let after = store.get(1).await.unwrap().unwrap();
    assert!(after.token.is_sealed());
    assert_eq!(
        keyed.open_token(&after.token),
        OpenedToken::Recovered("legacy".to_string())
    );
}

/// A token sealed under a key nobody holds reads as null, not an error.
#[test]
fn qa_tc_foreign_key_is_unrecoverable() {
    let owner = Vault::new(KeyRing::new(Some(KeyMaterial::generate()), None));
    let stored = owner.seal_token("mine").unwrap();

    let other = Vault::new(KeyRing::new(
        Some(KeyMaterial::generate()),
        Some(KeyMaterial::generate()),
    ));
    let opened = other.open_token(&stored);
    assert_eq!(opened, OpenedToken::Unrecoverable);
    assert_eq!(serde_json::to_value(&opened).unwrap(), serde_json::Value::Null);
}
