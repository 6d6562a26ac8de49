mod common;

use common::{fixture_catalog, read_state, store_in, GUILD, OTHER_GUILD};
use stardew_savant::progress::{heal_guild, ProgressError, StoreState};
use std::sync::Arc;
use tokio_test::assert_ok;

#[test]
fn healing_twice_is_a_no_op() {
    let catalog = fixture_catalog();
    let mut state = StoreState::default();
    assert!(heal_guild(&catalog, &mut state, GUILD));
    let once = state.clone();
    assert!(!heal_guild(&catalog, &mut state, GUILD));
    assert_eq!(state, once);

    let guild = state.guild(GUILD).unwrap();
    assert_eq!(guild.len(), catalog.community.len());
    for (room, bundle_name, bundle) in catalog.bundles() {
        let progress = &guild[room][bundle_name];
        assert_eq!(progress.items.len(), bundle.items.len());
        assert!(progress.items.values().all(|v| !v));
    }
}

#[test]
fn healing_keeps_existing_values_and_unknown_keys() {
    let catalog = fixture_catalog();
    let raw = format!(
        r#"{{"{GUILD}":{{
            "Pantry":{{"Artisan Bundle":{{"items":{{"Cherry":true,"Old Item":true}}}}}},
            "Boiler Room":{{"Blacksmith's Bundle":{{"items":{{"Gold Bar":true}}}}}}
        }}}}"#
    );
    let mut state: StoreState = serde_json::from_str(&raw).unwrap();
    assert!(heal_guild(&catalog, &mut state, GUILD));

    let guild = state.guild(GUILD).unwrap();
    let artisan = &guild["Pantry"]["Artisan Bundle"];
    assert!(artisan.is_checked("Cherry"));
    assert!(artisan.is_checked("Old Item"));
    assert_eq!(artisan.items.get("Apple"), Some(&false));
    assert!(guild["Boiler Room"]["Blacksmith's Bundle"].is_checked("Gold Bar"));
    assert!(guild.contains_key("Vault"));
}

#[tokio::test]
async fn missing_state_file_heals_and_saves_once() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(dir.path());
    assert!(!store.path().exists());

    let guild = assert_ok!(store.get_or_init_guild(GUILD).await);
    assert_eq!(guild["Pantry"]["Artisan Bundle"].items.len(), 12);
    assert!(store.path().exists());

    let before = std::fs::read_to_string(store.path()).unwrap();
    assert_ok!(store.get_or_init_guild(GUILD).await);
    assert_eq!(std::fs::read_to_string(store.path()).unwrap(), before);
}

#[tokio::test]
async fn check_then_uncheck_restores_state() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(dir.path());
    assert_ok!(store.get_or_init_guild(GUILD).await);
    let baseline = read_state(dir.path());

    let location = assert_ok!(store.set_item(GUILD, "Artisan Bundle", "Cherry", true).await);
    assert_eq!(location.room, "Pantry");
    assert_eq!(location.bundle, "Artisan Bundle");
    assert_eq!(
        read_state(dir.path())[GUILD.to_string()]["Pantry"]["Artisan Bundle"]["items"]["Cherry"],
        serde_json::Value::Bool(true)
    );

    assert_ok!(store.set_item(GUILD, "Artisan Bundle", "Cherry", false).await);
    assert_eq!(read_state(dir.path()), baseline);
}

#[tokio::test]
async fn names_resolve_case_insensitively_to_canonical_keys() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(dir.path());

    let location = assert_ok!(store.set_item(GUILD, "  artisan BUNDLE ", "cHeRrY", true).await);
    assert_eq!(location.bundle, "Artisan Bundle");

    let state = read_state(dir.path());
    let items = &state[GUILD.to_string()]["Pantry"]["Artisan Bundle"]["items"];
    assert_eq!(items["Cherry"], serde_json::Value::Bool(true));
    assert!(items.get("cHeRrY").is_none());
}

#[tokio::test]
async fn unknown_bundle_or_item_never_touches_storage() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(dir.path());

    let err = store.set_item(GUILD, "Nonexistent Bundle", "X", true).await.unwrap_err();
    assert!(matches!(err, ProgressError::BundleNotFound(ref b) if b == "Nonexistent Bundle"));
    assert!(!store.path().exists(), "a rejected command must not create the state file");

    let err = store.set_item(GUILD, "Artisan Bundle", "Diamond", true).await.unwrap_err();
    match err {
        ProgressError::ItemNotFound { item, bundle } => {
            assert_eq!(item, "Diamond");
            assert_eq!(bundle, "Artisan Bundle");
        }
        other => panic!("expected ItemNotFound, got {:?}", other),
    }
    assert!(!store.path().exists());

    assert_ok!(store.get_or_init_guild(OTHER_GUILD).await);
    let before = std::fs::read_to_string(store.path()).unwrap();
    assert!(store.set_item(GUILD, "Artisan Bundle", "Diamond", true).await.is_err());
    assert_eq!(std::fs::read_to_string(store.path()).unwrap(), before);
    assert_eq!(store.guild_count().await, 1);
}

#[tokio::test]
async fn reset_clears_only_the_requested_guild() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(dir.path());
    for item in ["Cherry", "Apple", "Honey"] {
        assert_ok!(store.set_item(GUILD, "Artisan Bundle", item, true).await);
    }
    assert_ok!(store.set_item(OTHER_GUILD, "Chef's Bundle", "Maple Syrup", true).await);

    let fresh = assert_ok!(store.reset_guild(GUILD).await);
    assert!(fresh
        .values()
        .flat_map(|room| room.values())
        .all(|bundle| bundle.checked_count() == 0));
    assert_eq!(fresh, assert_ok!(store.get_or_init_guild(GUILD).await));

    let other = assert_ok!(store.get_or_init_guild(OTHER_GUILD).await);
    assert!(other["Bulletin Board"]["Chef's Bundle"].is_checked("Maple Syrup"));
    assert_eq!(store.guild_count().await, 2);
}

#[tokio::test]
async fn corrupt_state_is_backed_up_and_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(dir.path());
    std::fs::write(store.path(), "{ this is not json").unwrap();

    let guild = assert_ok!(store.get_or_init_guild(GUILD).await);
    assert!(guild.contains_key("Pantry"));

    let backups: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with("bundles_state.json.corrupt-"))
        .collect();
    assert_eq!(backups.len(), 1, "found {:?}", backups);
    let saved = std::fs::read_to_string(dir.path().join(&backups[0])).unwrap();
    assert_eq!(saved, "{ this is not json");
    assert!(read_state(dir.path()).get(GUILD.to_string()).is_some());
}

#[tokio::test]
async fn invalid_utf8_state_is_backed_up_like_any_corrupt_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(dir.path());
    let original: Vec<u8> = b"{\"4242\":{\"Pantry\":\"caf\xE9\"}}".to_vec();
    std::fs::write(store.path(), &original).unwrap();

    let guild = assert_ok!(store.get_or_init_guild(GUILD).await);
    assert!(guild.contains_key("Pantry"));

    let backups: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with("bundles_state.json.corrupt-"))
        .collect();
    assert_eq!(backups.len(), 1);
    assert_eq!(std::fs::read(backups[0].path()).unwrap(), original);
}

#[tokio::test]
async fn corrupt_state_without_backup_starts_fresh() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(dir.path()).with_corrupt_backup(false);
    std::fs::write(store.path(), "[1, 2").unwrap();

    assert_eq!(store.load(), StoreState::default());
    assert_ok!(store.set_item(GUILD, "Artisan Bundle", "Cherry", true).await);
    let count = std::fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(count, 1, "only the rewritten state file should remain");
}

#[tokio::test]
async fn leading_nul_bytes_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(dir.path());
    let raw = format!("\0\0{{\"{GUILD}\":{{\"Pantry\":{{\"Artisan Bundle\":{{\"items\":{{\"Cherry\":true}}}}}}}}}}");
    std::fs::write(store.path(), raw).unwrap();

    let guild = assert_ok!(store.get_or_init_guild(GUILD).await);
    assert!(guild["Pantry"]["Artisan Bundle"].is_checked("Cherry"));
}

#[tokio::test]
async fn write_failure_is_reported_not_swallowed() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(dir.path());
    // A directory where the state file should be: reads recover, writes cannot.
    std::fs::create_dir(store.path()).unwrap();

    let err = store.set_item(GUILD, "Artisan Bundle", "Cherry", true).await.unwrap_err();
    assert!(matches!(err, ProgressError::Persistence { .. }), "got {:?}", err);
    assert!(!err.is_not_found());
}

#[tokio::test]
async fn concurrent_checks_do_not_lose_updates() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(store_in(dir.path()));
    let items = [
        "Truffle Oil", "Cloth", "Goat Cheese", "Cheese", "Honey", "Jelly", "Apple", "Apricot", "Orange",
        "Peach", "Pomegranate", "Cherry",
    ];

    let mut handles = Vec::new();
    for item in items {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store.set_item(GUILD, "Artisan Bundle", item, true).await
        }));
    }
    for handle in handles {
        assert_ok!(handle.await.unwrap());
    }

    let guild = assert_ok!(store.get_or_init_guild(GUILD).await);
    assert_eq!(guild["Pantry"]["Artisan Bundle"].checked_count(), items.len());
}

#[tokio::test]
async fn state_file_uses_documented_layout() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(dir.path());
    assert_ok!(store.set_item(GUILD, "2,500g bundle", "2,500G", true).await);

    let state = read_state(dir.path());
    let vault = &state[GUILD.to_string()]["Vault"]["2,500g Bundle"];
    assert_eq!(vault, &serde_json::json!({ "items": { "2,500g": true } }));
}
