mod common;

use common::fixture_catalog;
use stardew_savant::catalog::index::{build_bundle_location_index, build_item_to_bundles_index};
use stardew_savant::catalog::{BundleIndex, BundleLocation, Catalog};

fn catalog_from(community_json: &str) -> Catalog {
    Catalog {
        community: serde_json::from_str(community_json).unwrap(),
        ..Catalog::default()
    }
}

#[test]
fn every_bundle_is_locatable_by_any_case() {
    let catalog = fixture_catalog();
    let index = BundleIndex::build(&catalog);
    assert_eq!(index.bundle_count(), catalog.bundle_count());

    for (room, bundle, _) in catalog.bundles() {
        let upper = bundle.to_uppercase();
        assert_eq!(index.locate_bundle(&upper), Some(&BundleLocation::new(room, bundle)));
    }
    assert_eq!(index.locate_bundle("Bundle Of Nothing"), None);
}

#[test]
fn items_list_every_bundle_in_catalog_order() {
    let index = BundleIndex::build(&fixture_catalog());
    assert_eq!(
        index.bundles_for_item("maple syrup"),
        &[
            BundleLocation::new("Crafts Room", "Exotic Foraging Bundle"),
            BundleLocation::new("Bulletin Board", "Chef's Bundle"),
        ]
    );
    assert_eq!(
        index.bundles_for_item(" CHERRY "),
        &[BundleLocation::new("Pantry", "Artisan Bundle")]
    );
    assert!(index.bundles_for_item("Prismatic Shard").is_empty());
}

#[test]
fn colliding_bundle_names_resolve_to_the_later_room() {
    let catalog = catalog_from(
        r#"{
            "Pantry": { "Bundles": { "Mystery Bundle": { "items": { "Egg": false }, "amount": 1 } } },
            "Vault": { "Bundles": { "mystery bundle": { "items": { "Gold": false }, "amount": 1 } } }
        }"#,
    );
    let locations = build_bundle_location_index(&catalog);
    assert_eq!(locations.len(), 1);
    assert_eq!(
        locations.get("mystery bundle"),
        Some(&BundleLocation::new("Vault", "mystery bundle"))
    );

    let items = build_item_to_bundles_index(&catalog);
    assert_eq!(items["egg"], vec![BundleLocation::new("Pantry", "Mystery Bundle")]);
    assert_eq!(items["gold"], vec![BundleLocation::new("Vault", "mystery bundle")]);
}

#[test]
fn empty_catalog_builds_empty_index() {
    let index = BundleIndex::build(&Catalog::default());
    assert_eq!(index.bundle_count(), 0);
    assert!(index.locate_bundle("Artisan Bundle").is_none());
}
