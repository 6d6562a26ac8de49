//! Reverse lookups over community center bundles, built once from the catalog.

use super::Catalog;
use log::warn;
use std::collections::HashMap;

/// Where a bundle lives: canonical room and bundle names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BundleLocation {
    pub room: String,
    pub bundle: String,
}

impl BundleLocation {
    pub fn new(room: impl Into<String>, bundle: impl Into<String>) -> Self {
        Self {
            room: room.into(),
            bundle: bundle.into(),
        }
    }
}

/// Lowercase bundle name -> location, and lowercase item name -> every bundle listing it.
#[derive(Debug, Clone, Default)]
pub struct BundleIndex {
    bundle_locations: HashMap<String, BundleLocation>,
    item_bundles: HashMap<String, Vec<BundleLocation>>,
}

impl BundleIndex {
    pub fn build(catalog: &Catalog) -> Self {
        Self {
            bundle_locations: build_bundle_location_index(catalog),
            item_bundles: build_item_to_bundles_index(catalog),
        }
    }

    /// Resolve a bundle name case-insensitively.
    pub fn locate_bundle(&self, name: &str) -> Option<&BundleLocation> {
        self.bundle_locations.get(&name.trim().to_lowercase())
    }

    /// Every bundle that lists `item`, in catalog order. Empty when the item is unknown.
    pub fn bundles_for_item(&self, item: &str) -> &[BundleLocation] {
        self.item_bundles
            .get(&item.trim().to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn bundle_count(&self) -> usize {
        self.bundle_locations.len()
    }
}

/// Bundle names are expected to be unique across rooms. When two rooms define the same
/// name the later one wins; the collision is only logged.
pub fn build_bundle_location_index(catalog: &Catalog) -> HashMap<String, BundleLocation> {
    let mut map = HashMap::new();
    for (room, bundle, _) in catalog.bundles() {
        let loc = BundleLocation::new(room, bundle);
        if let Some(prev) = map.insert(bundle.to_lowercase(), loc) {
            warn!(
                "Bundle name '{}' defined in both '{}' and '{}'; using '{}'",
                bundle, prev.room, room, room
            );
        }
    }
    map
}

pub fn build_item_to_bundles_index(catalog: &Catalog) -> HashMap<String, Vec<BundleLocation>> {
    let mut map: HashMap<String, Vec<BundleLocation>> = HashMap::new();
    for (room, bundle_name, bundle) in catalog.bundles() {
        for item in bundle.item_names() {
            map.entry(item.to_lowercase())
                .or_default()
                .push(BundleLocation::new(room, bundle_name));
        }
    }
    map
}
