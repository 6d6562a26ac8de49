//! Test utilities & fixtures.
//! The fixture catalog lives under `tests/test-data-int`; progress state always goes to a
//! temp dir so tests never share a state file.

use stardew_savant::bot::CommandProcessor;
use stardew_savant::catalog::{BundleIndex, Catalog};
use stardew_savant::config::{CatalogConfig, Config, StorageConfig};
use stardew_savant::progress::ProgressStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[allow(dead_code)]
pub const GUILD: u64 = 4242;
#[allow(dead_code)]
pub const OTHER_GUILD: u64 = 777;

/// Return the path to the static integration test fixture directory.
#[allow(dead_code)]
pub fn fixture_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("test-data-int")
}

#[allow(dead_code)]
pub fn fixture_catalog_config() -> CatalogConfig {
    CatalogConfig::in_dir(fixture_root().to_string_lossy().into_owned())
}

#[allow(dead_code)]
pub fn fixture_catalog() -> Arc<Catalog> {
    Arc::new(Catalog::load(&fixture_catalog_config()).expect("fixture catalog loads"))
}

/// Config pointing at the fixture catalog with state under `state_dir`.
#[allow(dead_code)]
pub fn test_config(state_dir: &Path) -> Config {
    let mut config = Config::default();
    config.catalog = fixture_catalog_config();
    config.storage = StorageConfig {
        data_dir: state_dir.to_string_lossy().into_owned(),
        state_file: "bundles_state.json".into(),
        backup_corrupt_state: true,
    };
    config.logging.file = None;
    config
}

/// A fresh store over the fixture catalog, with its state file inside `dir`.
#[allow(dead_code)]
pub fn store_in(dir: &Path) -> ProgressStore {
    let catalog = fixture_catalog();
    let index = Arc::new(BundleIndex::build(&catalog));
    ProgressStore::new(dir.join("bundles_state.json"), catalog, index)
}

#[allow(dead_code)]
pub fn processor_in(dir: &Path) -> CommandProcessor {
    CommandProcessor::from_config(&test_config(dir)).expect("processor builds")
}

#[allow(dead_code)]
pub fn read_state(dir: &Path) -> serde_json::Value {
    let raw = std::fs::read_to_string(dir.join("bundles_state.json")).expect("state file exists");
    serde_json::from_str(&raw).expect("state file is JSON")
}
