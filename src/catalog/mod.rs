//! # Reference Catalog
//!
//! Immutable, preloaded game reference data: villagers, buildings, event calendars, fish,
//! per-season guides, crops, community center bundles and tool/house upgrades.
//!
//! Each category lives in its own JSON document under the catalog data directory. The
//! documents are parsed once at startup into typed records (see [`types`]) held in
//! insertion-ordered [`OrderedTable`]s; lookups are case-insensitive against the canonical
//! keys. Nothing mutates the catalog after [`Catalog::load`] returns.
//!
//! ```text
//! data/
//! ├── townspeople.json     ← villager gifts, birthdays
//! ├── building.json        ← farm building costs
//! ├── events.json          ← season -> day -> events
//! ├── fish.json
//! ├── seasons.json         ← per-season crops/fish/foraging/trees
//! ├── crops.json
//! ├── communitycenter.json ← room -> bundles -> items/amount/reward/image
//! └── upgrades.json        ← tool and house upgrades
//! ```
//!
//! A missing or malformed document is a deployment error and aborts startup.

pub mod index;
pub mod table;
pub mod types;

pub use index::{BundleIndex, BundleLocation};
pub use table::OrderedTable;
pub use types::{Building, Bundle, Crop, EventCalendar, Fish, Room, SeasonGuide, Townsperson, Upgrade};

use crate::config::CatalogConfig;
use log::{debug, info};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading catalog documents.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog document {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog document {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub townspeople: OrderedTable<Townsperson>,
    pub buildings: OrderedTable<Building>,
    pub events: OrderedTable<EventCalendar>,
    pub fish: OrderedTable<Fish>,
    pub seasons: OrderedTable<SeasonGuide>,
    pub crops: OrderedTable<Crop>,
    pub community: OrderedTable<Room>,
    pub upgrades: OrderedTable<Upgrade>,
}

impl Catalog {
    /// Load every catalog document named by `config` from its data directory.
    pub fn load(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let dir = Path::new(&config.data_dir);
        let catalog = Catalog {
            townspeople: load_document(&dir.join(&config.townspeople))?,
            buildings: load_document(&dir.join(&config.buildings))?,
            events: load_document(&dir.join(&config.events))?,
            fish: load_document(&dir.join(&config.fish))?,
            seasons: load_document(&dir.join(&config.seasons))?,
            crops: load_document(&dir.join(&config.crops))?,
            community: load_document(&dir.join(&config.community))?,
            upgrades: load_document(&dir.join(&config.upgrades))?,
        };
        info!(
            "Catalog loaded from {}: {} villagers, {} fish, {} crops, {} rooms / {} bundles",
            dir.display(),
            catalog.townspeople.len(),
            catalog.fish.len(),
            catalog.crops.len(),
            catalog.community.len(),
            catalog.bundle_count()
        );
        Ok(catalog)
    }

    /// Look up a bundle definition by its canonical room and bundle names.
    pub fn bundle(&self, room: &str, bundle: &str) -> Option<&Bundle> {
        self.community.get(room).and_then(|r| r.bundles.get(bundle))
    }

    /// Every `(room, bundle name, bundle)` in catalog order.
    pub fn bundles(&self) -> impl Iterator<Item = (&str, &str, &Bundle)> {
        self.community.iter().flat_map(|(room_name, room)| {
            room.bundles
                .iter()
                .map(move |(bundle_name, bundle)| (room_name, bundle_name, bundle))
        })
    }

    pub fn bundle_count(&self) -> usize {
        self.community.values().map(|r| r.bundles.len()).sum()
    }
}

fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T, CatalogError> {
    debug!("Loading catalog document {}", path.display());
    let contents = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    // Guard against any accidental leading NULs or BOM
    let cleaned = contents.trim_start_matches(&['\0', '\u{feff}'][..]);
    serde_json::from_str(cleaned).map_err(|source| CatalogError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
