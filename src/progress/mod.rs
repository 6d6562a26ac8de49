//! # Bundle Progress Store
//!
//! Durable, guild-partitioned record of which community bundle items have been checked off.
//!
//! ## Layout
//!
//! One JSON document covers every guild:
//!
//! ```text
//! { "<guildId>": { "<room>": { "<bundle>": { "items": { "<item>": bool } } } } }
//! ```
//!
//! ## Lifecycle
//!
//! Nothing is cached between calls. Each public operation runs as one
//! [`ProgressStore::transaction`]: acquire the store mutex, load the document, heal the
//! guild against the catalog, mutate, save (only when something changed), release.
//!
//! - **Healing** ([`heal_guild`]) adds every catalog room/bundle/item that the stored guild
//!   lacks, with items defaulting to `false`. Existing values are never touched and keys are
//!   never removed, so healing is idempotent and non-destructive.
//! - **Loading** never fails: an absent file is an empty document, and an unreadable or
//!   unparsable file is logged, optionally moved aside as `<file>.corrupt-<timestamp>`, and
//!   treated as empty.
//! - **Saving** writes a temp file in the same directory and renames it over the state file
//!   while holding an exclusive `fs2` lock, so a crash never leaves a half-written document
//!   behind. Write failures are returned as [`ProgressError::Persistence`].

pub mod errors;

pub use errors::ProgressError;

use crate::catalog::{BundleIndex, BundleLocation, Catalog};
use crate::metrics;
use chrono::Utc;
use fs2::FileExt;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Checkbox state of one bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleProgress {
    #[serde(default)]
    pub items: HashMap<String, bool>,
}

impl BundleProgress {
    pub fn checked_count(&self) -> usize {
        self.items.values().filter(|v| **v).count()
    }

    pub fn is_checked(&self, item: &str) -> bool {
        self.items.get(item).copied().unwrap_or(false)
    }
}

/// Bundle name -> progress.
pub type RoomProgress = HashMap<String, BundleProgress>;
/// Room name -> bundles.
pub type GuildProgress = HashMap<String, RoomProgress>;

/// The whole on-disk document, keyed by guild id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreState {
    pub guilds: HashMap<String, GuildProgress>,
}

impl StoreState {
    pub fn guild(&self, guild_id: u64) -> Option<&GuildProgress> {
        self.guilds.get(&guild_id.to_string())
    }

    pub fn remove_guild(&mut self, guild_id: u64) -> Option<GuildProgress> {
        self.guilds.remove(&guild_id.to_string())
    }

    fn item_mut(&mut self, guild_id: u64, room: &str, bundle: &str, item: &str) -> Option<&mut bool> {
        self.guilds
            .get_mut(&guild_id.to_string())?
            .get_mut(room)?
            .get_mut(bundle)?
            .items
            .get_mut(item)
    }
}

fn entry_or_default<'a, V: Default>(
    map: &'a mut HashMap<String, V>,
    key: &str,
    healed: &mut bool,
) -> &'a mut V {
    match map.entry(key.to_string()) {
        Entry::Occupied(o) => o.into_mut(),
        Entry::Vacant(v) => {
            *healed = true;
            v.insert(V::default())
        }
    }
}

/// Insert every catalog room/bundle/item missing from `guild_id`'s entry (creating the entry
/// itself when absent). Returns whether anything was inserted.
pub fn heal_guild(catalog: &Catalog, state: &mut StoreState, guild_id: u64) -> bool {
    let mut healed = false;
    let guild = entry_or_default(&mut state.guilds, &guild_id.to_string(), &mut healed);
    for (room_name, room) in catalog.community.iter() {
        let room_progress = entry_or_default(guild, room_name, &mut healed);
        for (bundle_name, bundle) in room.bundles.iter() {
            let progress = entry_or_default(room_progress, bundle_name, &mut healed);
            for item in bundle.item_names() {
                if !progress.items.contains_key(item) {
                    progress.items.insert(item.to_string(), false);
                    healed = true;
                }
            }
        }
    }
    healed
}

pub struct ProgressStore {
    path: PathBuf,
    catalog: Arc<Catalog>,
    index: Arc<BundleIndex>,
    backup_corrupt: bool,
    lock: Mutex<()>,
}

impl ProgressStore {
    pub fn new(path: impl Into<PathBuf>, catalog: Arc<Catalog>, index: Arc<BundleIndex>) -> Self {
        Self {
            path: path.into(),
            catalog,
            index,
            backup_corrupt: true,
            lock: Mutex::new(()),
        }
    }

    /// Whether an unparsable state file is moved aside before being replaced.
    pub fn with_corrupt_backup(mut self, enabled: bool) -> Self {
        self.backup_corrupt = enabled;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the state document. Never fails; see the module docs for the recovery rules.
    pub fn load(&self) -> StoreState {
        let mut file = match OpenOptions::new().read(true).open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return StoreState::default(),
            Err(e) => {
                warn!("progress: cannot open {}: {} (starting empty)", self.path.display(), e);
                return StoreState::default();
            }
        };
        if let Err(e) = file.lock_shared() {
            debug!("progress: shared lock on {} failed: {}", self.path.display(), e);
        }
        let mut raw = Vec::new();
        let read = file.read_to_end(&mut raw);
        if let Err(e) = file.unlock() {
            debug!("progress: unlock of {} failed: {}", self.path.display(), e);
        }
        drop(file);
        if let Err(e) = read {
            warn!("progress: failed reading {}: {} (starting empty)", self.path.display(), e);
            return StoreState::default();
        }
        // Invalid UTF-8 counts as corrupt content
        let start = raw.iter().position(|b| *b != 0).unwrap_or(raw.len());
        let cleaned = &raw[start..];
        if cleaned.iter().all(u8::is_ascii_whitespace) {
            return StoreState::default();
        }
        match serde_json::from_slice(cleaned) {
            Ok(state) => state,
            Err(e) => {
                warn!("progress: {} is not a valid state document: {}", self.path.display(), e);
                metrics::inc_corrupt_state_recoveries();
                if self.backup_corrupt {
                    self.quarantine_corrupt();
                }
                StoreState::default()
            }
        }
    }

    fn quarantine_corrupt(&self) {
        let name = self
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("bundles_state.json");
        let backup = self.path.with_file_name(format!(
            "{}.corrupt-{}",
            name,
            Utc::now().format("%Y%m%dT%H%M%S%.3fZ")
        ));
        match fs::rename(&self.path, &backup) {
            Ok(()) => warn!("progress: corrupt state moved to {}", backup.display()),
            Err(e) => warn!("progress: could not back up corrupt state: {}", e),
        }
    }

    /// Overwrite the whole state document.
    pub fn save(&self, state: &StoreState) -> Result<(), ProgressError> {
        let content = serde_json::to_string_pretty(state)?;
        write_file_locked(&self.path, &content).map_err(|source| {
            metrics::inc_persistence_failures();
            ProgressError::Persistence {
                path: self.path.clone(),
                source,
            }
        })
    }

    /// Run `f` against a freshly loaded state under the store mutex. `f` returns its result
    /// and whether the state must be saved; a failed save fails the whole transaction.
    pub async fn transaction<R, F>(&self, f: F) -> Result<R, ProgressError>
    where
        F: FnOnce(&mut StoreState) -> (R, bool),
    {
        let _guard = self.lock.lock().await;
        let mut state = self.load();
        let (result, dirty) = f(&mut state);
        if dirty {
            self.save(&state)?;
        }
        Ok(result)
    }

    /// Heal `guild_id` against the catalog (saving only when healing inserted keys) and return it.
    pub async fn get_or_init_guild(&self, guild_id: u64) -> Result<GuildProgress, ProgressError> {
        let catalog = Arc::clone(&self.catalog);
        self.transaction(|state| {
            let healed = heal_guild(&catalog, state, guild_id);
            if healed {
                metrics::inc_state_heals();
                debug!("progress: healed guild {}", guild_id);
            }
            let guild = state.guild(guild_id).cloned().unwrap_or_default();
            (guild, healed)
        })
        .await
    }

    /// Set one item of one bundle. Bundle and item names resolve case-insensitively; a name
    /// that does not resolve is rejected before the state file is touched.
    pub async fn set_item(
        &self,
        guild_id: u64,
        bundle_key: &str,
        item_name: &str,
        value: bool,
    ) -> Result<BundleLocation, ProgressError> {
        let location = self
            .index
            .locate_bundle(bundle_key)
            .cloned()
            .ok_or_else(|| ProgressError::BundleNotFound(bundle_key.trim().to_string()))?;
        let item = self
            .catalog
            .bundle(&location.room, &location.bundle)
            .and_then(|b| b.resolve_item(item_name))
            .map(str::to_string)
            .ok_or_else(|| ProgressError::ItemNotFound {
                item: item_name.trim().to_string(),
                bundle: location.bundle.clone(),
            })?;

        let catalog = Arc::clone(&self.catalog);
        self.transaction(|state| {
            heal_guild(&catalog, state, guild_id);
            if let Some(slot) = state.item_mut(guild_id, &location.room, &location.bundle, &item) {
                *slot = value;
            }
            ((), true)
        })
        .await?;
        info!(
            "progress: guild {} {} '{}' in {}",
            guild_id,
            if value { "checked" } else { "unchecked" },
            item,
            location.bundle
        );
        Ok(location)
    }

    /// Forget everything recorded for `guild_id` and leave it healed with every item `false`.
    pub async fn reset_guild(&self, guild_id: u64) -> Result<GuildProgress, ProgressError> {
        let catalog = Arc::clone(&self.catalog);
        let guild = self
            .transaction(|state| {
                state.remove_guild(guild_id);
                heal_guild(&catalog, state, guild_id);
                (state.guild(guild_id).cloned().unwrap_or_default(), true)
            })
            .await?;
        info!("progress: guild {} reset", guild_id);
        Ok(guild)
    }

    /// Number of guilds with recorded progress.
    pub async fn guild_count(&self) -> usize {
        let _guard = self.lock.lock().await;
        self.load().guilds.len()
    }
}

/// Replace `path` with `content`: exclusive lock on the destination, write and fsync a unique
/// temp file next to it, rename over the destination, fsync the directory.
fn write_file_locked(path: &Path, content: &str) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let lock_file = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(false)
        .open(path)?;
    lock_file.lock_exclusive()?;

    let base = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("bundles_state.json");
    let mut counter = 0u32;
    let tmp_path = loop {
        let candidate = dir.join(format!(".{}.tmp-{}-{}", base, std::process::id(), counter));
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(mut tmp) => {
                let written = tmp
                    .write_all(content.as_bytes())
                    .and_then(|_| tmp.flush())
                    .and_then(|_| tmp.sync_all());
                if let Err(e) = written {
                    let _ = fs::remove_file(&candidate);
                    return Err(e);
                }
                break candidate;
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                counter = counter.saturating_add(1);
                continue;
            }
            Err(e) => return Err(e),
        }
    };

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }
    if let Ok(dir_file) = File::open(dir) {
        let _ = dir_file.sync_all();
    }
    drop(lock_file);
    Ok(())
}
