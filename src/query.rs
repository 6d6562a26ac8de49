//! Read-only aggregations over the catalog and one guild's progress snapshot.
//!
//! A bundle is complete once the number of checked items reaches its `amount`, not when
//! every listed item is checked: many bundles list more eligible items than they require.

use crate::catalog::{Bundle, Catalog};
use crate::progress::{BundleProgress, GuildProgress};
use std::collections::HashSet;

/// Stored progress of one bundle, if the guild has it.
pub fn bundle_progress<'a>(guild: &'a GuildProgress, room: &str, bundle: &str) -> Option<&'a BundleProgress> {
    guild.get(room).and_then(|r| r.get(bundle))
}

/// Number of checked items recorded for a bundle.
pub fn bundle_checked_count(guild: &GuildProgress, room: &str, bundle: &str) -> usize {
    bundle_progress(guild, room, bundle)
        .map(BundleProgress::checked_count)
        .unwrap_or(0)
}

pub fn is_bundle_complete(guild: &GuildProgress, room: &str, bundle_name: &str, bundle: &Bundle) -> bool {
    bundle_checked_count(guild, room, bundle_name) >= bundle.amount as usize
}

/// `(completed, total)` bundles of one room. An unknown room counts as `(0, 0)`.
pub fn completion_counts(catalog: &Catalog, guild: &GuildProgress, room: &str) -> (usize, usize) {
    let Some(room_def) = catalog.community.get(room) else {
        return (0, 0);
    };
    let completed = room_def
        .bundles
        .iter()
        .filter(|(name, bundle)| is_bundle_complete(guild, room, name, bundle))
        .count();
    (completed, room_def.bundles.len())
}

/// Every unchecked item of every incomplete bundle. Complete bundles contribute nothing,
/// even when some of their items are still unchecked.
pub fn remaining_items(catalog: &Catalog, guild: &GuildProgress) -> HashSet<String> {
    let mut remaining = HashSet::new();
    for (room, bundle_name, bundle) in catalog.bundles() {
        if is_bundle_complete(guild, room, bundle_name, bundle) {
            continue;
        }
        let progress = bundle_progress(guild, room, bundle_name);
        for item in bundle.item_names() {
            if !progress.map(|p| p.is_checked(item)).unwrap_or(false) {
                remaining.insert(item.to_string());
            }
        }
    }
    remaining
}

/// One incomplete bundle as shown by `bundle incomplete`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncompleteBundle {
    pub bundle: String,
    pub checked: usize,
    pub amount: u32,
}

/// Incomplete bundles grouped by room, in catalog order. Rooms with nothing left are omitted.
pub fn incomplete_bundles(catalog: &Catalog, guild: &GuildProgress) -> Vec<(String, Vec<IncompleteBundle>)> {
    catalog
        .community
        .iter()
        .filter_map(|(room, room_def)| {
            let pending: Vec<IncompleteBundle> = room_def
                .bundles
                .iter()
                .filter(|(name, bundle)| !is_bundle_complete(guild, room, name, bundle))
                .map(|(name, bundle)| IncompleteBundle {
                    bundle: name.to_string(),
                    checked: bundle_checked_count(guild, room, name),
                    amount: bundle.amount,
                })
                .collect();
            (!pending.is_empty()).then(|| (room.to_string(), pending))
        })
        .collect()
}

/// Keep the `names` that match something in `remaining`.
///
/// Fuzzy containment policy: a name matches when it equals a remaining item ignoring case,
/// or when either lowercased string contains the other (bundle items carry decorations such
/// as quality stars or counts). Output is de-duplicated case-insensitively, first seen wins.
pub fn filter_to_remaining(names: &[String], remaining: &HashSet<String>) -> Vec<String> {
    let remaining_lower: Vec<String> = remaining.iter().map(|r| r.to_lowercase()).collect();
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for name in names {
        let key = name.to_lowercase();
        let matched = remaining_lower
            .iter()
            .any(|r| *r == key || r.contains(&key) || key.contains(r.as_str()));
        if matched && seen.insert(key) {
            out.push(name.clone());
        }
    }
    out
}

/// Cut a trailing parenthetical qualifier: `"Common Mushroom (Secret Woods)"` -> `"Common Mushroom"`.
pub fn normalize_name(name: &str) -> String {
    name.split('(').next().unwrap_or(name).trim().to_string()
}

/// Names per category for one season.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeasonCategories {
    pub crops: Vec<String>,
    pub fish: Vec<String>,
    pub foraging: Vec<String>,
    pub trees: Vec<String>,
}

impl SeasonCategories {
    pub fn get(&self, category: SeasonCategory) -> &[String] {
        match category {
            SeasonCategory::Crops => &self.crops,
            SeasonCategory::Fish => &self.fish,
            SeasonCategory::Foraging => &self.foraging,
            SeasonCategory::Trees => &self.trees,
        }
    }

    /// Same categories, each filtered through [`filter_to_remaining`].
    pub fn filtered(&self, remaining: &HashSet<String>) -> SeasonCategories {
        SeasonCategories {
            crops: filter_to_remaining(&self.crops, remaining),
            fish: filter_to_remaining(&self.fish, remaining),
            foraging: filter_to_remaining(&self.foraging, remaining),
            trees: filter_to_remaining(&self.trees, remaining),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeasonCategory {
    Crops,
    Fish,
    Foraging,
    Trees,
}

impl SeasonCategory {
    pub const ALL: [SeasonCategory; 4] = [
        SeasonCategory::Crops,
        SeasonCategory::Fish,
        SeasonCategory::Foraging,
        SeasonCategory::Trees,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "crops" => Some(SeasonCategory::Crops),
            "fish" => Some(SeasonCategory::Fish),
            "foraging" => Some(SeasonCategory::Foraging),
            "trees" => Some(SeasonCategory::Trees),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SeasonCategory::Crops => "Crops",
            SeasonCategory::Fish => "Fish",
            SeasonCategory::Foraging => "Foraging",
            SeasonCategory::Trees => "Trees",
        }
    }
}

/// Crops (single harvest, then multi harvest), fish, normalized foraging and tree names for
/// `season`. A season missing from the catalog yields empty lists.
pub fn season_category_lists(catalog: &Catalog, season: &str) -> SeasonCategories {
    let Some((_, guide)) = catalog.seasons.get_ci(season) else {
        return SeasonCategories::default();
    };
    SeasonCategories {
        crops: guide
            .crops
            .single_harvest
            .keys()
            .chain(guide.crops.multi_harvest.keys())
            .map(str::to_string)
            .collect(),
        fish: guide.fish.keys().map(str::to_string).collect(),
        foraging: guide.foraging.iter().map(|f| normalize_name(f)).collect(),
        trees: guide.trees.keys().map(str::to_string).collect(),
    }
}
