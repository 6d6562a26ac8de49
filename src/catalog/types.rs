//! Typed records for the reference catalog documents.
//!
//! Field names follow the JSON documents shipped in `data/`. Facts such as sell prices or
//! growth times appear in the documents both as strings and as bare numbers, so they are
//! read through [`lenient_string`] and always exposed as display strings.

use super::table::OrderedTable;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Gift preferences and profile for one villager (`townspeople.json`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Townsperson {
    #[serde(default)]
    pub loves: Vec<String>,
    #[serde(default)]
    pub likes: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub birthday: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Construction materials for a farm building (`building.json`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Building {
    #[serde(default)]
    pub cost: Vec<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Tool or house upgrade cost (`upgrades.json`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Upgrade {
    #[serde(default)]
    pub cost: Vec<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Day number (as written in the document) -> events on that day.
pub type EventCalendar = OrderedTable<Vec<String>>;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Fish {
    #[serde(rename = "Location", default, deserialize_with = "lenient_string")]
    pub location: Option<String>,
    #[serde(rename = "Season", default, deserialize_with = "lenient_string")]
    pub season: Option<String>,
    #[serde(rename = "Time", default, deserialize_with = "lenient_string")]
    pub time: Option<String>,
    #[serde(rename = "Weather", default, deserialize_with = "lenient_string")]
    pub weather: Option<String>,
    #[serde(rename = "Base Sell Price", default, deserialize_with = "lenient_string")]
    pub base_sell_price: Option<String>,
    #[serde(rename = "Bundle", default, deserialize_with = "lenient_flag")]
    pub bundle: bool,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Crop {
    #[serde(rename = "Season", default, deserialize_with = "lenient_string")]
    pub season: Option<String>,
    #[serde(rename = "Type", default, deserialize_with = "lenient_string")]
    pub crop_type: Option<String>,
    #[serde(rename = "Growth Time", default, deserialize_with = "lenient_string")]
    pub growth_time: Option<String>,
    #[serde(rename = "Max Harvests", default, deserialize_with = "lenient_string")]
    pub max_harvests: Option<String>,
    #[serde(rename = "Seed Price", default, deserialize_with = "lenient_string")]
    pub seed_price: Option<String>,
    #[serde(rename = "Base Sell Price", default, deserialize_with = "lenient_string")]
    pub base_sell_price: Option<String>,
    #[serde(rename = "Bundle", default, deserialize_with = "lenient_flag")]
    pub bundle: bool,
    #[serde(default)]
    pub image: Option<String>,
}

/// Names of things to plant, catch and forage in one season (`seasons.json`).
/// Only the names are used; per-entry details are skipped.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeasonGuide {
    #[serde(rename = "Crops", default)]
    pub crops: SeasonCrops,
    #[serde(rename = "Fish", default)]
    pub fish: OrderedTable<IgnoredAny>,
    #[serde(rename = "Foraging", default)]
    pub foraging: Vec<String>,
    #[serde(rename = "Trees", default)]
    pub trees: OrderedTable<IgnoredAny>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeasonCrops {
    #[serde(rename = "Single Harvest", default)]
    pub single_harvest: OrderedTable<IgnoredAny>,
    #[serde(rename = "Multi Harvest", default)]
    pub multi_harvest: OrderedTable<IgnoredAny>,
}

/// A community center room (`communitycenter.json`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Room {
    #[serde(rename = "Bundles", default)]
    pub bundles: OrderedTable<Bundle>,
}

/// Canonical bundle definition. `items` maps every eligible item to its default checkbox
/// value; `amount` distinct items must be checked for the bundle to count as complete.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Bundle {
    #[serde(default)]
    pub items: OrderedTable<bool>,
    #[serde(default)]
    pub amount: u32,
    #[serde(default, deserialize_with = "lenient_string")]
    pub reward: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl Bundle {
    pub fn item_names(&self) -> impl Iterator<Item = &str> {
        self.items.keys()
    }

    /// Canonical spelling of an item of this bundle, case-insensitively.
    pub fn resolve_item(&self, name: &str) -> Option<&str> {
        self.items.canonical_key(name)
    }
}

/// Accept a string, number or bool and keep its display form. Null and empty strings become `None`.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(match v {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(if b { "Yes" } else { "No" }.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

/// Truthiness of a JSON value, the way the documents use `"Bundle"` markers.
pub fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(match v {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fish_accepts_numeric_facts() {
        let f: Fish = serde_json::from_str(
            r#"{"Location":"Ocean","Base Sell Price":75,"Bundle":"Ocean Fish Bundle"}"#,
        )
        .unwrap();
        assert_eq!(f.base_sell_price.as_deref(), Some("75"));
        assert!(f.bundle);
        assert!(f.weather.is_none());
    }

    #[test]
    fn bundle_resolves_items_case_insensitively() {
        let b: Bundle =
            serde_json::from_str(r#"{"items":{"Cherry":false,"Apple":false},"amount":1}"#).unwrap();
        assert_eq!(b.resolve_item("CHERRY"), Some("Cherry"));
        assert_eq!(b.item_names().collect::<Vec<_>>(), vec!["Cherry", "Apple"]);
        assert!(b.reward.is_none());
    }
}
