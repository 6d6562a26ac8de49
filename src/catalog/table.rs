//! Insertion-ordered, case-insensitively searchable key/value table used for every catalog
//! document.
//!
//! Catalog JSON documents are objects whose key order is meaningful to players (rooms are
//! listed the way the game lists them, bundle items in their in-game slot order), so the
//! table keeps entries in document order. A lowercase index gives O(1) case-insensitive
//! lookups.

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

#[derive(Debug, Clone, PartialEq)]
pub struct OrderedTable<T> {
    entries: Vec<(String, T)>,
    lower_index: HashMap<String, usize>,
}

impl<T> Default for OrderedTable<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            lower_index: HashMap::new(),
        }
    }
}

impl<T> OrderedTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. A repeated key keeps its original position and takes the new value.
    pub fn insert(&mut self, key: impl Into<String>, value: T) {
        let key = key.into();
        if let Some(pos) = self.entries.iter().position(|(k, _)| *k == key) {
            self.entries[pos].1 = value;
            return;
        }
        // First spelling wins the case-insensitive slot
        self.lower_index
            .entry(key.to_lowercase())
            .or_insert(self.entries.len());
        self.entries.push((key, value));
    }

    /// Exact-key lookup.
    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Case-insensitive lookup returning the canonical key alongside the value.
    pub fn get_ci(&self, key: &str) -> Option<(&str, &T)> {
        self.lower_index
            .get(&key.trim().to_lowercase())
            .and_then(|&i| self.entries.get(i))
            .map(|(k, v)| (k.as_str(), v))
    }

    /// Canonical spelling of a key, case-insensitively.
    pub fn canonical_key(&self, key: &str) -> Option<&str> {
        self.get_ci(key).map(|(k, _)| k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, T> FromIterator<(K, T)> for OrderedTable<T> {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        let mut table = OrderedTable::new();
        for (k, v) in iter {
            table.insert(k, v);
        }
        table
    }
}

struct OrderedTableVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for OrderedTableVisitor<T> {
    type Value = OrderedTable<T>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a JSON object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut table = OrderedTable::new();
        while let Some((key, value)) = map.next_entry::<String, T>()? {
            table.insert(key, value);
        }
        Ok(table)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for OrderedTable<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(OrderedTableVisitor(PhantomData))
    }
}

impl<T: Serialize> Serialize for OrderedTable<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_document_order() {
        let t: OrderedTable<u32> =
            serde_json::from_str(r#"{"Zucchini": 1, "Apple": 2, "Melon": 3}"#).unwrap();
        let keys: Vec<&str> = t.keys().collect();
        assert_eq!(keys, vec!["Zucchini", "Apple", "Melon"]);
    }

    #[test]
    fn case_insensitive_lookup_returns_canonical_key() {
        let t: OrderedTable<u32> = [("Midnight Carp", 1)].into_iter().collect();
        assert_eq!(t.get_ci("  midnight CARP "), Some(("Midnight Carp", &1)));
        assert!(t.get("midnight carp").is_none());
    }

    #[test]
    fn repeated_key_replaces_in_place() {
        let mut t = OrderedTable::new();
        t.insert("a", 1);
        t.insert("b", 2);
        t.insert("a", 3);
        assert_eq!(t.len(), 2);
        assert_eq!(t.iter().next(), Some(("a", &3)));
    }
}
