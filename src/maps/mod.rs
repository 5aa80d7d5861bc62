// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Named key/value lookup tables used by lookup-style functions.

use std::collections::HashMap;
use std::sync::Arc;

/// Key whose value is returned when a lookup misses.
pub const DEFAULT_MAP_KEY: &str = "__default";

/// Access to named lookup maps.
pub trait Maps {
    /// Names of all maps, sorted.
    fn map_names(&self) -> Vec<&str>;

    fn get_map(&self, map: &str) -> Option<&HashMap<String, String>>;

    /// Value for `key` in `map`, falling back to the map's `__default` entry.
    fn get_value(&self, map: &str, key: &str) -> Option<&str> {
        let entries = self.get_map(map)?;
        entries
            .get(key)
            .or_else(|| entries.get(DEFAULT_MAP_KEY))
            .map(String::as_str)
    }

    /// Replaces `map` wholesale, returning the previous contents.
    fn put_map(&mut self, map: &str, entries: HashMap<String, String>) -> Option<HashMap<String, String>>;

    /// Inserts one entry, creating the map if needed. Returns the previous value.
    fn put_value(&mut self, map: &str, key: &str, value: &str) -> Option<String>;
}

/// Map storage shared copy-on-write between a compiled morph and its instances.
///
/// Cloning is cheap; the first write to a map through a clone copies only that map.
#[derive(Debug, Clone, Default)]
pub struct MapStore {
    maps: HashMap<String, Arc<HashMap<String, String>>>,
}

impl MapStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains_map(&self, map: &str) -> bool {
        self.maps.contains_key(map)
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}

impl Maps for MapStore {
    fn map_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.maps.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn get_map(&self, map: &str) -> Option<&HashMap<String, String>> {
        self.maps.get(map).map(Arc::as_ref)
    }

    fn put_map(&mut self, map: &str, entries: HashMap<String, String>) -> Option<HashMap<String, String>> {
        self.maps
            .insert(map.to_string(), Arc::new(entries))
            .map(Arc::unwrap_or_clone)
    }

    fn put_value(&mut self, map: &str, key: &str, value: &str) -> Option<String> {
        let entries = self.maps.entry(map.to_string()).or_default();
        Arc::make_mut(entries).insert(key.to_string(), value.to_string())
    }
}
