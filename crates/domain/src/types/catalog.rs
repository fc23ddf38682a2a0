//! Category catalog with bidirectional code/name resolution

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_CATEGORIES;

/// Bidirectional mapping between canonical category codes (e.g. `CL1`) and
/// their display names (e.g. "Дзвінки дрібні").
///
/// The catalog is loaded once per run and read-only afterwards. Resolution
/// is open-world: values matching neither direction pass through unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCatalog {
    code_to_name: BTreeMap<String, String>,
    name_to_code: BTreeMap<String, String>,
}

impl CategoryCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self { code_to_name: BTreeMap::new(), name_to_code: BTreeMap::new() }
    }

    /// Build a catalog from `(code, display name)` pairs.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        let mut catalog = Self::new();
        for (code, name) in pairs {
            catalog.insert(code.into(), name.into());
        }
        catalog
    }

    /// Insert a code/name pair, keeping both directions consistent.
    ///
    /// Re-inserting an existing code replaces its name and drops the stale
    /// inverse entry, preserving the one-to-one invariant.
    pub fn insert(&mut self, code: String, name: String) {
        if let Some(old_name) = self.code_to_name.insert(code.clone(), name.clone()) {
            self.name_to_code.remove(&old_name);
        }
        self.name_to_code.insert(name, code);
    }

    /// Resolve a raw category value to `(code, display name)`.
    ///
    /// A known code keeps itself and maps to its name; a known display name
    /// maps back to its code; anything else passes through as both code and
    /// name. Never fails.
    pub fn resolve(&self, value: &str) -> (String, String) {
        let value = value.trim();
        if let Some(name) = self.code_to_name.get(value) {
            return (value.to_string(), name.clone());
        }
        if let Some(code) = self.name_to_code.get(value) {
            return (code.clone(), value.to_string());
        }
        (value.to_string(), value.to_string())
    }

    /// Display name for a canonical code, if known.
    pub fn name_for(&self, code: &str) -> Option<&str> {
        self.code_to_name.get(code).map(String::as_str)
    }

    /// Canonical code for a display name, if known.
    pub fn code_for(&self, name: &str) -> Option<&str> {
        self.name_to_code.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.code_to_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code_to_name.is_empty()
    }
}

impl Default for CategoryCatalog {
    /// The built-in support-desk catalog.
    fn default() -> Self {
        Self::from_pairs(DEFAULT_CATEGORIES.iter().copied())
    }
}
