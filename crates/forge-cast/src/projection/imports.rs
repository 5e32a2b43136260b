//! Import sets
//!
//! Maps an import source to the items imported from it. The empty item
//! means "import the whole source" (`import <source>`); any other item is
//! imported piecemeal (`from <source> import <item>`).

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Required imports, keyed by source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ImportSet {
    entries: BTreeMap<String, BTreeSet<String>>,
}

impl ImportSet {
    /// Empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set holding a single import
    pub fn single(source: impl Into<String>, item: impl Into<String>) -> Self {
        let mut set = Self::new();
        set.add(source, item);
        set
    }

    /// Add one import
    pub fn add(&mut self, source: impl Into<String>, item: impl Into<String>) {
        self.entries.entry(source.into()).or_default().insert(item.into());
    }

    /// Union with another set
    pub fn merge(&mut self, other: ImportSet) {
        for (source, items) in other.entries {
            self.entries.entry(source).or_default().extend(items);
        }
    }

    /// Union of many sets
    pub fn merged(sets: impl IntoIterator<Item = ImportSet>) -> Self {
        let mut result = Self::new();
        for set in sets {
            result.merge(set);
        }
        result
    }

    /// Iterate sources with their items, sources in lexical order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
