use crate::domain::slug::value_objects::PrimaryKey;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Mapping of primary key to slug for one source.
///
/// Tables are replaced wholesale when rebuilt; the only partial edits are
/// single-key patches and removals from invalidation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<SlugEntry>", into = "Vec<SlugEntry>")]
pub struct SlugTable {
    entries: BTreeMap<PrimaryKey, String>,
}

/// Serialised form of one table entry. JSON objects only take string keys,
/// so tables travel as an entry list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlugEntry {
    pub pk: PrimaryKey,
    pub slug: String,
}

impl SlugTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, pk: &PrimaryKey) -> Option<&str> {
        self.entries.get(pk).map(String::as_str)
    }

    pub fn insert(&mut self, pk: PrimaryKey, slug: impl Into<String>) -> Option<String> {
        self.entries.insert(pk, slug.into())
    }

    pub fn remove(&mut self, pk: &PrimaryKey) -> Option<String> {
        self.entries.remove(pk)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PrimaryKey, &str)> {
        self.entries.iter().map(|(pk, slug)| (pk, slug.as_str()))
    }

    /// Slug to key lookup used when parsing incoming paths.
    pub fn reverse(&self) -> HashMap<&str, &PrimaryKey> {
        self.entries
            .iter()
            .map(|(pk, slug)| (slug.as_str(), pk))
            .collect()
    }
}

impl FromIterator<(PrimaryKey, String)> for SlugTable {
    fn from_iter<T: IntoIterator<Item = (PrimaryKey, String)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<SlugEntry>> for SlugTable {
    fn from(value: Vec<SlugEntry>) -> Self {
        value
            .into_iter()
            .map(|entry| (entry.pk, entry.slug))
            .collect()
    }
}

impl From<SlugTable> for Vec<SlugEntry> {
    fn from(value: SlugTable) -> Self {
        value
            .entries
            .into_iter()
            .map(|(pk, slug)| SlugEntry { pk, slug })
            .collect()
    }
}
