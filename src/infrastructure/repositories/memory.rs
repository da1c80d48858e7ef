// src/infrastructure/repositories/memory.rs
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::slug::{
    PrimaryKey, SlugRow, SlugSourceRepository, SourceName, SourceSchema, group_key,
};
use crate::infrastructure::lock::mutex_lock;

const SOURCE: &str = "repositories::memory";

type Record = HashMap<String, String>;

struct Source {
    schema: SourceSchema,
    records: BTreeMap<PrimaryKey, Record>,
}

impl Source {
    fn occurrences(&self, field: &str, value: &str) -> u64 {
        let key = group_key(value);
        let count = self
            .records
            .values()
            .filter_map(|record| record.get(field))
            .filter(|other| group_key(other) == key)
            .count();
        u64::try_from(count).unwrap_or(u64::MAX)
    }

    fn row(&self, field: &str, pk: &PrimaryKey, record: &Record) -> SlugRow {
        let value = record.get(field).cloned();
        let occurrences = value
            .as_deref()
            .map_or(1, |value| self.occurrences(field, value));
        SlugRow::new(pk.clone(), value, occurrences)
    }
}

/// Slug sources held in process memory. Records are plain field maps; a
/// missing field reads as NULL.
#[derive(Default)]
pub struct InMemorySlugSources {
    sources: Mutex<HashMap<SourceName, Source>>,
}

impl InMemorySlugSources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a source. Re-registering keeps its records.
    pub fn register(&self, schema: SourceSchema) {
        let mut guard = mutex_lock(&self.sources, SOURCE, "register");
        match guard.get_mut(&schema.name) {
            Some(source) => source.schema = schema,
            None => {
                guard.insert(
                    schema.name.clone(),
                    Source {
                        schema,
                        records: BTreeMap::new(),
                    },
                );
            }
        }
    }

    /// Insert or replace a record. Returns `false` for an unregistered source.
    pub fn insert<'f>(
        &self,
        source: &SourceName,
        pk: impl Into<PrimaryKey>,
        fields: impl IntoIterator<Item = (&'f str, &'f str)>,
    ) -> bool {
        let mut guard = mutex_lock(&self.sources, SOURCE, "insert");
        let Some(source) = guard.get_mut(source) else {
            return false;
        };
        let record = fields
            .into_iter()
            .map(|(field, value)| (field.to_string(), value.to_string()))
            .collect();
        source.records.insert(pk.into(), record);
        true
    }

    /// Set one field of an existing record. Returns whether the record exists.
    pub fn update(&self, source: &SourceName, pk: &PrimaryKey, field: &str, value: &str) -> bool {
        let mut guard = mutex_lock(&self.sources, SOURCE, "update");
        let Some(record) = guard
            .get_mut(source)
            .and_then(|source| source.records.get_mut(pk))
        else {
            return false;
        };
        record.insert(field.to_string(), value.to_string());
        true
    }

    pub fn remove(&self, source: &SourceName, pk: &PrimaryKey) -> bool {
        let mut guard = mutex_lock(&self.sources, SOURCE, "remove");
        guard
            .get_mut(source)
            .and_then(|source| source.records.remove(pk))
            .is_some()
    }

    /// Drop every record of `source`, keeping its schema.
    pub fn clear(&self, source: &SourceName) {
        let mut guard = mutex_lock(&self.sources, SOURCE, "clear");
        if let Some(source) = guard.get_mut(source) {
            source.records.clear();
        }
    }
}

#[async_trait]
impl SlugSourceRepository for InMemorySlugSources {
    async fn schema(&self, source: &SourceName) -> DomainResult<Option<SourceSchema>> {
        let guard = mutex_lock(&self.sources, SOURCE, "schema");
        Ok(guard.get(source).map(|source| source.schema.clone()))
    }

    async fn rows(&self, schema: &SourceSchema, field: &str) -> DomainResult<Vec<SlugRow>> {
        let guard = mutex_lock(&self.sources, SOURCE, "rows");
        let Some(source) = guard.get(&schema.name) else {
            return Ok(Vec::new());
        };
        Ok(source
            .records
            .iter()
            .map(|(pk, record)| source.row(field, pk, record))
            .collect())
    }

    async fn row(
        &self,
        schema: &SourceSchema,
        field: &str,
        pk: &PrimaryKey,
    ) -> DomainResult<Option<SlugRow>> {
        let guard = mutex_lock(&self.sources, SOURCE, "row");
        Ok(guard.get(&schema.name).and_then(|source| {
            source
                .records
                .get(pk)
                .map(|record| source.row(field, pk, record))
        }))
    }
}
