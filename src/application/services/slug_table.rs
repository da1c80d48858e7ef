// src/application/services/slug_table.rs
use std::collections::HashMap;
use std::sync::Arc;

use crate::application::ports::SlugGeneratorPort;
use crate::domain::errors::DomainResult;
use crate::domain::slug::{
    CollisionResolver, PrimaryKey, SlugRow, SlugSourceRepository, SlugTable, SourceName,
};

/// Derives the complete key to slug mapping of a source from current data.
pub struct SlugTableBuilder {
    sources: Arc<dyn SlugSourceRepository>,
    generator: Arc<SlugGeneratorPort>,
    prepend_pk: bool,
}

impl SlugTableBuilder {
    pub fn new(
        sources: Arc<dyn SlugSourceRepository>,
        generator: Arc<SlugGeneratorPort>,
        prepend_pk: bool,
    ) -> Self {
        Self {
            sources,
            generator,
            prepend_pk,
        }
    }

    fn resolver(&self) -> CollisionResolver<'_> {
        CollisionResolver::new(self.generator.as_ref(), self.prepend_pk)
    }

    /// Build the table for `source`. `Ok(None)` when the source cannot be
    /// resolved; an empty table when it has no sluggable records.
    pub async fn build(
        &self,
        source: &SourceName,
        slug_field: Option<&str>,
    ) -> DomainResult<Option<SlugTable>> {
        let Some(schema) = self.sources.schema(source).await? else {
            return Ok(None);
        };
        let field = schema.slug_field(slug_field);
        let rows = self.sources.rows(&schema, field).await?;
        let resolver = self.resolver();

        let candidates: Vec<Candidate> = rows
            .into_iter()
            .filter_map(|SlugRow { pk, value, occurrences }| {
                let value = value?;
                let slug = resolver.resolve(&pk, &value, occurrences);
                let prefixed = self.prepend_pk || occurrences > 1;
                (!slug.is_empty()).then_some(Candidate {
                    pk,
                    value,
                    slug,
                    prefixed,
                })
            })
            .collect();

        let table: SlugTable = unique_slugs(&resolver, candidates)
            .into_iter()
            .map(|candidate| (candidate.pk, candidate.slug))
            .collect();
        tracing::debug!(source = %source, field, entries = table.len(), "built slug table");
        Ok(Some(table))
    }

    /// Derive the slug of a single record. `Ok(None)` when the source or the
    /// record does not exist, or the record has nothing to slug. When `taken`
    /// is given, a slug already used by another key in it is prefixed, and a
    /// prefixed slug that is still taken gives `Ok(None)`.
    pub async fn derive_one(
        &self,
        source: &SourceName,
        slug_field: Option<&str>,
        pk: &PrimaryKey,
        taken: Option<&SlugTable>,
    ) -> DomainResult<Option<String>> {
        let Some(schema) = self.sources.schema(source).await? else {
            return Ok(None);
        };
        let field = schema.slug_field(slug_field);
        let Some(row) = self.sources.row(&schema, field, pk).await? else {
            return Ok(None);
        };
        let Some(value) = row.value.as_deref() else {
            return Ok(None);
        };

        let resolver = self.resolver();
        let collides = |slug: &str| {
            taken.is_some_and(|table| {
                table
                    .iter()
                    .any(|(other, existing)| other != pk && existing == slug)
            })
        };
        let mut slug = resolver.resolve(&row.pk, value, row.occurrences);
        if collides(&slug) {
            slug = resolver.resolve(&row.pk, value, row.occurrences.max(2));
        }
        if slug.is_empty() || collides(&slug) {
            return Ok(None);
        }
        Ok(Some(slug))
    }
}

struct Candidate {
    pk: PrimaryKey,
    value: String,
    slug: String,
    prefixed: bool,
}

/// Values in different groups can still format identically ("A page title"
/// and "A-page title"), and a key-prefixed slug can land on a slug that is
/// already taken ("1 a" next to a prefixed "a"). Every colliding slug that is
/// not key-prefixed yet gets prefixed, repeatedly, until all slugs differ.
/// When only prefixed slugs collide, the lowest key keeps its slug and the
/// others are left without one.
fn unique_slugs(
    resolver: &CollisionResolver<'_>,
    mut candidates: Vec<Candidate>,
) -> Vec<Candidate> {
    loop {
        let mut holders: HashMap<&str, Vec<usize>> = HashMap::new();
        for (index, candidate) in candidates.iter().enumerate() {
            holders.entry(candidate.slug.as_str()).or_default().push(index);
        }
        let collisions: Vec<Vec<usize>> = holders
            .into_values()
            .filter(|indexes| indexes.len() > 1)
            .collect();
        if collisions.is_empty() {
            return candidates;
        }

        let mut dropped: Vec<usize> = Vec::new();
        for indexes in collisions {
            let open: Vec<usize> = indexes
                .iter()
                .copied()
                .filter(|&index| !candidates[index].prefixed)
                .collect();
            if open.is_empty() {
                let keep = indexes
                    .iter()
                    .copied()
                    .min_by(|&a, &b| candidates[a].pk.cmp(&candidates[b].pk));
                dropped.extend(indexes.into_iter().filter(|&index| Some(index) != keep));
                continue;
            }
            for index in open {
                let candidate = &mut candidates[index];
                candidate.slug = resolver.resolve(&candidate.pk, &candidate.value, 2);
                candidate.prefixed = true;
            }
        }

        for (index, candidate) in candidates.iter().enumerate() {
            if dropped.contains(&index) {
                tracing::warn!(
                    pk = %candidate.pk,
                    slug = %candidate.slug,
                    "slug still collides after key prefixing; leaving it out"
                );
            }
        }
        let mut index = 0;
        candidates.retain(|_| {
            let keep = !dropped.contains(&index);
            index += 1;
            keep
        });
    }
}
