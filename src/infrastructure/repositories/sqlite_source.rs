// src/infrastructure/repositories/sqlite_source.rs
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::slug::{
    PrimaryKey, SlugRow, SlugSourceRepository, SourceName, SourceSchema, group_key,
};
use crate::infrastructure::repositories::error::map_sqlx;

const DISPLAY_FIELD_CANDIDATES: [&str; 2] = ["title", "name"];

/// Slug sources backed by SQLite tables.
///
/// A source named `RouteTwoTest` lives in `route_two_tests` unless a schema
/// is registered for it explicitly. Columns are introspected so a missing
/// slug field falls back to the display field (`title`, then `name`, then
/// the primary key).
#[derive(Clone)]
pub struct SqliteSlugSources {
    pool: Arc<SqlitePool>,
    schemas: HashMap<SourceName, SourceSchema>,
}

impl SqliteSlugSources {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self {
            pool,
            schemas: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_schema(mut self, schema: SourceSchema) -> Self {
        self.schemas.insert(schema.name.clone(), schema);
        self
    }

    async fn columns(&self, table: &str) -> DomainResult<Vec<(String, bool)>> {
        let rows = sqlx::query("SELECT name, pk FROM pragma_table_info(?) ORDER BY cid")
            .bind(table)
            .fetch_all(&*self.pool)
            .await
            .map_err(map_sqlx)?;
        rows.iter()
            .map(|row| {
                let name: String = row.try_get("name").map_err(map_sqlx)?;
                let pk: i64 = row.try_get("pk").map_err(map_sqlx)?;
                Ok((name, pk > 0))
            })
            .collect()
    }

    async fn table_exists(&self, table: &str) -> DomainResult<bool> {
        let found: Option<String> =
            sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?")
                .bind(table)
                .fetch_optional(&*self.pool)
                .await
                .map_err(map_sqlx)?;
        Ok(found.is_some())
    }

    async fn infer_schema(&self, source: &SourceName) -> DomainResult<Option<SourceSchema>> {
        let table = table_name(source.as_str());
        if !is_identifier(&table) || !self.table_exists(&table).await? {
            return Ok(None);
        }
        let columns = self.columns(&table).await?;
        let primary_key = columns
            .iter()
            .find(|(_, pk)| *pk)
            .map_or_else(|| "id".to_string(), |(name, _)| name.clone());
        let fields: Vec<String> = columns.into_iter().map(|(name, _)| name).collect();
        let display_field = DISPLAY_FIELD_CANDIDATES
            .iter()
            .find(|candidate| fields.iter().any(|field| field == *candidate))
            .map_or_else(|| primary_key.clone(), |field| (*field).to_string());

        Ok(Some(SourceSchema {
            name: source.clone(),
            table,
            primary_key,
            display_field,
            fields,
        }))
    }
}

/// `RouteTwoTest` -> `route_two_tests`.
fn table_name(source: &str) -> String {
    let mut table = String::with_capacity(source.len() + 4);
    for (index, ch) in source.chars().enumerate() {
        if ch.is_uppercase() {
            if index > 0 {
                table.push('_');
            }
            table.extend(ch.to_lowercase());
        } else {
            table.push(ch);
        }
    }
    if !table.ends_with('s') {
        table.push('s');
    }
    table
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with(|ch: char| ch.is_ascii_digit())
        && name.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

fn quoted(name: &str) -> DomainResult<String> {
    if is_identifier(name) {
        Ok(format!("\"{name}\""))
    } else {
        Err(DomainError::Validation(format!("invalid identifier: {name}")))
    }
}

fn primary_key(row: &SqliteRow) -> DomainResult<PrimaryKey> {
    if let Ok(id) = row.try_get::<i64, _>("pk") {
        return Ok(PrimaryKey::Int(id));
    }
    let key: String = row.try_get("pk").map_err(map_sqlx)?;
    Ok(PrimaryKey::from_param(&key))
}

fn value(row: &SqliteRow) -> DomainResult<Option<String>> {
    row.try_get("value").map_err(map_sqlx)
}

fn count_groups<'a>(values: impl Iterator<Item = &'a str>) -> HashMap<String, u64> {
    let mut counts = HashMap::new();
    for value in values {
        *counts.entry(group_key(value)).or_insert(0) += 1;
    }
    counts
}

#[async_trait]
impl SlugSourceRepository for SqliteSlugSources {
    async fn schema(&self, source: &SourceName) -> DomainResult<Option<SourceSchema>> {
        if let Some(schema) = self.schemas.get(source) {
            return Ok(Some(schema.clone()));
        }
        self.infer_schema(source).await
    }

    async fn rows(&self, schema: &SourceSchema, field: &str) -> DomainResult<Vec<SlugRow>> {
        let sql = format!(
            "SELECT {pk} AS pk, CAST({field} AS TEXT) AS value FROM {table} ORDER BY {pk}",
            pk = quoted(&schema.primary_key)?,
            field = quoted(field)?,
            table = quoted(&schema.table)?,
        );
        let records = sqlx::query(&sql)
            .fetch_all(&*self.pool)
            .await
            .map_err(map_sqlx)?
            .iter()
            .map(|row| Ok((primary_key(row)?, value(row)?)))
            .collect::<DomainResult<Vec<_>>>()?;

        let counts = count_groups(records.iter().filter_map(|(_, value)| value.as_deref()));
        Ok(records
            .into_iter()
            .map(|(pk, value)| {
                let occurrences = value
                    .as_deref()
                    .and_then(|value| counts.get(&group_key(value)).copied())
                    .unwrap_or(1);
                SlugRow::new(pk, value, occurrences)
            })
            .collect())
    }

    async fn row(
        &self,
        schema: &SourceSchema,
        field: &str,
        pk: &PrimaryKey,
    ) -> DomainResult<Option<SlugRow>> {
        let pk_column = quoted(&schema.primary_key)?;
        let field = quoted(field)?;
        let table = quoted(&schema.table)?;
        let record_sql = format!(
            "SELECT {pk_column} AS pk, CAST({field} AS TEXT) AS value FROM {table} WHERE {pk_column} = ?"
        );
        let values_sql =
            format!("SELECT CAST({field} AS TEXT) AS value FROM {table} WHERE {field} IS NOT NULL");

        // Both reads share one transaction so the count matches the record.
        let mut tx = self.pool.begin().await.map_err(map_sqlx)?;
        let query = sqlx::query(&record_sql);
        let query = match pk {
            PrimaryKey::Int(id) => query.bind(*id),
            PrimaryKey::Text(key) => query.bind(key.as_str()),
        };
        let Some(record) = query.fetch_optional(&mut *tx).await.map_err(map_sqlx)? else {
            tx.commit().await.map_err(map_sqlx)?;
            return Ok(None);
        };
        let record_pk = primary_key(&record)?;
        let Some(record_value) = value(&record)? else {
            tx.commit().await.map_err(map_sqlx)?;
            return Ok(Some(SlugRow::new(record_pk, None, 1)));
        };

        let key = group_key(&record_value);
        let mut occurrences = 0_u64;
        for row in sqlx::query(&values_sql)
            .fetch_all(&mut *tx)
            .await
            .map_err(map_sqlx)?
        {
            if value(&row)?.is_some_and(|other| group_key(&other) == key) {
                occurrences += 1;
            }
        }
        tx.commit().await.map_err(map_sqlx)?;

        Ok(Some(SlugRow::new(
            record_pk,
            Some(record_value),
            occurrences.max(1),
        )))
    }
}
