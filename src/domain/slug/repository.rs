use crate::domain::errors::DomainResult;
use crate::domain::slug::value_objects::{PrimaryKey, SlugRow, SourceName};
use async_trait::async_trait;

/// Resolved shape of a data source: where its records live and which field
/// is shown to humans by default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSchema {
    pub name: SourceName,
    pub table: String,
    pub primary_key: String,
    pub display_field: String,
    /// Known columns; empty when the adapter does not introspect them.
    pub fields: Vec<String>,
}

impl SourceSchema {
    /// The field to slug: the configured one when it names a usable column,
    /// else the display field.
    pub fn slug_field<'a>(&'a self, configured: Option<&'a str>) -> &'a str {
        configured
            .filter(|field| !field.trim().is_empty())
            .filter(|field| self.fields.is_empty() || self.fields.iter().any(|f| f == *field))
            .unwrap_or(&self.display_field)
    }
}

/// Data access used to derive slugs.
///
/// Counts are produced together with the rows they describe, so a record's
/// value and the size of its group always come from the same read.
#[async_trait]
pub trait SlugSourceRepository: Send + Sync {
    /// Resolve a source. `Ok(None)` means the source is unknown.
    async fn schema(&self, source: &SourceName) -> DomainResult<Option<SourceSchema>>;

    /// Every record of the source with the group size of its `field` value.
    async fn rows(&self, schema: &SourceSchema, field: &str) -> DomainResult<Vec<SlugRow>>;

    /// One record with the group size of its `field` value.
    async fn row(
        &self,
        schema: &SourceSchema,
        field: &str,
        pk: &PrimaryKey,
    ) -> DomainResult<Option<SlugRow>>;
}
