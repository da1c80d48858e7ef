use crate::domain::errors::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Primary key of a slugged record. Integer keys are the common case. Text
/// that spells a canonical integer is always read as `Int`, whether it comes
/// from a URL or from a text column, so both sides agree on the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrimaryKey {
    Int(i64),
    Text(String),
}

impl PrimaryKey {
    /// Interpret a raw URL parameter as a key. Only canonical integers
    /// (`"42"`, not `"042"`) become `Int`, so rendering the key gives back the
    /// exact parameter.
    pub fn from_param(value: &str) -> Self {
        match value.parse::<i64>() {
            Ok(id) if id.to_string() == value => Self::Int(id),
            _ => Self::Text(value.to_string()),
        }
    }
}

impl fmt::Display for PrimaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(id) => write!(f, "{id}"),
            Self::Text(key) => f.write_str(key),
        }
    }
}

impl From<i64> for PrimaryKey {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for PrimaryKey {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<&str> for PrimaryKey {
    fn from(value: &str) -> Self {
        Self::from_param(value)
    }
}

/// Name of a configured data source (e.g. `RouteTest`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SourceName(String);

impl SourceName {
    pub fn new(value: impl Into<String>) -> DomainResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(DomainError::Validation("source name cannot be empty".into()));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key under which this source's table is stored in the slug cache.
    pub fn cache_key(&self) -> String {
        format!("{}_slugs", self.0)
    }
}

impl TryFrom<String> for SourceName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SourceName> for String {
    fn from(value: SourceName) -> Self {
        value.0
    }
}

impl fmt::Display for SourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One record as read for slugging: its key, the raw slug field and the size
/// of its case-insensitive, trimmed group across the whole source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlugRow {
    pub pk: PrimaryKey,
    pub value: Option<String>,
    pub occurrences: u64,
}

impl SlugRow {
    pub fn new(pk: impl Into<PrimaryKey>, value: Option<String>, occurrences: u64) -> Self {
        Self {
            pk: pk.into(),
            value,
            occurrences,
        }
    }
}
