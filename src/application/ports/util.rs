// src/application/ports/util.rs
use crate::domain::slug::PrimaryKey;

/// Turns the text of a record into its final slug. The default adapter
/// transliterates and dashes; hosts may inject any function.
pub trait SlugGenerator: Send + Sync {
    fn slugify(&self, input: &str) -> String;
}

impl<F> SlugGenerator for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn slugify(&self, input: &str) -> String {
        self(input)
    }
}

/// Recovers a candidate primary key from a key-prefixed slug
/// (`"12-page-title"` -> `12`).
pub trait PrimaryKeyExtractor: Send + Sync {
    fn extract(&self, slug: &str) -> Option<PrimaryKey>;
}

impl<F> PrimaryKeyExtractor for F
where
    F: Fn(&str) -> Option<PrimaryKey> + Send + Sync,
{
    fn extract(&self, slug: &str) -> Option<PrimaryKey> {
        self(slug)
    }
}
