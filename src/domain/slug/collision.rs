// src/domain/slug/collision.rs
use crate::application::ports::SlugGeneratorPort;
use crate::domain::slug::value_objects::PrimaryKey;

/// Grouping key for duplicate detection: trimmed and lower-cased, so
/// `"Page Title"` and `"page title "` fall into the same group.
pub fn group_key(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Decides the final slug of a record from its field value and the size of
/// its group, prepending the primary key when the value is shared.
pub struct CollisionResolver<'a> {
    generator: &'a SlugGeneratorPort,
    always_prepend_pk: bool,
}

impl<'a> CollisionResolver<'a> {
    pub fn new(generator: &'a SlugGeneratorPort, always_prepend_pk: bool) -> Self {
        Self {
            generator,
            always_prepend_pk,
        }
    }

    pub fn resolve(&self, pk: &PrimaryKey, value: &str, occurrences: u64) -> String {
        if occurrences > 1 || self.always_prepend_pk {
            self.generator.slugify(&format!("{pk} {value}"))
        } else {
            self.generator.slugify(value)
        }
    }
}
