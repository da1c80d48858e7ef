use crate::application::ports::util::{PrimaryKeyExtractor, SlugGenerator};
use crate::domain::slug::PrimaryKey;
use slug::slugify;

const DEFAULT_REPLACEMENT: &str = "-";

/// Transliterates to ASCII, lower-cases and joins words with the
/// replacement (`"ñice Pagé!"` -> `"nice-page"`).
#[derive(Clone, Debug)]
pub struct DefaultSlugGenerator {
    replacement: String,
}

impl DefaultSlugGenerator {
    pub fn with_replacement(replacement: impl Into<String>) -> Self {
        Self {
            replacement: replacement.into(),
        }
    }
}

impl Default for DefaultSlugGenerator {
    fn default() -> Self {
        Self::with_replacement(DEFAULT_REPLACEMENT)
    }
}

impl SlugGenerator for DefaultSlugGenerator {
    fn slugify(&self, input: &str) -> String {
        let slug = slugify(input);
        if self.replacement == DEFAULT_REPLACEMENT {
            slug
        } else {
            slug.replace(DEFAULT_REPLACEMENT, &self.replacement)
        }
    }
}

/// Reads the key off a key-prefixed slug: the leading digits before the
/// first separator.
#[derive(Clone, Debug)]
pub struct LeadingKeyExtractor {
    separator: char,
}

impl LeadingKeyExtractor {
    pub fn with_separator(separator: char) -> Self {
        Self { separator }
    }
}

impl Default for LeadingKeyExtractor {
    fn default() -> Self {
        Self::with_separator('-')
    }
}

impl PrimaryKeyExtractor for LeadingKeyExtractor {
    fn extract(&self, slug: &str) -> Option<PrimaryKey> {
        let (head, rest) = slug.split_once(self.separator)?;
        if head.is_empty() || rest.is_empty() || !head.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(PrimaryKey::from_param(head))
    }
}
