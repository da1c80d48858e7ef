//! Sluggable routing: record ids in outgoing paths are replaced by
//! human-readable slugs derived from a field of the record, and slugs in
//! incoming paths are translated back to ids. Slug tables are derived from
//! the data source, disambiguated with the record key when values collide,
//! and cached in a dedicated namespace of a pluggable store.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
