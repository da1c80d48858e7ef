// src/infrastructure/repositories/mod.rs
mod error;
mod memory;
mod sqlite_source;

pub use error::map_sqlx;
pub use memory::InMemorySlugSources;
pub use sqlite_source::SqliteSlugSources;
