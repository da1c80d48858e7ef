// src/application/ports/mod.rs
pub mod cache;
pub mod router;
pub mod time;
pub mod util;

// Type aliases to make port injection sites more descriptive and reduce `dyn` noise
pub type CacheStorePort = dyn cache::CacheStore;
pub type ClockPort = dyn time::Clock;
pub type PathRouterPort = dyn router::PathRouter;
pub type PrimaryKeyExtractorPort = dyn util::PrimaryKeyExtractor;
pub type SlugGeneratorPort = dyn util::SlugGenerator;
