mod memory;
mod namespaces;
mod redis_store;

pub use memory::InMemoryCacheStore;
pub use namespaces::{HOST_NAMESPACE, NamespaceRegistry};
pub use redis_store::RedisCacheStore;
