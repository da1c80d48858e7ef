// src/application/ports/cache.rs
use crate::application::ApplicationResult;
use async_trait::async_trait;
use std::time::Duration;

/// Default lifetime of a cached slug table.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60 * 24);
pub const DEFAULT_KEY_PREFIX: &str = "slugger_";

/// Settings of one cache namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSettings {
    pub ttl: Duration,
    pub key_prefix: String,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }
}

impl CacheSettings {
    pub fn prefixed(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

/// Namespaced key/value store that slug tables are persisted in.
///
/// Namespace selection is synchronous process state so it can be restored
/// from a drop guard; I/O is async.
#[async_trait]
pub trait CacheStore: Send + Sync {
    fn configure(&self, namespace: &str, settings: CacheSettings);
    fn is_configured(&self, namespace: &str) -> bool;
    fn current_namespace(&self) -> String;
    fn switch_namespace(&self, namespace: &str);
    /// Select `namespace` for a scoped operation. Scopes may overlap across
    /// interleaved requests; the namespace active before the first one is
    /// restored when the last one leaves.
    fn enter_namespace(&self, namespace: &str);
    fn leave_namespace(&self);

    async fn read(&self, key: &str, namespace: &str) -> ApplicationResult<Option<String>>;
    async fn write(&self, key: &str, value: &str, namespace: &str) -> ApplicationResult<()>;
    /// Returns whether an entry was removed.
    async fn delete(&self, key: &str, namespace: &str) -> ApplicationResult<bool>;
    async fn clear(&self, namespace: &str) -> ApplicationResult<()>;
}
