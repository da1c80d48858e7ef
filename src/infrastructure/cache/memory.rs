// src/infrastructure/cache/memory.rs
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};

use crate::application::ApplicationResult;
use crate::application::ports::ClockPort;
use crate::application::ports::cache::{CacheSettings, CacheStore};
use crate::infrastructure::cache::namespaces::NamespaceRegistry;
use crate::infrastructure::lock::mutex_lock;
use crate::infrastructure::time::SystemClock;

const SOURCE: &str = "cache::memory";

struct Entry {
    value: String,
    expires_at: Option<DateTime<Utc>>,
}

/// Process-local cache store with per-namespace TTL and key prefix.
pub struct InMemoryCacheStore {
    namespaces: NamespaceRegistry,
    clock: Arc<ClockPort>,
    entries: Mutex<HashMap<String, HashMap<String, Entry>>>,
}

impl Default for InMemoryCacheStore {
    fn default() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clock(clock: Arc<ClockPort>) -> Self {
        Self {
            namespaces: NamespaceRegistry::new(),
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    fn configure(&self, namespace: &str, settings: CacheSettings) {
        self.namespaces.configure(namespace, settings);
    }

    fn is_configured(&self, namespace: &str) -> bool {
        self.namespaces.is_configured(namespace)
    }

    fn current_namespace(&self) -> String {
        self.namespaces.current()
    }

    fn switch_namespace(&self, namespace: &str) {
        self.namespaces.switch(namespace);
    }

    fn enter_namespace(&self, namespace: &str) {
        self.namespaces.enter(namespace);
    }

    fn leave_namespace(&self) {
        self.namespaces.leave();
    }

    async fn read(&self, key: &str, namespace: &str) -> ApplicationResult<Option<String>> {
        let key = self.namespaces.settings(namespace).prefixed(key);
        let now = self.clock.now();
        let mut guard = mutex_lock(&self.entries, SOURCE, "read");
        let Some(entries) = guard.get_mut(namespace) else {
            return Ok(None);
        };
        let expired = match entries.get(&key) {
            None => return Ok(None),
            Some(entry) => entry.expires_at.is_some_and(|at| at <= now),
        };
        if expired {
            entries.remove(&key);
            return Ok(None);
        }
        Ok(entries.get(&key).map(|entry| entry.value.clone()))
    }

    async fn write(&self, key: &str, value: &str, namespace: &str) -> ApplicationResult<()> {
        let settings = self.namespaces.settings(namespace);
        let now = self.clock.now();
        let expires_at = TimeDelta::from_std(settings.ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl));
        let mut guard = mutex_lock(&self.entries, SOURCE, "write");
        let entries = guard.entry(namespace.to_string()).or_default();
        entries.retain(|_, entry| entry.expires_at.is_none_or(|at| at > now));
        entries.insert(
            settings.prefixed(key),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str, namespace: &str) -> ApplicationResult<bool> {
        let key = self.namespaces.settings(namespace).prefixed(key);
        let removed = mutex_lock(&self.entries, SOURCE, "delete")
            .get_mut(namespace)
            .and_then(|entries| entries.remove(&key))
            .is_some();
        Ok(removed)
    }

    async fn clear(&self, namespace: &str) -> ApplicationResult<()> {
        mutex_lock(&self.entries, SOURCE, "clear").remove(namespace);
        Ok(())
    }
}
