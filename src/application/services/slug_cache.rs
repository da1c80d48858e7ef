// src/application/services/slug_cache.rs
use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::application::ports::CacheStorePort;
use crate::application::ports::cache::{CacheSettings, CacheStore};
use crate::domain::slug::{PrimaryKey, SlugTable, SourceName};

/// Namespace slug tables are kept in unless another one is selected.
pub const DEFAULT_NAMESPACE: &str = "slugger";

/// Holds the store in a namespace and leaves it on drop, on every exit path.
/// Scopes of interleaved requests overlap; the store restores the host's
/// namespace once the last of them is dropped.
pub struct NamespaceScope<'a> {
    store: &'a CacheStorePort,
}

impl<'a> NamespaceScope<'a> {
    pub fn enter(store: &'a CacheStorePort, namespace: &str) -> Self {
        store.enter_namespace(namespace);
        Self { store }
    }
}

impl Drop for NamespaceScope<'_> {
    fn drop(&mut self) {
        self.store.leave_namespace();
    }
}

/// Two-level cache of slug tables: a request-scoped map in front of the
/// persistent store.
///
/// Store failures never propagate: a failed read is a miss and a failed
/// write only costs a rebuild on the next request.
pub struct SlugCache {
    store: Arc<CacheStorePort>,
    namespace: String,
    scoped: HashMap<SourceName, SlugTable>,
}

impl SlugCache {
    pub fn new(store: Arc<CacheStorePort>) -> Self {
        Self::with_namespace(store, DEFAULT_NAMESPACE, CacheSettings::default())
    }

    /// Use `namespace`, configuring it with `settings` unless the store
    /// already knows it.
    pub fn with_namespace(
        store: Arc<CacheStorePort>,
        namespace: impl Into<String>,
        settings: CacheSettings,
    ) -> Self {
        let namespace = namespace.into();
        if !store.is_configured(&namespace) {
            store.configure(&namespace, settings);
        }
        Self {
            store,
            namespace,
            scoped: HashMap::new(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The request-scoped table of `source`, without touching the store.
    pub fn scoped(&self, source: &SourceName) -> Option<&SlugTable> {
        self.scoped.get(source)
    }

    /// Request scope first, then the store; store hits are kept in the
    /// request scope.
    pub async fn get(&mut self, source: &SourceName) -> Option<&SlugTable> {
        if !self.scoped.contains_key(source) {
            let _scope = NamespaceScope::enter(self.store.as_ref(), &self.namespace);
            match self.store.read(&source.cache_key(), &self.namespace).await {
                Ok(Some(raw)) => match serde_json::from_str::<SlugTable>(&raw) {
                    Ok(table) => {
                        debug!(source = %source, entries = table.len(), "slug table loaded from store");
                        self.scoped.insert(source.clone(), table);
                    }
                    Err(err) => {
                        warn!(source = %source, error = %err, "discarding undecodable slug table");
                    }
                },
                Ok(None) => debug!(source = %source, "slug table cache miss"),
                Err(err) => {
                    warn!(source = %source, error = %err, "slug cache read failed; treating as miss");
                }
            }
        }
        self.scoped.get(source)
    }

    /// Replace the table of `source` in both levels.
    pub async fn set(&mut self, source: &SourceName, table: SlugTable) {
        {
            let _scope = NamespaceScope::enter(self.store.as_ref(), &self.namespace);
            match serde_json::to_string(&table) {
                Ok(raw) => {
                    if let Err(err) = self
                        .store
                        .write(&source.cache_key(), &raw, &self.namespace)
                        .await
                    {
                        warn!(source = %source, error = %err, "slug cache write failed");
                    }
                }
                Err(err) => warn!(source = %source, error = %err, "slug table encoding failed"),
            }
        }
        self.scoped.insert(source.clone(), table);
    }

    /// Drop the table of `source` from both levels. Returns whether the
    /// store held one.
    pub async fn invalidate(&mut self, source: &SourceName) -> bool {
        self.scoped.remove(source);
        let _scope = NamespaceScope::enter(self.store.as_ref(), &self.namespace);
        match self
            .store
            .delete(&source.cache_key(), &self.namespace)
            .await
        {
            Ok(removed) => {
                debug!(source = %source, removed, "slug table invalidated");
                removed
            }
            Err(err) => {
                warn!(source = %source, error = %err, "slug cache delete failed");
                false
            }
        }
    }

    /// Patch one entry of an already materialised table: `Some` replaces the
    /// slug of `pk`, `None` removes it. Nothing happens when neither level
    /// holds a table for `source`.
    pub async fn patch(
        &mut self,
        source: &SourceName,
        pk: &PrimaryKey,
        slug: Option<String>,
    ) -> bool {
        let Some(mut table) = self.get(source).await.cloned() else {
            debug!(source = %source, pk = %pk, "no slug table to patch");
            return false;
        };
        match slug {
            Some(slug) => {
                table.insert(pk.clone(), slug);
            }
            None => {
                table.remove(pk);
            }
        }
        self.set(source, table).await;
        true
    }

    /// Empty the whole namespace and the request scope.
    pub async fn clear(&mut self) {
        self.scoped.clear();
        let _scope = NamespaceScope::enter(self.store.as_ref(), &self.namespace);
        if let Err(err) = self.store.clear(&self.namespace).await {
            warn!(namespace = %self.namespace, error = %err, "slug cache clear failed");
        }
    }
}
