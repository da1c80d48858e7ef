// tests/support/mocks.rs
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use slugger_core::application::ApplicationResult;
use slugger_core::application::error::ApplicationError;
use slugger_core::application::ports::cache::{CacheSettings, CacheStore};
use slugger_core::domain::errors::{DomainError, DomainResult};
use slugger_core::domain::slug::{
    PrimaryKey, SlugRow, SlugSourceRepository, SourceName, SourceSchema,
};
use slugger_core::infrastructure::cache::{InMemoryCacheStore, NamespaceRegistry};

/// Cache store whose I/O always fails, as an unreachable Redis would.
pub struct FailingCacheStore {
    namespaces: NamespaceRegistry,
}

impl FailingCacheStore {
    pub fn new() -> Self {
        Self {
            namespaces: NamespaceRegistry::new(),
        }
    }
}

#[async_trait]
impl CacheStore for FailingCacheStore {
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

    async fn read(&self, _key: &str, _namespace: &str) -> ApplicationResult<Option<String>> {
        Err(ApplicationError::infrastructure("connection refused"))
    }

    async fn write(&self, _key: &str, _value: &str, _namespace: &str) -> ApplicationResult<()> {
        Err(ApplicationError::infrastructure("connection refused"))
    }

    async fn delete(&self, _key: &str, _namespace: &str) -> ApplicationResult<bool> {
        Err(ApplicationError::infrastructure("connection refused"))
    }

    async fn clear(&self, _namespace: &str) -> ApplicationResult<()> {
        Err(ApplicationError::infrastructure("connection refused"))
    }
}

/// In-memory store that yields to the scheduler before every I/O call, so
/// concurrent requests interleave at each await.
pub struct YieldingCacheStore {
    inner: InMemoryCacheStore,
}

impl YieldingCacheStore {
    pub fn new() -> Self {
        Self {
            inner: InMemoryCacheStore::new(),
        }
    }
}

#[async_trait]
impl CacheStore for YieldingCacheStore {
    fn configure(&self, namespace: &str, settings: CacheSettings) {
        self.inner.configure(namespace, settings);
    }

    fn is_configured(&self, namespace: &str) -> bool {
        self.inner.is_configured(namespace)
    }

    fn current_namespace(&self) -> String {
        self.inner.current_namespace()
    }

    fn switch_namespace(&self, namespace: &str) {
        self.inner.switch_namespace(namespace);
    }

    fn enter_namespace(&self, namespace: &str) {
        self.inner.enter_namespace(namespace);
    }

    fn leave_namespace(&self) {
        self.inner.leave_namespace();
    }

    async fn read(&self, key: &str, namespace: &str) -> ApplicationResult<Option<String>> {
        tokio::task::yield_now().await;
        self.inner.read(key, namespace).await
    }

    async fn write(&self, key: &str, value: &str, namespace: &str) -> ApplicationResult<()> {
        tokio::task::yield_now().await;
        self.inner.write(key, value, namespace).await
    }

    async fn delete(&self, key: &str, namespace: &str) -> ApplicationResult<bool> {
        tokio::task::yield_now().await;
        self.inner.delete(key, namespace).await
    }

    async fn clear(&self, namespace: &str) -> ApplicationResult<()> {
        tokio::task::yield_now().await;
        self.inner.clear(namespace).await
    }
}

/// Wraps a repository and counts full-table reads.
pub struct CountingSources {
    inner: Arc<dyn SlugSourceRepository>,
    rows: AtomicUsize,
}

impl CountingSources {
    pub fn new(inner: Arc<dyn SlugSourceRepository>) -> Self {
        Self {
            inner,
            rows: AtomicUsize::new(0),
        }
    }

    pub fn table_reads(&self) -> usize {
        self.rows.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SlugSourceRepository for CountingSources {
    async fn schema(&self, source: &SourceName) -> DomainResult<Option<SourceSchema>> {
        self.inner.schema(source).await
    }

    async fn rows(&self, schema: &SourceSchema, field: &str) -> DomainResult<Vec<SlugRow>> {
        self.rows.fetch_add(1, Ordering::SeqCst);
        self.inner.rows(schema, field).await
    }

    async fn row(
        &self,
        schema: &SourceSchema,
        field: &str,
        pk: &PrimaryKey,
    ) -> DomainResult<Option<SlugRow>> {
        self.inner.row(schema, field, pk).await
    }
}

/// Repository whose every source is unreachable.
pub struct UnreachableSources;

#[async_trait]
impl SlugSourceRepository for UnreachableSources {
    async fn schema(&self, _source: &SourceName) -> DomainResult<Option<SourceSchema>> {
        Err(DomainError::Persistence("database is locked".into()))
    }

    async fn rows(&self, _schema: &SourceSchema, _field: &str) -> DomainResult<Vec<SlugRow>> {
        Err(DomainError::Persistence("database is locked".into()))
    }

    async fn row(
        &self,
        _schema: &SourceSchema,
        _field: &str,
        _pk: &PrimaryKey,
    ) -> DomainResult<Option<SlugRow>> {
        Err(DomainError::Persistence("database is locked".into()))
    }
}
