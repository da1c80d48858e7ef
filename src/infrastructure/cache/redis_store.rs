// src/infrastructure/cache/redis_store.rs
use async_trait::async_trait;
use deadpool_redis::{Config as DeadpoolConfig, Connection, Pool, Runtime};
use redis::AsyncCommands;

use crate::application::ApplicationResult;
use crate::application::error::ApplicationError;
use crate::application::ports::cache::{CacheSettings, CacheStore};
use crate::infrastructure::cache::namespaces::NamespaceRegistry;

/// Redis-backed cache store. Keys are `{prefix}{namespace}:{key}` and every
/// write sets the namespace TTL.
pub struct RedisCacheStore {
    pool: Pool,
    namespaces: NamespaceRegistry,
}

impl RedisCacheStore {
    /// Create a new Redis backed cache store from a redis URL (e.g. redis://:password@host:6379/0)
    pub fn from_url(url: &str) -> Result<Self, ApplicationError> {
        let cfg = DeadpoolConfig::from_url(url);
        let pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|err| ApplicationError::infrastructure(err.to_string()))?;

        Ok(Self {
            pool,
            namespaces: NamespaceRegistry::new(),
        })
    }

    fn key(&self, namespace: &str, key: &str) -> String {
        self.namespaces
            .settings(namespace)
            .prefixed(&format!("{namespace}:{key}"))
    }

    async fn connection(&self) -> ApplicationResult<Connection> {
        self.pool
            .get()
            .await
            .map_err(|err| ApplicationError::infrastructure(err.to_string()))
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
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
        let key = self.key(namespace, key);
        let mut conn = self.connection().await?;
        let value: Option<String> = conn
            .get(key)
            .await
            .map_err(|err| ApplicationError::infrastructure(err.to_string()))?;
        Ok(value)
    }

    async fn write(&self, key: &str, value: &str, namespace: &str) -> ApplicationResult<()> {
        let ttl = self.namespaces.settings(namespace).ttl.as_secs().max(1);
        let mut conn = self.connection().await?;
        conn.set_ex::<_, _, ()>(self.key(namespace, key), value, ttl)
            .await
            .map_err(|err| ApplicationError::infrastructure(err.to_string()))?;
        Ok(())
    }

    async fn delete(&self, key: &str, namespace: &str) -> ApplicationResult<bool> {
        let key = self.key(namespace, key);
        let mut conn = self.connection().await?;
        let removed: i64 = conn
            .del(key)
            .await
            .map_err(|err| ApplicationError::infrastructure(err.to_string()))?;
        Ok(removed > 0)
    }

    async fn clear(&self, namespace: &str) -> ApplicationResult<()> {
        let pattern = self.key(namespace, "*");
        let mut conn = self.connection().await?;
        let keys: Vec<String> = redis::cmd("KEYS")
            .arg(&pattern)
            .query_async(&mut conn)
            .await
            .map_err(|err| ApplicationError::infrastructure(err.to_string()))?;

        if keys.is_empty() {
            return Ok(());
        }

        let _removed: i64 = redis::cmd("DEL")
            .arg(&keys)
            .query_async(&mut conn)
            .await
            .map_err(|err| ApplicationError::infrastructure(err.to_string()))?;
        Ok(())
    }
}
