// src/config.rs
use std::{env, time::Duration};
use thiserror::Error;

use crate::application::ports::cache::{CacheSettings, DEFAULT_KEY_PREFIX, DEFAULT_TTL};
use crate::application::services::DEFAULT_NAMESPACE;
use crate::domain::slug::SourceName;

/// Store the slug cache lives in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CacheEngine {
    /// Process-local; gone when the process exits.
    #[default]
    Memory,
    Redis,
}

#[derive(Clone, Debug)]
pub struct SluggerConfig {
    database_url: String,
    cache_engine: CacheEngine,
    redis_url: Option<String>,
    cache_namespace: String,
    cache_prefix: String,
    cache_ttl: Duration,
    sources: Vec<SourceName>,
    prepend_pk: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

fn default_database_url() -> String {
    "sqlite://slugger.db".into()
}

fn parse_engine(raw: &str) -> Result<CacheEngine, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "memory" => Ok(CacheEngine::Memory),
        "redis" => Ok(CacheEngine::Redis),
        other => Err(ConfigError::Invalid(format!(
            "SLUGGER_CACHE_ENGINE must be `memory` or `redis`, got `{other}`"
        ))),
    }
}

fn parse_sources(raw: &str) -> Result<Vec<SourceName>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| SourceName::new(name).map_err(|err| ConfigError::Invalid(err.to_string())))
        .collect()
}

fn parse_flag(raw: &str) -> bool {
    raw == "1" || raw.eq_ignore_ascii_case("true")
}

impl SluggerConfig {
    /// Build configuration from environment variables. Only `REDIS_URL` is
    /// required, and only with the redis engine.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| default_database_url());
        let cache_engine = env::var("SLUGGER_CACHE_ENGINE")
            .ok()
            .map(|raw| parse_engine(&raw))
            .transpose()?
            .unwrap_or_default();

        let redis_url = env::var("REDIS_URL").ok().filter(|url| !url.trim().is_empty());
        if cache_engine == CacheEngine::Redis && redis_url.is_none() {
            return Err(ConfigError::Missing("REDIS_URL"));
        }

        let cache_namespace = env::var("SLUGGER_CACHE_NAMESPACE")
            .ok()
            .filter(|ns| !ns.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
        let cache_prefix =
            env::var("SLUGGER_CACHE_PREFIX").unwrap_or_else(|_| DEFAULT_KEY_PREFIX.to_string());

        let cache_ttl = match env::var("SLUGGER_CACHE_TTL_SECONDS") {
            Ok(raw) => raw.trim().parse::<u64>().map(Duration::from_secs).map_err(|_| {
                ConfigError::Invalid(format!(
                    "SLUGGER_CACHE_TTL_SECONDS must be a number of seconds, got `{raw}`"
                ))
            })?,
            Err(_) => DEFAULT_TTL,
        };

        let sources = env::var("SLUGGER_SOURCES")
            .ok()
            .map(|raw| parse_sources(&raw))
            .transpose()?
            .unwrap_or_default();

        let prepend_pk = env::var("SLUGGER_PREPEND_PK")
            .ok()
            .is_some_and(|raw| parse_flag(&raw));

        Ok(Self {
            database_url,
            cache_engine,
            redis_url,
            cache_namespace,
            cache_prefix,
            cache_ttl,
            sources,
            prepend_pk,
        })
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn cache_engine(&self) -> CacheEngine {
        self.cache_engine
    }

    pub fn redis_url(&self) -> Option<&str> {
        self.redis_url.as_deref()
    }

    pub fn cache_namespace(&self) -> &str {
        &self.cache_namespace
    }

    /// Settings the dedicated namespace is configured with.
    pub fn cache_settings(&self) -> CacheSettings {
        CacheSettings {
            ttl: self.cache_ttl,
            key_prefix: self.cache_prefix.clone(),
        }
    }

    /// Sources the maintenance commands act on.
    pub fn sources(&self) -> &[SourceName] {
        &self.sources
    }

    pub fn prepend_pk(&self) -> bool {
        self.prepend_pk
    }
}
