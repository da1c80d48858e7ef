// tests/support/helpers.rs
use std::sync::Arc;

use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

use slugger_core::application::ports::cache::CacheStore;
use slugger_core::application::ports::{CacheStorePort, PathRouterPort};
use slugger_core::application::services::{DEFAULT_NAMESPACE, SluggableRoute, SluggableRouteBuilder};
use slugger_core::domain::slug::{SlugSourceRepository, SourceName};
use slugger_core::infrastructure::cache::InMemoryCacheStore;
use slugger_core::infrastructure::repositories::SqliteSlugSources;
use slugger_core::infrastructure::routing::TemplateRoute;

pub const DEFAULT_TEMPLATE: &str = "/:controller/:action/*";

/// A private in-memory database seeded with the `route_tests` and
/// `route_two_tests` tables. One connection, so every query sees the same
/// database.
pub async fn fixture_pool() -> Arc<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("open in-memory sqlite");

    for statement in [
        "CREATE TABLE route_tests (id INTEGER PRIMARY KEY AUTOINCREMENT, title VARCHAR(50), name VARCHAR(50))",
        "CREATE TABLE route_two_tests (id INTEGER PRIMARY KEY AUTOINCREMENT, title VARCHAR(50), name VARCHAR(50))",
        "INSERT INTO route_tests (id, title, name) VALUES (1, 'A page title', 'Page Title'), (2, 'Another title', 'Routing is fun!'), (3, 'I love CakePHP', 'Cake rocks')",
        "INSERT INTO route_two_tests (id, title, name) VALUES (1, 'My Blog Post', 'First post')",
    ] {
        sqlx::query(statement)
            .execute(&pool)
            .await
            .expect("seed fixture");
    }

    Arc::new(pool)
}

/// Insert a `route_tests` record and return its id.
pub async fn insert_route_test(pool: &SqlitePool, title: &str, name: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO route_tests (title, name) VALUES (?, ?) RETURNING id")
        .bind(title)
        .bind(name)
        .fetch_one(pool)
        .await
        .expect("insert route_test")
}

pub async fn set_route_test_title(pool: &SqlitePool, id: i64, title: &str) {
    sqlx::query("UPDATE route_tests SET title = ? WHERE id = ?")
        .bind(title)
        .bind(id)
        .execute(pool)
        .await
        .expect("update route_test");
}

pub async fn delete_route_tests(pool: &SqlitePool) {
    sqlx::query("DELETE FROM route_tests WHERE id > 0")
        .execute(pool)
        .await
        .expect("delete route_tests");
}

pub fn source(name: &str) -> SourceName {
    SourceName::new(name).expect("valid source name")
}

/// Everything a sluggable route needs, backed by the fixture database and a
/// fresh in-memory cache store.
pub struct Fixture {
    pub pool: Arc<SqlitePool>,
    pub sources: Arc<dyn SlugSourceRepository>,
    pub store: Arc<InMemoryCacheStore>,
}

impl Fixture {
    pub async fn new() -> Self {
        let pool = fixture_pool().await;
        let sources: Arc<dyn SlugSourceRepository> =
            Arc::new(SqliteSlugSources::new(Arc::clone(&pool)));
        Self {
            pool,
            sources,
            store: Arc::new(InMemoryCacheStore::new()),
        }
    }

    /// Builder for a route on `template` sharing this fixture's store.
    pub fn route_on(&self, template: TemplateRoute) -> SluggableRouteBuilder {
        let router: Arc<PathRouterPort> = Arc::new(template);
        let store: Arc<CacheStorePort> = self.store.clone();
        SluggableRoute::builder(router, Arc::clone(&self.sources), store)
    }

    /// Whether the store holds `key` in the default slug namespace.
    pub async fn store_has(&self, key: &str) -> bool {
        matches!(self.store.read(key, DEFAULT_NAMESPACE).await, Ok(Some(_)))
    }

    pub fn route(&self) -> SluggableRouteBuilder {
        self.route_on(TemplateRoute::new(DEFAULT_TEMPLATE))
    }
}
