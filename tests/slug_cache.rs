use std::sync::Arc;

mod support;

use slugger_core::application::ports::CacheStorePort;
use slugger_core::application::ports::cache::{CacheSettings, CacheStore};
use slugger_core::application::services::{NamespaceScope, SlugCache, SluggableRoute};
use slugger_core::domain::route::{RouteOptions, UrlParams};
use slugger_core::domain::slug::{PrimaryKey, SlugSourceRepository, SlugTable};
use slugger_core::infrastructure::cache::{HOST_NAMESPACE, InMemoryCacheStore};
use slugger_core::infrastructure::routing::TemplateRoute;
use support::{
    CountingSources, FailingCacheStore, Fixture, UnreachableSources, YieldingCacheStore, source,
};

fn view(id: i64) -> UrlParams {
    UrlParams::new()
        .with("controller", "route_tests")
        .with("action", "view")
        .arg(id)
}

fn route_test_only() -> RouteOptions {
    RouteOptions::for_models(["RouteTest"]).unwrap()
}

#[tokio::test]
async fn tables_are_built_once_and_then_served_from_the_store() {
    let fixture = Fixture::new().await;
    let counting = Arc::new(CountingSources::new(Arc::clone(&fixture.sources)));
    let sources: Arc<dyn SlugSourceRepository> = counting.clone();
    let store: Arc<CacheStorePort> = fixture.store.clone();
    let route = SluggableRoute::builder(
        Arc::new(TemplateRoute::new("/:controller/:action/*")),
        sources,
        store,
    )
    .options(route_test_only())
    .build();

    let mut request = route.request();
    request.url(view(1)).await;
    request.url(view(2)).await;
    assert_eq!(counting.table_reads(), 1);

    route.url(view(3)).await;
    route.parse("/route_tests/view/another-title").await;
    assert_eq!(counting.table_reads(), 1);
}

#[tokio::test]
async fn unreachable_store_degrades_to_rebuilding() {
    let fixture = Fixture::new().await;
    let store: Arc<CacheStorePort> = Arc::new(FailingCacheStore::new());
    let route = SluggableRoute::builder(
        Arc::new(TemplateRoute::new("/:controller/:action/*")),
        Arc::clone(&fixture.sources),
        store,
    )
    .options(route_test_only())
    .build();

    assert_eq!(
        route.url(view(2)).await.as_deref(),
        Some("/route_tests/view/another-title")
    );
    let mut request = route.request();
    request.invalidate(&source("RouteTest"), None).await;
    request.cache_mut().clear().await;
    assert_eq!(
        request.parse("/route_tests/view/another-title").await.map(|p| p.pass),
        Some(vec!["2".to_string()])
    );
}

#[tokio::test]
async fn unreachable_source_renders_raw_ids() {
    let fixture = Fixture::new().await;
    let store: Arc<CacheStorePort> = fixture.store.clone();
    let route = SluggableRoute::builder(
        Arc::new(TemplateRoute::new("/:controller/:action/*")),
        Arc::new(UnreachableSources),
        store,
    )
    .options(route_test_only())
    .build();

    assert_eq!(
        route.url(view(1)).await.as_deref(),
        Some("/route_tests/view/1")
    );
    assert_eq!(
        route.parse("/route_tests/view/a-page-title").await.map(|p| p.pass),
        Some(vec!["a-page-title".to_string()])
    );
}

#[tokio::test]
async fn dedicated_namespace_isolates_tables() {
    let fixture = Fixture::new().await;
    let isolated = fixture
        .route()
        .options(route_test_only())
        .cache_namespace("SluggerTest", CacheSettings::default())
        .build();
    let shared = fixture.route().options(route_test_only()).build();

    isolated.url(view(1)).await;
    assert!(!fixture.store_has("RouteTest_slugs").await);
    assert!(
        fixture
            .store
            .read("RouteTest_slugs", "SluggerTest")
            .await
            .unwrap()
            .is_some()
    );

    shared.url(view(1)).await;
    assert!(fixture.store_has("RouteTest_slugs").await);
}

#[tokio::test]
async fn host_namespace_survives_every_cache_operation() {
    let store = Arc::new(InMemoryCacheStore::new());
    assert_eq!(store.current_namespace(), HOST_NAMESPACE);
    let route_test = source("RouteTest");

    let mut cache = SlugCache::new(store.clone());
    let table: SlugTable = [(PrimaryKey::Int(1), "a-page-title".to_string())]
        .into_iter()
        .collect();
    cache.set(&route_test, table).await;
    cache.get(&route_test).await;
    cache
        .patch(&route_test, &PrimaryKey::Int(1), Some("renamed".into()))
        .await;
    cache.invalidate(&route_test).await;
    cache.clear().await;
    assert_eq!(store.current_namespace(), HOST_NAMESPACE);
}

#[tokio::test]
async fn namespace_scope_restores_on_early_exit() {
    let store: Arc<CacheStorePort> = Arc::new(InMemoryCacheStore::new());

    fn inside(store: &CacheStorePort) -> Option<()> {
        let _scope = NamespaceScope::enter(store, "slugger");
        assert_eq!(store.current_namespace(), "slugger");
        let missing: Option<()> = None;
        missing?;
        Some(())
    }

    assert!(inside(store.as_ref()).is_none());
    assert_eq!(store.current_namespace(), HOST_NAMESPACE);
}

#[tokio::test]
async fn interleaved_requests_restore_the_host_namespace() {
    let fixture = Fixture::new().await;
    let yielding = Arc::new(YieldingCacheStore::new());
    let store: Arc<CacheStorePort> = yielding.clone();
    let route = SluggableRoute::builder(
        Arc::new(TemplateRoute::new("/:controller/:action/*")),
        Arc::clone(&fixture.sources),
        store,
    )
    .options(route_test_only())
    .build();
    assert_eq!(yielding.current_namespace(), HOST_NAMESPACE);

    for _ in 0..3 {
        let (first, second) = tokio::join!(route.url(view(1)), route.url(view(2)));
        assert_eq!(first.as_deref(), Some("/route_tests/view/a-page-title"));
        assert_eq!(second.as_deref(), Some("/route_tests/view/another-title"));
        assert_eq!(yielding.current_namespace(), HOST_NAMESPACE);

        route.request().invalidate(&source("RouteTest"), None).await;
        assert_eq!(yielding.current_namespace(), HOST_NAMESPACE);
    }
}
