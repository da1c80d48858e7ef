// src/application/services/sluggable_route.rs
use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::application::ApplicationResult;
use crate::application::error::ApplicationError;
use crate::application::ports::cache::CacheSettings;
use crate::application::ports::router::PathRouter;
use crate::application::ports::util::PrimaryKeyExtractor;
use crate::application::ports::{
    CacheStorePort, PathRouterPort, PrimaryKeyExtractorPort, SlugGeneratorPort,
};
use crate::application::services::slug_cache::{DEFAULT_NAMESPACE, SlugCache};
use crate::application::services::slug_table::SlugTableBuilder;
use crate::domain::route::{
    BindingMode, ParamTarget, RouteOptions, RouteParams, SourceConfig, UrlParams,
};
use crate::domain::slug::{PrimaryKey, SlugSourceRepository, SlugTable, SourceName};
use crate::infrastructure::util::{DefaultSlugGenerator, LeadingKeyExtractor};

/// A route that swaps record ids for slugs when building paths and slugs
/// for ids when parsing them, on top of a host [`PathRouter`].
///
/// The route itself is shared and immutable; every request works through a
/// [`RouteRequest`] that owns the request-scoped slug tables.
///
/// [`PathRouter`]: crate::application::ports::router::PathRouter
pub struct SluggableRoute {
    router: Arc<PathRouterPort>,
    options: RouteOptions,
    builder: SlugTableBuilder,
    extractor: Arc<PrimaryKeyExtractorPort>,
    store: Arc<CacheStorePort>,
    namespace: String,
    cache_settings: CacheSettings,
}

pub struct SluggableRouteBuilder {
    router: Arc<PathRouterPort>,
    sources: Arc<dyn SlugSourceRepository>,
    store: Arc<CacheStorePort>,
    options: RouteOptions,
    generator: Option<Arc<SlugGeneratorPort>>,
    extractor: Option<Arc<PrimaryKeyExtractorPort>>,
    namespace: String,
    cache_settings: CacheSettings,
}

impl SluggableRouteBuilder {
    #[must_use]
    pub fn options(mut self, options: RouteOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the default formatter. The function receives the raw field
    /// value (key-prefixed when disambiguating) and returns the final slug.
    #[must_use]
    pub fn slug_function(mut self, generator: Arc<SlugGeneratorPort>) -> Self {
        self.generator = Some(generator);
        self
    }

    #[must_use]
    pub fn extract_pk_function(mut self, extractor: Arc<PrimaryKeyExtractorPort>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    #[must_use]
    pub fn cache_namespace(
        mut self,
        namespace: impl Into<String>,
        settings: CacheSettings,
    ) -> Self {
        self.namespace = namespace.into();
        self.cache_settings = settings;
        self
    }

    pub fn build(self) -> SluggableRoute {
        let generator: Arc<SlugGeneratorPort> = match self.generator {
            Some(generator) => generator,
            None => Arc::new(DefaultSlugGenerator::default()),
        };
        let extractor: Arc<PrimaryKeyExtractorPort> = match self.extractor {
            Some(extractor) => extractor,
            None => Arc::new(LeadingKeyExtractor::default()),
        };
        SluggableRoute {
            router: self.router,
            builder: SlugTableBuilder::new(self.sources, generator, self.options.prepend_pk),
            options: self.options,
            extractor,
            store: self.store,
            namespace: self.namespace,
            cache_settings: self.cache_settings,
        }
    }
}

impl SluggableRoute {
    pub fn builder(
        router: Arc<PathRouterPort>,
        sources: Arc<dyn SlugSourceRepository>,
        store: Arc<CacheStorePort>,
    ) -> SluggableRouteBuilder {
        SluggableRouteBuilder {
            router,
            sources,
            store,
            options: RouteOptions::default(),
            generator: None,
            extractor: None,
            namespace: DEFAULT_NAMESPACE.to_string(),
            cache_settings: CacheSettings::default(),
        }
    }

    pub fn options(&self) -> &RouteOptions {
        &self.options
    }

    /// Start a request scope. Tables loaded through it are kept until it is
    /// dropped.
    pub fn request(&self) -> RouteRequest<'_> {
        RouteRequest {
            route: self,
            cache: SlugCache::with_namespace(
                Arc::clone(&self.store),
                self.namespace.clone(),
                self.cache_settings.clone(),
            ),
        }
    }

    /// Parse `path` in a request scope of its own.
    pub async fn parse(&self, path: &str) -> Option<RouteParams> {
        self.request().parse(path).await
    }

    /// Build a path for `url` in a request scope of its own.
    pub async fn url(&self, url: UrlParams) -> Option<String> {
        self.request().url(url).await
    }
}

/// One request's view of a [`SluggableRoute`].
pub struct RouteRequest<'a> {
    route: &'a SluggableRoute,
    cache: SlugCache,
}

impl RouteRequest<'_> {
    pub fn cache(&self) -> &SlugCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut SlugCache {
        &mut self.cache
    }

    fn slug_field(&self, source: &SourceName) -> Option<&str> {
        self.route
            .options
            .model(source)
            .and_then(SourceConfig::slug_field)
    }

    /// The non-empty table of `source`, rebuilding and caching it on a miss.
    /// Unknown or failing sources give `None`.
    async fn table(&mut self, source: &SourceName) -> Option<&SlugTable> {
        if self
            .cache
            .get(source)
            .await
            .is_some_and(|table| !table.is_empty())
        {
            return self.cache.scoped(source);
        }

        let route = self.route;
        let slug_field = route
            .options
            .model(source)
            .and_then(SourceConfig::slug_field);
        match route.builder.build(source, slug_field).await {
            Ok(Some(table)) => {
                self.cache.set(source, table).await;
                self.cache.scoped(source).filter(|table| !table.is_empty())
            }
            Ok(None) => {
                warn!(source = %source, "slug source could not be resolved; skipping");
                None
            }
            Err(err) => {
                warn!(source = %source, error = %err, "failed to build slug table; skipping");
                None
            }
        }
    }

    /// All slugs of `source`, loading or rebuilding them as needed.
    pub async fn slugs(&mut self, source: &SourceName) -> Option<SlugTable> {
        self.table(source).await.cloned()
    }

    /// Rebuild the table of `source` from current data and write it through,
    /// returning its size. Unlike [`Self::slugs`], failures are reported.
    pub async fn warm(&mut self, source: &SourceName) -> ApplicationResult<usize> {
        let table = self
            .route
            .builder
            .build(source, self.slug_field(source))
            .await?
            .ok_or_else(|| ApplicationError::not_found(format!("slug source {source}")))?;
        let entries = table.len();
        self.cache.set(source, table).await;
        Ok(entries)
    }

    /// The slug `pk` would get from current data, ignoring the cache.
    pub async fn generate_slug(&self, source: &SourceName, pk: &PrimaryKey) -> Option<String> {
        let taken = self.cache.scoped(source);
        match self
            .route
            .builder
            .derive_one(source, self.slug_field(source), pk, taken)
            .await
        {
            Ok(slug) => slug,
            Err(err) => {
                warn!(source = %source, pk = %pk, error = %err, "failed to derive slug");
                None
            }
        }
    }

    /// Invalidate the whole table of `source`, or with `Some(pk)` re-derive
    /// just that entry in place (removing it when the record is gone).
    pub async fn invalidate(&mut self, source: &SourceName, pk: Option<&PrimaryKey>) {
        let Some(pk) = pk else {
            self.cache.invalidate(source).await;
            return;
        };
        if self.cache.get(source).await.is_none() {
            debug!(source = %source, pk = %pk, "nothing cached to invalidate");
            return;
        }
        let slug = self.generate_slug(source, pk).await;
        debug!(source = %source, pk = %pk, slug = ?slug, "re-derived single slug");
        self.cache.patch(source, pk, slug).await;
    }

    async fn slug_for(&mut self, source: &SourceName, pk: &PrimaryKey) -> Option<String> {
        if let Some(slug) = self.table(source).await?.get(pk) {
            return Some(slug.to_string());
        }
        if !self.route.options.auto_invalidate {
            return None;
        }
        self.invalidate(source, Some(pk)).await;
        self.cache
            .scoped(source)
            .and_then(|table| table.get(pk))
            .map(str::to_string)
    }

    /// Recover the key of a slug the table does not know yet.
    async fn recover_key(&mut self, source: &SourceName, slug: &str) -> Option<PrimaryKey> {
        let pk = self.route.extractor.extract(slug)?;
        self.invalidate(source, Some(&pk)).await;
        let regenerated = self.cache.scoped(source)?.get(&pk)?;
        (regenerated == slug).then_some(pk)
    }

    /// Translate an incoming path. Slug segments are replaced by their keys
    /// and bound where each source's target says. `None` when the host
    /// router does not match, when there is nothing to translate, or (with
    /// `require_match`) when no segment was a known slug.
    pub async fn parse(&mut self, path: &str) -> Option<RouteParams> {
        let route = self.route;
        let mut params = route.router.parse(path)?;
        if route.options.models.is_empty() || params.pass.is_empty() {
            return None;
        }

        // Segments already translated by an earlier source are left alone.
        let mut segments: Vec<(String, bool)> = std::mem::take(&mut params.pass)
            .into_iter()
            .map(|segment| (segment, false))
            .collect();
        let mut translated = false;
        for model in &route.options.models {
            let Some(table) = self.table(&model.name).await else {
                continue;
            };
            let mut reverse: HashMap<String, PrimaryKey> = table
                .reverse()
                .into_iter()
                .map(|(slug, pk)| (slug.to_string(), pk.clone()))
                .collect();

            let target = model.target(route.options.binding);
            let mut kept = Vec::with_capacity(segments.len());
            let mut folded = Vec::new();
            for (segment, done) in std::mem::take(&mut segments) {
                if done {
                    kept.push((segment, true));
                    continue;
                }
                let pk = match reverse.get(&segment) {
                    Some(pk) => Some(pk.clone()),
                    None if route.options.auto_invalidate => {
                        let recovered = self.recover_key(&model.name, &segment).await;
                        if let Some(pk) = &recovered {
                            reverse.insert(segment.clone(), pk.clone());
                        }
                        recovered
                    }
                    None => None,
                };
                let Some(pk) = pk else {
                    kept.push((segment, false));
                    continue;
                };

                translated = true;
                debug!(source = %model.name, slug = %segment, pk = %pk, "slug translated");
                if route.options.binding == BindingMode::PassedArgs {
                    folded.push((format!("{}:{pk}", model.name), true));
                    continue;
                }
                match &target {
                    ParamTarget::Positional(_) => kept.push((pk.to_string(), true)),
                    ParamTarget::RouteElement(name) => {
                        params.elements.insert(name.clone(), pk.to_string());
                        kept.push((pk.to_string(), true));
                    }
                    ParamTarget::Named(name) => {
                        params.named.insert(name.clone(), pk.to_string());
                    }
                }
            }
            kept.extend(folded);
            segments = kept;
        }
        params.pass = segments.into_iter().map(|(segment, _)| segment).collect();

        if route.options.require_match && !translated {
            return None;
        }
        Some(params)
    }

    /// Build an outgoing path, replacing each source's raw id with its slug
    /// when the table knows it. Unknown ids are left for the host router to
    /// render as they are.
    pub async fn url(&mut self, mut url: UrlParams) -> Option<String> {
        let route = self.route;
        for model in &route.options.models {
            let target = model.target(route.options.binding);
            let raw = match &target {
                ParamTarget::Positional(position) => url.pass.get(*position),
                ParamTarget::RouteElement(name) | ParamTarget::Named(name) => url.keyed.get(name),
            };
            let Some(raw) = raw else {
                continue;
            };
            let pk = PrimaryKey::from_param(raw);
            let Some(slug) = self.slug_for(&model.name, &pk).await else {
                continue;
            };

            match target {
                ParamTarget::Positional(position) => url.pass[position] = slug,
                ParamTarget::RouteElement(name) => {
                    url.keyed.insert(name, slug);
                }
                ParamTarget::Named(name) => {
                    url.keyed.remove(&name);
                    url.pass.push(slug);
                }
            }
        }
        route.router.build(&url)
    }
}
