use anyhow::{Result, bail};
use slugger_core::application::ports::{CacheStorePort, PathRouterPort};
use slugger_core::application::services::SluggableRoute;
use slugger_core::config::{CacheEngine, ConfigError, SluggerConfig};
use slugger_core::domain::route::{RouteOptions, SourceOptions};
use slugger_core::domain::slug::{PrimaryKey, SlugSourceRepository, SourceName};
use slugger_core::infrastructure::{
    cache::RedisCacheStore,
    database,
    repositories::SqliteSlugSources,
    routing::TemplateRoute,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "usage: slugger [warm | clear | invalidate <source> [pk]]";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Warm,
    Clear,
    Invalidate {
        source: SourceName,
        pk: Option<PrimaryKey>,
    },
}

impl Command {
    fn from_args(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let command = match args.next().as_deref() {
            None | Some("warm") => Self::Warm,
            Some("clear") => Self::Clear,
            Some("invalidate") => {
                let Some(source) = args.next() else {
                    bail!("{USAGE}");
                };
                Self::Invalidate {
                    source: SourceName::new(source)?,
                    pk: args.next().as_deref().map(PrimaryKey::from_param),
                }
            }
            Some(other) => bail!("unknown command `{other}`\n{USAGE}"),
        };
        if args.next().is_some() {
            bail!("{USAGE}");
        }
        Ok(command)
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = bootstrap().await {
        tracing::error!(error = %err, "fatal error");
        eprintln!("fatal error: {err}");
        std::process::exit(1);
    }
}

async fn bootstrap() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let command = Command::from_args(std::env::args().skip(1))?;
    let config = SluggerConfig::from_env()?;
    let store = shared_store(config.cache_engine(), config.redis_url())?;

    let pool = Arc::new(database::init_pool(config.database_url()).await?);
    let sources: Arc<dyn SlugSourceRepository> = Arc::new(SqliteSlugSources::new(pool));
    let router: Arc<PathRouterPort> = Arc::new(TemplateRoute::new("/:controller/:action/*"));

    let options = config
        .sources()
        .iter()
        .fold(RouteOptions::default(), |options, source| {
            options.with_model(source.clone(), SourceOptions::default())
        })
        .with_prepend_pk(config.prepend_pk());
    let route = SluggableRoute::builder(router, sources, store)
        .options(options)
        .cache_namespace(config.cache_namespace(), config.cache_settings())
        .build();
    let mut request = route.request();

    match command {
        Command::Warm => {
            if config.sources().is_empty() {
                tracing::warn!("SLUGGER_SOURCES is empty; nothing to warm");
            }
            for source in config.sources() {
                let entries = request.warm(source).await?;
                tracing::info!(source = %source, entries, "slug table warmed");
            }
        }
        Command::Clear => {
            request.cache_mut().clear().await;
            tracing::info!(namespace = config.cache_namespace(), "slug cache cleared");
        }
        Command::Invalidate { source, pk } => {
            request.invalidate(&source, pk.as_ref()).await;
            tracing::info!(source = %source, pk = ?pk, "slug cache invalidated");
        }
    }

    Ok(())
}

/// The store the commands act on. It has to be the one the routes read
/// from, so a process-local engine is refused.
fn shared_store(engine: CacheEngine, redis_url: Option<&str>) -> Result<Arc<CacheStorePort>> {
    match (engine, redis_url) {
        (CacheEngine::Redis, Some(url)) => {
            let store: Arc<CacheStorePort> = Arc::new(RedisCacheStore::from_url(url)?);
            Ok(store)
        }
        (CacheEngine::Redis, None) => Err(ConfigError::Missing("REDIS_URL").into()),
        (CacheEngine::Memory, _) => bail!(
            "the memory cache engine lives and dies with this process; \
             set SLUGGER_CACHE_ENGINE=redis to act on the shared slug cache"
        ),
    }
}

fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG")
        .ok()
        .unwrap_or_else(|| "info,sqlx=warn".to_string());

    let subscriber = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(env_filter))
        .with(tracing_subscriber::fmt::layer());

    if subscriber.try_init().is_err() {
        tracing::warn!("tracing subscriber already initialised");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slugger_core::application::ports::cache::CacheStore;

    fn parse(args: &[&str]) -> Result<Command> {
        Command::from_args(args.iter().map(|arg| (*arg).to_string()))
    }

    #[test]
    fn warm_is_the_default_command() {
        assert_eq!(parse(&[]).unwrap(), Command::Warm);
        assert_eq!(parse(&["warm"]).unwrap(), Command::Warm);
        assert_eq!(parse(&["clear"]).unwrap(), Command::Clear);
    }

    #[test]
    fn invalidate_takes_a_source_and_optional_key() {
        assert_eq!(
            parse(&["invalidate", "RouteTest", "2"]).unwrap(),
            Command::Invalidate {
                source: SourceName::new("RouteTest").unwrap(),
                pk: Some(PrimaryKey::Int(2)),
            }
        );
        assert!(parse(&["invalidate"]).is_err());
        assert!(parse(&["invalidate", "RouteTest", "2", "3"]).is_err());
        assert!(parse(&["rebuild"]).is_err());
    }

    #[tokio::test]
    async fn commands_need_a_shared_store() {
        let err = shared_store(CacheEngine::Memory, None).err().unwrap();
        assert!(err.to_string().contains("SLUGGER_CACHE_ENGINE=redis"));
        assert!(shared_store(CacheEngine::Memory, Some("redis://127.0.0.1:6379/0")).is_err());

        let err = shared_store(CacheEngine::Redis, None).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::Missing("REDIS_URL"))
        ));

        let store = shared_store(CacheEngine::Redis, Some("redis://127.0.0.1:6379/0")).unwrap();
        assert_eq!(store.current_namespace(), "default");
    }
}
