use anyhow::Context;
use printshop_api::{app, AppState};
use printshop_catalog::{InMemoryDatasetCache, PricingEngine};
use printshop_core::repository::{DatasetCache, NoopDatasetCache};
use printshop_store::app_config::{CacheBackend, Config};
use printshop_store::{DbClient, DbSettingsProvider, RedisClient, RedisDatasetCache, StorePricingRepository};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "printshop_api=debug,printshop_catalog=debug,tower_http=debug,axum::rejection=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Printshop pricing API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url, config.database.max_connections)
        .await
        .context("Failed to connect to Postgres")?;
    if config.database.run_migrations {
        db.migrate().await?;
    }

    let cache: Arc<dyn DatasetCache> = match config.pricing.cache.backend {
        CacheBackend::Memory => Arc::new(InMemoryDatasetCache::new(config.pricing.cache.ttl())),
        CacheBackend::Redis => {
            let redis = config
                .redis
                .as_ref()
                .context("pricing.cache.backend = \"redis\" needs a [redis] section")?;
            let client = RedisClient::new(&redis.url)
                .await
                .context("Failed to connect to Redis")?;
            Arc::new(RedisDatasetCache::new(client, config.pricing.cache.ttl_seconds))
        }
        CacheBackend::None => Arc::new(NoopDatasetCache),
    };
    tracing::info!("Dataset cache backend: {:?}", config.pricing.cache.backend);

    let repo = Arc::new(StorePricingRepository::new(db.pool.clone()));
    let settings = Arc::new(DbSettingsProvider::new(db, config.pricing.shop_settings()));
    let engine = PricingEngine::new(repo.clone(), repo, settings, cache);

    let app = app(AppState::new(engine));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
