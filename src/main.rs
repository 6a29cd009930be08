use std::sync::Arc;
use std::time::Duration;

use fridge_recipes_api::{
    api::{create_router, AppState, BranchSettings},
    config::Config,
    db::{create_pool, create_redis_client, Cache},
    services::sources::{
        postgres::{PgInventory, PgRecipeStore},
        web::HttpRecipeLookup,
    },
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;

    let pool = create_pool(&config.database_url, config.local_deadline()).await?;
    let (cache, cache_handle) = Cache::new(create_redis_client(&config.redis_url)?);

    let lookup = HttpRecipeLookup::new(
        cache,
        config.recipe_api_url.clone(),
        config.recipe_api_key.clone(),
        config.external_cache_ttl_secs,
        Duration::from_millis(config.external_search_timeout_ms),
        Duration::from_millis(config.external_detail_timeout_ms),
    );

    let state = AppState::new(
        Arc::new(PgRecipeStore::new(pool.clone())),
        Arc::new(lookup),
        Arc::new(PgInventory::new(pool)),
        BranchSettings::from(&config),
    );

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!(
        addr = %config.bind_addr(),
        external_enabled = config.external_enabled,
        local_timeout_ms = config.local_timeout_ms,
        external_timeout_ms = config.external_timeout_ms,
        "Server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cache_handle.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
