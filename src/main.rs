use std::sync::Arc;

use anyhow::Context;
use series_tracker::{
    api::{create_router, AppState},
    auth::{AuthProvider, HostedAuth, StaticTokenAuth},
    config::{Config, StoreBackend},
    db::{create_pool, HostedStore, InMemoryStore, PgStore, TrackerStore},
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("series_tracker=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;
    let state = build_state(&config).await?;

    tracing::info!(
        store = state.store.name(),
        auth = state.auth.name(),
        "Application state initialized"
    );

    let app = create_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    tracing::info!(address = %address, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Wires the configured store backend with its matching auth provider
async fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let dev_auth = || -> anyhow::Result<Arc<dyn AuthProvider>> {
        Ok(Arc::new(StaticTokenAuth::new(config.dev_token_table()?)))
    };

    let state = match config.store_backend {
        StoreBackend::Memory => AppState::new(Arc::new(InMemoryStore::new()), dev_auth()?),
        StoreBackend::Postgres => {
            let pool = create_pool(&config.database_url, config.database_max_connections).await?;
            let store = PgStore::new(pool);
            store.migrate().await?;
            AppState::new(Arc::new(store), dev_auth()?)
        }
        StoreBackend::Hosted => {
            let (url, key) = config.hosted_credentials()?;
            let http_client = reqwest::Client::new();
            AppState::new(
                Arc::new(HostedStore::new(http_client.clone(), url.clone(), key.clone())),
                Arc::new(HostedAuth::new(http_client, url, key)),
            )
        }
    };

    Ok(state)
}
