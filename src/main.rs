use anyhow::Context;
use tracing_subscriber::EnvFilter;

use portal_api::{app, config, is_production, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up SUPABASE_URL, PORT, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("Starting Portal API in {:?} mode", config.environment);
    if is_production!() && config.auth.supabase_url.is_none() {
        tracing::warn!("Running in production without an identity provider; dashboard pages are unreachable");
    }

    let state = AppState::from_config(config)?;
    tracing::info!(
        "Session provider: {} (timeout {:?}), store ids: {:?}",
        state.provider.name(),
        state.provider_timeout,
        state.store.strategy()
    );
    let app = app(state, config)?;

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Portal API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server")?;
    Ok(())
}
