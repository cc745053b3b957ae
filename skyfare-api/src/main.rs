use anyhow::Context;
use skyfare_api::{app, AppState};
use skyfare_provider::{AppConfig, SkyScrapperClient};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "skyfare_api=debug,skyfare_search=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load config")?;
    tracing::info!("Starting Skyfare API on port {}", config.server.port);
    tracing::debug!("Provider: {:?}", config.provider);

    let provider = SkyScrapperClient::from_config(&config.provider)
        .context("Failed to build provider client")?;
    let app_state = AppState::new(Arc::new(provider), &config.search);

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}
