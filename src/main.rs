//! Item Keeper server

use item_keeper::{create_app, AppConfig, AppState, Storage};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let config = AppConfig::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("item_keeper={},tower_http={}", config.log_level, config.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    config.validate()?;

    info!("Listen: {}", config.listen_addr);
    info!("Token TTL: {}s", config.token_ttl);
    info!(
        "Storage: {}",
        if config.database_url.is_some() {
            "postgres"
        } else {
            "memory"
        }
    );

    let storage = Storage::from_config(&config).await?;
    let state = AppState::new(&config, storage)?;
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!("HTTP server started on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
