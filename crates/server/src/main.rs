use anyhow::{Context, Result};
use lure_server::{app, AppState, ServerConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::from_env().context("invalid server configuration")?;

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lure_server=info,tower_http=info".into()),
        )
        .compact()
        .init();

    if config.anthropic_api_key.is_none() {
        tracing::warn!("ANTHROPIC_API_KEY not set, /api/chat will answer with a configuration error");
    }

    let addr = config.bind_addr;
    info!("Allowing cross-origin requests from {:?}", config.allowed_origin);
    let router = app(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server running on http://{}", addr);

    axum::serve(listener, router)
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
}
