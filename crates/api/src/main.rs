use std::sync::Arc;

use anyhow::Context;

use vtrans_api::app::{self, services::AppServices};
use vtrans_infra::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    vtrans_observability::init();

    let config = ServerConfig::from_env().context("invalid server configuration")?;
    let services = Arc::new(AppServices::start(&config)?);

    let app = app::build_app(services.clone());

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    services.shutdown();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
