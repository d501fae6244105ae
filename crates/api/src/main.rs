use std::sync::Arc;

use anyhow::Context;

use catalog_api::app::{build_app, AppServices};
use catalog_api::rpc;
use catalog_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    catalog_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let services = Arc::new(
        AppServices::from_config(&config)
            .await
            .context("failed to initialize product store")?,
    );

    let rpc_task = match config.rpc_addr {
        Some(addr) => {
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .with_context(|| format!("failed to bind rpc listener on {addr}"))?;
            tracing::info!(%addr, "rpc transport listening");
            let services = services.clone();
            Some(tokio::spawn(async move {
                if let Err(e) = rpc::serve(listener, services).await {
                    tracing::error!(error = %e, "rpc transport stopped");
                }
            }))
        }
        None => None,
    };

    let app = build_app(services.clone());
    let listener = tokio::net::TcpListener::bind(config.http_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.http_addr))?;
    tracing::info!(addr = %listener.local_addr()?, "http transport listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server failed")?;

    if let Some(task) = rpc_task {
        task.abort();
    }
    services.shutdown().await;
    tracing::info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
