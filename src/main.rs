use anyhow::Context;
use medstudy_pdf::{app, build_state, config::Config};
use std::net::SocketAddr;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Init tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let config = Config::from_env();
    tracing::info!(
        region = %config.service_region,
        bucket = %config.storage_bucket,
        renderer = ?config.default_renderer,
        browser = config.chromium_path.is_some(),
        "Loaded configuration"
    );
    tokio::fs::create_dir_all(&config.materials_dir)
        .await
        .with_context(|| format!("creating materials dir {}", config.materials_dir.display()))?;

    let state = build_state(&config);
    let router = app(state, config.max_upload_bytes);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(%addr, "Starting server");
    let listener = tokio::net::TcpListener::bind(addr).await.with_context(|| format!("binding {addr}"))?;
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await?;
    Ok(())
}
