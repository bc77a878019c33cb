//! BioStructX Web Server
//!
//! Run with: cargo run -p biostructx-web

use anyhow::Context;
use biostructx_common::AppConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("biostructx=debug,info")),
        )
        .init();

    info!("Starting BioStructX web server...");

    let config = AppConfig::load().context("loading configuration")?;
    let bind = config.server.bind.clone();

    let state = biostructx_web::state::AppState::from_config(config)?;
    let app = biostructx_web::router::build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("binding {}", bind))?;
    info!("🚀 Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
