//! TourSync HTTP server.
//!
//! Loads `toursync.toml` (or environment overrides), builds the configured
//! repository, and serves the REST API on `HOST`:`PORT`.

use std::net::SocketAddr;

use anyhow::Context;

use toursync::config::AppConfig;
use toursync::db::RepositoryFactory;
use toursync::http::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "toursync=info,tower_http=info".into()),
        )
        .init();

    let config = AppConfig::from_default_location().context("failed to load configuration")?;
    let repository = RepositoryFactory::create(&config).context("failed to build repository")?;
    let state = AppState::new(repository, config.scheduling.clone());

    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .context("invalid HOST/PORT")?;

    let app = build_router(state);
    tracing::info!("TourSync listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind listener")?;
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
