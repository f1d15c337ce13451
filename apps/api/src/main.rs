mod collaborators;
mod config;
mod errors;
mod intake;
mod interview;
mod models;
mod results;
mod routes;
mod session;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting PrepFlow API v{}", env!("CARGO_PKG_VERSION"));

    // Simulated collaborators stand in for the AI service
    let state = AppState::new(&config);
    info!(
        "Collaborators ready (timeout {}s, technical weight {}, demo scores {}..={})",
        config.collaborator_timeout.as_secs(),
        config.technical_score_weight,
        config.demo_score_min,
        config.demo_score_max
    );

    // Drop sessions nobody has touched for a while
    state
        .sessions
        .spawn_sweeper(config.session_idle_timeout, config.session_sweep_interval);
    info!(
        "Idle sessions expire after {}s",
        config.session_idle_timeout.as_secs()
    );

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
