mod config;
mod errors;
mod routes;
mod scheduling;
mod state;
mod workflow_client;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;
use crate::workflow_client::WorkflowClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed numeric env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http=info",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Shift API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize workflow client
    let workflow = WorkflowClient::new(&config)?;
    match (&config.workflow_api_url, &config.workflow_api_key) {
        (Some(url), Some(_)) => info!(
            "Workflow client initialized ({url}, generation node: {})",
            config.generation_node_type
        ),
        _ => warn!("WORKFLOW_API_URL or WORKFLOW_API_KEY not set; generation requests will fail"),
    }

    let state = AppState {
        generator: Arc::new(workflow),
    };

    // Build router
    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
