mod config;
mod errors;
mod jobs;
mod llm_client;
mod roadmap;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::jobs::catalog::JobCatalog;
use crate::llm_client::LlmClient;
use crate::roadmap::library::{RoadmapLibrary, SelectionPolicy};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Roadmap API v{}", env!("CARGO_PKG_VERSION"));

    // Load flat data sources before serving; both are read-only for the process lifetime.
    let catalog = JobCatalog::load_with_policy(&config.jobs_csv_path, config.jobs_load_policy)
        .with_context(|| {
            format!(
                "Failed to load jobs from {} (JOBS_LOAD_POLICY={})",
                config.jobs_csv_path.display(),
                config.jobs_load_policy
            )
        })?;

    let library = RoadmapLibrary::load(&config.roadmaps_path, config.roadmap_selection)
        .with_context(|| {
            format!(
                "Failed to load roadmaps from {}",
                config.roadmaps_path.display()
            )
        })?;
    if library.policy() == SelectionPolicy::Fixed {
        warn!("ROADMAP_SELECTION=fixed: every job is served the default roadmap");
    } else {
        info!("Roadmap selection policy: {}", library.policy());
    }

    // Initialize LLM client
    let llm = LlmClient::new(
        config.ai_api_url.clone(),
        config.ai_model.clone(),
        config.ai_api_key.clone(),
    );
    info!("LLM client initialized (model: {})", llm.model());

    // Build app state
    let state = AppState {
        catalog: Arc::new(catalog),
        library: Arc::new(library),
        llm: Arc::new(llm),
    };

    // Build router; when STATIC_DIR is set, anything not matched by the API is served from it
    let mut app = build_router(state);
    if let Some(dir) = &config.static_dir {
        info!("Serving static files from {}", dir.display());
        app = app.fallback_service(ServeDir::new(dir));
    }
    let app = app
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
