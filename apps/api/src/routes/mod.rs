pub mod health;

use axum::{routing::get, Router};

use crate::jobs::handlers as jobs;
use crate::roadmap::handlers as roadmap;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Jobs API
        .route("/api/jobs", get(jobs::handle_list_jobs))
        // Roadmap API
        .route("/api/roadmap", get(roadmap::handle_get_roadmap))
        .route("/api/roadmap/ai", get(roadmap::handle_get_ai_roadmap))
        .route("/api/roadmap/diagram", get(roadmap::handle_get_diagram))
        .with_state(state)
}
