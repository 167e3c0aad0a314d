use std::sync::Arc;

use crate::jobs::catalog::JobCatalog;
use crate::llm_client::CompletionBackend;
use crate::roadmap::library::RoadmapLibrary;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Catalog and library are built once in `main` before the listener binds and are never
/// mutated afterwards.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<JobCatalog>,
    pub library: Arc<RoadmapLibrary>,
    /// Pluggable completion backend. Default: `LlmClient` against `AI_API_URL`.
    pub llm: Arc<dyn CompletionBackend>,
}
