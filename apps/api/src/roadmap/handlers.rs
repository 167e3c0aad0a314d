//! Axum route handlers for the Roadmap API.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::roadmap::models::Roadmap;
use crate::roadmap::service::{render, resolve, resolve_ai, RenderedRoadmap, ResolvedRoadmap};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TitleQuery {
    pub title: Option<String>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoadmapSource {
    #[default]
    Canonical,
    Ai,
}

#[derive(Debug, Deserialize)]
pub struct DiagramQuery {
    pub title: Option<String>,
    #[serde(default)]
    pub source: RoadmapSource,
}

#[derive(Debug, Serialize)]
pub struct AiRoadmapResponse {
    pub roadmap: Roadmap,
}

fn require_title(title: Option<&str>) -> Result<&str, AppError> {
    title
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::InputMissing("Job title is required".to_string()))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/roadmap?title=
///
/// Canonical roadmap plus job metadata. 404 when the title is not in the catalog.
pub async fn handle_get_roadmap(
    State(state): State<AppState>,
    Query(params): Query<TitleQuery>,
) -> Result<Json<ResolvedRoadmap>, AppError> {
    let title = require_title(params.title.as_deref())?;
    let resolved = resolve(&state.catalog, &state.library, title)?;
    Ok(Json(resolved))
}

/// GET /api/roadmap/ai?title=
///
/// Generated branching roadmap for any title. One upstream call per request.
pub async fn handle_get_ai_roadmap(
    State(state): State<AppState>,
    Query(params): Query<TitleQuery>,
) -> Result<Json<AiRoadmapResponse>, AppError> {
    let title = require_title(params.title.as_deref())?;
    let roadmap = resolve_ai(state.llm.as_ref(), title).await?;
    Ok(Json(AiRoadmapResponse { roadmap }))
}

/// GET /api/roadmap/diagram?title=&source=canonical|ai
///
/// Flowchart text and, for sequential roadmaps, timeline items.
pub async fn handle_get_diagram(
    State(state): State<AppState>,
    Query(params): Query<DiagramQuery>,
) -> Result<Json<RenderedRoadmap>, AppError> {
    let title = require_title(params.title.as_deref())?;
    let roadmap = match params.source {
        RoadmapSource::Canonical => resolve(&state.catalog, &state.library, title)?.roadmap,
        RoadmapSource::Ai => resolve_ai(state.llm.as_ref(), title).await?,
    };
    Ok(Json(render(&roadmap)))
}
