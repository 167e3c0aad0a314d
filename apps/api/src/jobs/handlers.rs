//! Axum route handlers for the Jobs API.

use axum::{extract::State, Json};

use crate::jobs::catalog::JobRecord;
use crate::state::AppState;

/// GET /api/jobs
///
/// One entry per distinct job title, in the order the catalog first saw them.
pub async fn handle_list_jobs(State(state): State<AppState>) -> Json<Vec<JobRecord>> {
    Json(state.catalog.all().to_vec())
}
