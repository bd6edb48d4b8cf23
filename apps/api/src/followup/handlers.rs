//! Axum route handlers for the follow-up API.

use axum::{extract::State, Json};

use crate::catalog::load_catalog;
use crate::errors::AppError;
use crate::followup::pipeline::{run_followup, FollowUpRequest, FollowUpResponse};
use crate::state::AppState;

/// POST /api/v1/followups
///
/// Full workflow: call analysis → CRM activity → content selection → email draft.
/// The catalog is read fresh for every run so edits to the file take effect
/// without a restart.
pub async fn handle_followup(
    State(state): State<AppState>,
    Json(request): Json<FollowUpRequest>,
) -> Result<Json<FollowUpResponse>, AppError> {
    let catalog = load_catalog(&state.config.content_file).await?;
    let response = run_followup(
        state.crm.as_ref(),
        state.llm.as_ref(),
        &catalog,
        request,
    )
    .await?;
    Ok(Json(response))
}
