use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::crm::pagination::fetch_recent_activities;
use crate::errors::AppError;
use crate::models::activity::ActivityRecord;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct LeadActivitiesResponse {
    pub lead_id: String,
    pub activities: Vec<ActivityRecord>,
}

/// GET /api/v1/leads/:lead_id/activities
///
/// Returns the lead's most recent activities (at most 10). A CRM failure on any
/// page fails the whole request.
pub async fn handle_lead_activities(
    State(state): State<AppState>,
    Path(lead_id): Path<String>,
) -> Result<Json<LeadActivitiesResponse>, AppError> {
    let lead_id = lead_id.trim();
    let activities = fetch_recent_activities(state.crm.as_ref(), lead_id).await?;
    Ok(Json(LeadActivitiesResponse {
        lead_id: lead_id.to_string(),
        activities,
    }))
}
