pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::crm::handlers::handle_lead_activities;
use crate::followup::handlers::handle_followup;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/leads/:lead_id/activities",
            get(handle_lead_activities),
        )
        .route("/api/v1/followups", post(handle_followup))
        .with_state(state)
}
