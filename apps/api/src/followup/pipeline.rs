//! Follow-up pipeline — orchestrates one post-call nurture run.
//!
//! Flow: analyze_call → resolve lead → fetch_recent_activities →
//!       select_content → write_email.
//!
//! CRM problems never fail the run: the follow-up is still drafted, without
//! CRM context, and `crm_status` says why. LLM failures do fail the run.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::crm::pagination::fetch_recent_activities;
use crate::crm::CrmBackend;
use crate::errors::AppError;
use crate::followup::content_selector::{select_content, SelectedContent};
use crate::followup::email::{write_email, FollowUpEmail};
use crate::followup::insights::{analyze_call, CallInsights};
use crate::llm_client::CompletionModel;
use crate::models::activity::ActivityRecord;
use crate::models::content::ContentEntry;

/// Request body for a follow-up run. One of `lead_id` or `lead_email` is required.
#[derive(Debug, Clone, Deserialize)]
pub struct FollowUpRequest {
    pub transcript: String,
    #[serde(default)]
    pub lead_email: Option<String>,
    #[serde(default)]
    pub lead_id: Option<String>,
}

/// Outcome of the CRM lookup for this run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CrmStatus {
    Found { activity_count: usize },
    NoActivity,
    LeadNotFound,
    Unavailable { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct FollowUpResponse {
    pub insights: CallInsights,
    pub crm_status: CrmStatus,
    pub crm_activities: Option<Vec<ActivityRecord>>,
    pub selected_content: Vec<SelectedContent>,
    pub email: FollowUpEmail,
}

/// Runs the full follow-up workflow for one call.
pub async fn run_followup(
    crm: &dyn CrmBackend,
    llm: &dyn CompletionModel,
    catalog: &[ContentEntry],
    request: FollowUpRequest,
) -> Result<FollowUpResponse, AppError> {
    if request.transcript.trim().is_empty() {
        return Err(AppError::Validation("transcript cannot be empty".to_string()));
    }

    let lead = LeadRef::from_request(&request).ok_or_else(|| {
        AppError::Validation("either lead_id or lead_email is required".to_string())
    })?;

    // Step 1: call analysis
    let insights = analyze_call(llm, &request.transcript).await?;
    info!(
        "Call analyzed: lead_type={:?} tone={:?}",
        insights.lead_type_guess, insights.tone
    );

    // Step 2: CRM context
    let (crm_activities, crm_status) = gather_crm_context(crm, &lead).await;
    info!("CRM lookup for {}: {:?}", lead, crm_status);

    // Step 3: content selection
    let selected_content = select_content(
        llm,
        &request.transcript,
        crm_activities.as_deref(),
        catalog,
    )
    .await?;

    // Step 4: email
    let email = write_email(
        llm,
        crm_activities.as_deref(),
        &insights,
        &selected_content,
    )
    .await?;

    Ok(FollowUpResponse {
        insights,
        crm_status,
        crm_activities,
        selected_content,
        email,
    })
}

/// How the caller identified the lead.
#[derive(Debug, Clone, PartialEq)]
enum LeadRef {
    Id(String),
    Email(String),
}

impl LeadRef {
    fn from_request(request: &FollowUpRequest) -> Option<Self> {
        let non_empty = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        non_empty(&request.lead_id)
            .map(LeadRef::Id)
            .or_else(|| non_empty(&request.lead_email).map(LeadRef::Email))
    }
}

impl std::fmt::Display for LeadRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeadRef::Id(id) => write!(f, "lead {id}"),
            LeadRef::Email(email) => write!(f, "email {email}"),
        }
    }
}

async fn gather_crm_context(
    crm: &dyn CrmBackend,
    lead: &LeadRef,
) -> (Option<Vec<ActivityRecord>>, CrmStatus) {
    let lead_id = match lead {
        LeadRef::Id(id) => id.clone(),
        LeadRef::Email(email) => match crm.find_lead_id(email).await {
            Ok(Some(id)) => id,
            Ok(None) => return (None, CrmStatus::LeadNotFound),
            Err(e) => {
                warn!("Lead lookup failed for {email}: {e}");
                return (
                    None,
                    CrmStatus::Unavailable {
                        reason: e.to_string(),
                    },
                );
            }
        },
    };

    match fetch_recent_activities(crm, &lead_id).await {
        Ok(activities) if activities.is_empty() => (Some(activities), CrmStatus::NoActivity),
        Ok(activities) => {
            let status = CrmStatus::Found {
                activity_count: activities.len(),
            };
            (Some(activities), status)
        }
        Err(e) => {
            warn!("Activity fetch failed for lead {lead_id}: {e}");
            (
                None,
                CrmStatus::Unavailable {
                    reason: e.to_string(),
                },
            )
        }
    }
}
