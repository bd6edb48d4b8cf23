//! Follow-up email drafting.

use serde::Serialize;

use crate::errors::AppError;
use crate::followup::content_selector::SelectedContent;
use crate::followup::insights::CallInsights;
use crate::followup::prompts::{EMAIL_PROMPT_TEMPLATE, EMAIL_SYSTEM_TEMPLATE};
use crate::llm_client::prompts::BRAND_NAME;
use crate::llm_client::{CompletionModel, CompletionRequest};
use crate::models::activity::ActivityRecord;

const EMAIL_TEMPERATURE: f32 = 0.9;
const EMAIL_MAX_TOKENS: u32 = 1000;

/// A drafted follow-up. `text` is the model output as written; `subject` is
/// lifted from a leading `Subject:` line when one is present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FollowUpEmail {
    pub subject: Option<String>,
    pub text: String,
}

impl FollowUpEmail {
    pub fn from_text(text: String) -> Self {
        let subject = text
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .and_then(|line| {
                line.trim_start_matches(['*', '#', ' '])
                    .strip_prefix("Subject:")
                    .map(|s| s.trim().trim_end_matches('*').trim().to_string())
            })
            .filter(|s| !s.is_empty());
        Self { subject, text }
    }
}

pub async fn write_email(
    llm: &dyn CompletionModel,
    crm: Option<&[ActivityRecord]>,
    insights: &CallInsights,
    selected: &[SelectedContent],
) -> Result<FollowUpEmail, AppError> {
    let to_json = |value: serde_json::Result<String>, what: &str| {
        value.map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize {what}: {e}")))
    };
    let crm_json = to_json(serde_json::to_string_pretty(&crm), "CRM data")?;
    let insights_json = to_json(serde_json::to_string_pretty(insights), "insights")?;
    let selected_json = to_json(serde_json::to_string_pretty(selected), "selected content")?;

    let request = CompletionRequest {
        system_instructions: EMAIL_SYSTEM_TEMPLATE.replace("{brand}", BRAND_NAME),
        user_content: EMAIL_PROMPT_TEMPLATE
            .replace("{crm_json}", &crm_json)
            .replace("{insights_json}", &insights_json)
            .replace("{selected_json}", &selected_json)
            .replace("{brand}", BRAND_NAME),
        temperature: EMAIL_TEMPERATURE,
        max_output_tokens: EMAIL_MAX_TOKENS,
    };

    let text = llm
        .complete(&request)
        .await
        .map_err(|e| AppError::Llm(format!("Email generation failed: {e}")))?;

    Ok(FollowUpEmail::from_text(text))
}
