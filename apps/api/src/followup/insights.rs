//! Call analysis — turns a raw transcript into structured `CallInsights`.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::AppError;
use crate::followup::prompts::{ANALYSIS_PROMPT_TEMPLATE, ANALYSIS_SYSTEM};
use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::llm_client::{parse_embedded_object, CompletionModel, CompletionRequest};

const ANALYSIS_TEMPERATURE: f32 = 0.9;
const ANALYSIS_MAX_TOKENS: u32 = 2000;

/// Where the lead sits relative to the program.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeadType {
    #[serde(rename = "Full Transitioner")]
    FullTransitioner,
    Upgrader,
    Switcher,
    Advanced,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Overall tone the lead showed on the call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallTone {
    Engaged,
    Skeptical,
    Excited,
    #[default]
    #[serde(other)]
    Neutral,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallInsights {
    pub lead_type_guess: LeadType,
    pub topics: Vec<String>,
    pub objections: Vec<String>,
    pub tone: CallTone,
}

/// Extracts call insights. Unparseable model output yields the default
/// insights (unknown lead type, no topics, neutral tone); a failed LLM call is
/// an error.
pub async fn analyze_call(
    llm: &dyn CompletionModel,
    transcript: &str,
) -> Result<CallInsights, AppError> {
    let request = CompletionRequest {
        system_instructions: format!("{ANALYSIS_SYSTEM} {JSON_ONLY_INSTRUCTION}"),
        user_content: ANALYSIS_PROMPT_TEMPLATE.replace("{transcript}", transcript),
        temperature: ANALYSIS_TEMPERATURE,
        max_output_tokens: ANALYSIS_MAX_TOKENS,
    };

    let raw = llm
        .complete(&request)
        .await
        .map_err(|e| AppError::Llm(format!("Call analysis failed: {e}")))?;

    Ok(parse_embedded_object(&raw).unwrap_or_else(|e| {
        warn!("Call analysis output was not usable JSON ({e}); using defaults");
        CallInsights::default()
    }))
}
