//! Content Selector — asks the model to pick nurture content from the catalog.
//!
//! Model picks are validated against the catalog: a link the catalog does not
//! contain is dropped, as is a repeat of an already-selected link.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::followup::prompts::{SELECTION_PROMPT_TEMPLATE, SELECTION_SYSTEM_TEMPLATE};
use crate::llm_client::prompts::{BRAND_NAME, JSON_ONLY_INSTRUCTION};
use crate::llm_client::{parse_embedded_array, CompletionModel, CompletionRequest};
use crate::models::activity::ActivityRecord;
use crate::models::content::ContentEntry;

const SELECTION_TEMPERATURE: f32 = 0.9;
const SELECTION_MAX_TOKENS: u32 = 3000;

/// Upper bound on pieces of content attached to one follow-up.
pub const MAX_SELECTED: usize = 4;

/// A catalog item chosen for the follow-up, with the model's reasoning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedContent {
    pub topic: String,
    #[serde(default)]
    pub reason: String,
    pub link: String,
}

/// Selects up to `MAX_SELECTED` catalog items for this lead.
///
/// `crm` is `None` when CRM activity could not be retrieved; the model is told
/// so explicitly. Unparseable output yields an empty selection.
pub async fn select_content(
    llm: &dyn CompletionModel,
    transcript: &str,
    crm: Option<&[ActivityRecord]>,
    catalog: &[ContentEntry],
) -> Result<Vec<SelectedContent>, AppError> {
    if catalog.is_empty() {
        warn!("Content catalog is empty; skipping selection");
        return Ok(Vec::new());
    }

    let crm_json = serde_json::to_string_pretty(&crm)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize CRM data: {e}")))?;
    let catalog_json = serde_json::to_string_pretty(catalog)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize catalog: {e}")))?;

    let system = SELECTION_SYSTEM_TEMPLATE.replace("{brand}", BRAND_NAME);
    let request = CompletionRequest {
        system_instructions: format!("{system} {JSON_ONLY_INSTRUCTION}"),
        user_content: SELECTION_PROMPT_TEMPLATE
            .replace("{transcript}", transcript)
            .replace("{crm_json}", &crm_json)
            .replace("{catalog_json}", &catalog_json),
        temperature: SELECTION_TEMPERATURE,
        max_output_tokens: SELECTION_MAX_TOKENS,
    };

    let raw = llm
        .complete(&request)
        .await
        .map_err(|e| AppError::Llm(format!("Content selection failed: {e}")))?;

    let picks: Vec<SelectedContent> = parse_embedded_array(&raw).unwrap_or_else(|e| {
        warn!("Content selection output was not usable JSON ({e}); selecting nothing");
        Vec::new()
    });

    let selected = retain_catalog_links(picks, catalog);
    info!("Selected {} catalog items", selected.len());
    Ok(selected)
}

/// Keeps picks whose link exists in the catalog, first occurrence only,
/// capped at `MAX_SELECTED`.
fn retain_catalog_links(
    picks: Vec<SelectedContent>,
    catalog: &[ContentEntry],
) -> Vec<SelectedContent> {
    let known: HashSet<&str> = catalog.iter().map(|c| normalize_link(&c.link)).collect();
    let mut seen = HashSet::new();

    picks
        .into_iter()
        .filter(|pick| {
            let link = normalize_link(&pick.link);
            if !known.contains(link) {
                warn!("Dropping selection with link not in catalog: {}", pick.link);
                return false;
            }
            seen.insert(link.to_string())
        })
        .take(MAX_SELECTED)
        .collect()
}

fn normalize_link(link: &str) -> &str {
    link.trim().trim_end_matches('/')
}
