// Shared prompt fragments. Each workflow step keeps its own prompts.rs alongside it.

/// Appended to system prompts whose output is parsed as JSON.
pub const JSON_ONLY_INSTRUCTION: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON value. \
    Do NOT include explanations or apologies.";

/// Brand the assistant writes on behalf of.
pub const BRAND_NAME: &str = "Data Engineer Academy";
