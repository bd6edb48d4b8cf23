// Prompt text for each step of the follow-up workflow.

/// System prompt for call analysis.
pub const ANALYSIS_SYSTEM: &str =
    "You are a professional sales AI that extracts structured insights from sales calls.";

/// Call analysis prompt. Replace `{transcript}` before sending.
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"Extract the following fields from the sales call transcript below:
- lead_type_guess: one of "Full Transitioner", "Upgrader", "Switcher", "Advanced"
- topics: list of 3-6 short keywords
- objections: list of 0-3 objections the lead raised
- tone: one of "Engaged", "Skeptical", "Neutral", "Excited"

Transcript:
{transcript}

Return a single JSON object with exactly those four fields."#;

/// System prompt for content selection. Replace `{brand}` before sending.
pub const SELECTION_SYSTEM_TEMPLATE: &str = "You are a senior sales enablement AI for {brand}. \
    You read a sales call transcript, the lead's CRM activity, and a content catalog, \
    then pick 3-4 pieces of content that will best nurture this lead. \
    Output a JSON array of objects with fields: topic, reason, link.";

/// Content selection prompt.
/// Replace: {transcript}, {crm_json}, {catalog_json}
pub const SELECTION_PROMPT_TEMPLATE: &str = r#"Sales call transcript:
{transcript}

Lead activity (from the CRM, most recent first; null when unavailable):
{crm_json}

Content catalog:
{catalog_json}

Select 3-4 catalog items that fit the lead's current goals, stage, and objections.
Use the catalog's links exactly as written."#;

/// System prompt for the follow-up email. Replace `{brand}` before sending.
pub const EMAIL_SYSTEM_TEMPLATE: &str =
    "You are a concise, friendly SDR email writer for {brand}. \
    You write short, human follow-up emails after sales calls.";

/// Follow-up email prompt.
/// Replace: {crm_json}, {insights_json}, {selected_json}, {brand}
pub const EMAIL_PROMPT_TEMPLATE: &str = r#"Lead activity:
{crm_json}

Call insights:
{insights_json}

Selected content for follow-up:
{selected_json}

Write a personalized 2-3 paragraph follow-up email.
- Start with a subject line of the form "Subject: ..."
- Mention the content naturally, without bullet lists, and include each link.
- Explain why each piece is relevant to the pain points from the call.
- Mention the lead by name and reference specific topics from the call.
  Never use a {brand} name or email address as the lead's name; if no name is known, use "there".
- Skip formal openers such as "hope this finds you well".
- End with a clear, friendly call to action.
- Keep it under 300 words."#;
