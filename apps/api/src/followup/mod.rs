// Post-call follow-up workflow: call analysis, CRM context, content selection, email.
// All LLM calls go through llm_client; all CRM calls go through crm.

pub mod content_selector;
pub mod email;
pub mod handlers;
pub mod insights;
pub mod pipeline;
pub mod prompts;
