use std::sync::Arc;

use crate::config::Config;
use crate::crm::CrmBackend;
use crate::llm_client::CompletionModel;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// CRM backend. Default: `CloseClient`.
    pub crm: Arc<dyn CrmBackend>,
    /// Text-completion backend. Default: `LlmClient`.
    pub llm: Arc<dyn CompletionModel>,
    pub config: Config,
}
