//! Scripted completion model for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm_client::{CompletionModel, CompletionRequest, LlmError};

/// Replies with canned outputs in order and records each request.
/// `None` entries simulate a transport failure.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Option<String>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedModel {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| r.map(Into::into)).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionModel for ScriptedModel {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        match self.replies.lock().unwrap().pop_front() {
            Some(Some(text)) => Ok(text),
            Some(None) => Err(LlmError::Api {
                status: 500,
                message: "scripted failure".to_string(),
            }),
            None => Err(LlmError::EmptyContent),
        }
    }
}
