//! CRM access — the activity collection, lead lookup, and the paged activity fetcher.
//!
//! Everything that talks to the CRM goes through the `CrmBackend` trait so the
//! fetcher can run against the live Close API or an in-memory fixture.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::activity::ActivityPage;

pub mod close;
pub mod handlers;
pub mod pagination;

#[cfg(test)]
pub mod testing;

#[derive(Debug, Error)]
pub enum CrmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CRM API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to decode CRM response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid lead id: {0}")]
    InvalidLeadId(String),
}

/// Timestamp filter applied to one activity page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeBound {
    /// `date_created__gt`
    After(DateTime<Utc>),
    /// `date_created__lt`
    Before(DateTime<Utc>),
}

/// A single page request against the activity collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityQuery {
    pub lead_id: String,
    pub bound: TimeBound,
    pub skip: usize,
}

impl ActivityQuery {
    /// Renders the query as Close API query parameters.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let (key, at) = match self.bound {
            TimeBound::After(at) => ("date_created__gt", at),
            TimeBound::Before(at) => ("date_created__lt", at),
        };
        vec![
            ("lead_id", self.lead_id.clone()),
            ("_skip", self.skip.to_string()),
            (key, at.to_rfc3339()),
        ]
    }
}

/// The CRM operations the nurture workflow depends on.
#[async_trait]
pub trait CrmBackend: Send + Sync {
    /// Resolves a lead by contact email. `None` when the CRM has no match.
    async fn find_lead_id(&self, email: &str) -> Result<Option<String>, CrmError>;

    /// Fetches one page of the activity collection.
    async fn fetch_activity_page(&self, query: &ActivityQuery) -> Result<ActivityPage, CrmError>;
}
