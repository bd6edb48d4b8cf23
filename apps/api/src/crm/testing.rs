//! In-memory CRM backends for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{json, Map};

use crate::crm::{ActivityQuery, CrmBackend, CrmError, TimeBound};
use crate::models::activity::{ActivityPage, ActivityRecord};

/// Fixed timestamp `minutes` after 2025-09-01T00:00Z.
pub fn at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes)
}

pub fn record(id: &str, activity_at: DateTime<Utc>) -> ActivityRecord {
    let mut payload = Map::new();
    payload.insert("id".to_string(), json!(id));
    ActivityRecord {
        activity_at,
        lead_id: Some("L1".to_string()),
        payload,
    }
}

/// How `find_lead_id` behaves.
pub enum LeadLookup {
    Found(String),
    Missing,
    Fails,
}

/// Returns pre-recorded pages in order and records every query it receives.
/// Once the script runs out every request gets an empty final page.
pub struct ScriptedCrm {
    pages: Mutex<VecDeque<Result<ActivityPage, CrmError>>>,
    queries: Mutex<Vec<ActivityQuery>>,
    lead: LeadLookup,
}

impl ScriptedCrm {
    pub fn new(pages: Vec<Result<ActivityPage, CrmError>>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            queries: Mutex::new(Vec::new()),
            lead: LeadLookup::Found("L1".to_string()),
        }
    }

    pub fn with_lead(mut self, lead: LeadLookup) -> Self {
        self.lead = lead;
        self
    }

    pub fn queries(&self) -> Vec<ActivityQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl CrmBackend for ScriptedCrm {
    async fn find_lead_id(&self, _email: &str) -> Result<Option<String>, CrmError> {
        match &self.lead {
            LeadLookup::Found(id) => Ok(Some(id.clone())),
            LeadLookup::Missing => Ok(None),
            LeadLookup::Fails => Err(CrmError::Api {
                status: 401,
                message: "invalid api key".to_string(),
            }),
        }
    }

    async fn fetch_activity_page(&self, query: &ActivityQuery) -> Result<ActivityPage, CrmError> {
        self.queries.lock().unwrap().push(query.clone());
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ActivityPage::default()))
    }
}

/// Applies the collection's filter/skip semantics to a fixed data set,
/// returning records newest first in pages of `page_size`.
pub struct SimulatedCrm {
    page_size: usize,
    records: Vec<ActivityRecord>,
    queries: Mutex<Vec<ActivityQuery>>,
}

impl SimulatedCrm {
    pub fn new(page_size: usize, mut records: Vec<ActivityRecord>) -> Self {
        records.sort_by(|a, b| b.activity_at.cmp(&a.activity_at));
        Self {
            page_size,
            records,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<ActivityQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl CrmBackend for SimulatedCrm {
    async fn find_lead_id(&self, _email: &str) -> Result<Option<String>, CrmError> {
        Ok(Some("L1".to_string()))
    }

    async fn fetch_activity_page(&self, query: &ActivityQuery) -> Result<ActivityPage, CrmError> {
        self.queries.lock().unwrap().push(query.clone());

        let matching: Vec<&ActivityRecord> = self
            .records
            .iter()
            .filter(|r| match query.bound {
                TimeBound::After(t) => r.activity_at > t,
                TimeBound::Before(t) => r.activity_at < t,
            })
            .collect();

        let records: Vec<ActivityRecord> = matching
            .iter()
            .skip(query.skip)
            .take(self.page_size)
            .map(|r| (*r).clone())
            .collect();

        Ok(ActivityPage {
            has_more: matching.len() > query.skip + self.page_size,
            records,
        })
    }
}
