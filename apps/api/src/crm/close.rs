//! Close CRM REST client.
//!
//! Auth is HTTP basic with the API key as username and an empty password.
//! No retries: a failed request is reported to the caller as-is.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize};
use tracing::debug;

use crate::crm::{ActivityQuery, CrmBackend, CrmError};
use crate::models::activity::ActivityPage;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct LeadSearchResponse {
    #[serde(default)]
    data: Vec<LeadSummary>,
}

#[derive(Debug, Deserialize)]
struct LeadSummary {
    id: String,
}

#[derive(Debug, Deserialize)]
struct CloseErrorBody {
    error: String,
}

#[derive(Clone)]
pub struct CloseClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl CloseClient {
    pub fn new(api_key: String, base_url: String) -> Result<Self, CrmError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn resource_url(&self, resource: &str) -> String {
        format!("{}/{}/", self.base_url, resource)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        resource: &str,
        params: &[(&str, String)],
    ) -> Result<T, CrmError> {
        let response = self
            .client
            .get(self.resource_url(resource))
            .basic_auth(&self.api_key, Some(""))
            .query(params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<CloseErrorBody>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(CrmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl CrmBackend for CloseClient {
    async fn find_lead_id(&self, email: &str) -> Result<Option<String>, CrmError> {
        let params = [("query", format!("email:{email}"))];
        let leads: LeadSearchResponse = self.get("lead", &params).await?;
        Ok(leads.data.into_iter().next().map(|lead| lead.id))
    }

    async fn fetch_activity_page(&self, query: &ActivityQuery) -> Result<ActivityPage, CrmError> {
        let page: ActivityPage = self.get("activity", &query.to_params()).await?;
        debug!(
            "Close activity page for lead {}: {} records, has_more={}",
            query.lead_id,
            page.records.len(),
            page.has_more
        );
        Ok(page)
    }
}
