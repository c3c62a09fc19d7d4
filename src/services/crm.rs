//! Client for the external CRM lead intake endpoint.

use anyhow::{anyhow, Context, Result};
use axum::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, instrument};

#[cfg(test)]
use mockall::automock;

use crate::domain::leads::Lead;

/// Destination for assembled leads.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LeadGateway: Send + Sync {
    /// Deliver one lead. Only success or failure is meaningful to callers.
    async fn submit(&self, lead: Lead, request_id: Option<String>) -> Result<()>;
}

/// CRM client authenticating with a static bearer token.
#[derive(Clone)]
pub struct CrmClient {
    client: Client,
    url: String,
    token: String,
}

impl CrmClient {
    pub fn new(url: &str, token: &str, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create CRM HTTP client")?;

        tracing::info!(url = url, "CRM client initialized");

        Ok(Self {
            client,
            url: url.to_string(),
            token: token.to_string(),
        })
    }
}

#[async_trait]
impl LeadGateway for CrmClient {
    #[instrument(skip_all, fields(lead_source = %lead.lead_source))]
    async fn submit(&self, lead: Lead, request_id: Option<String>) -> Result<()> {
        let mut req = self
            .client
            .post(&self.url)
            .bearer_auth(&self.token)
            .header("Content-Type", "application/json");

        if let Some(rid) = request_id.as_deref() {
            req = req.header("x-request-id", rid);
        }

        debug!(url = %self.url, "CRM request");

        let response = req.json(&lead).send().await.map_err(|e| {
            error!(error = %e, "CRM request failed");
            anyhow!("CRM unavailable: {}", e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        error!(status = %status, body = %body, "CRM rejected lead");
        Err(anyhow!("CRM error: {}", status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::leads::fixtures::contact_form;

    #[tokio::test]
    async fn unreachable_crm_is_an_error() {
        let client = CrmClient::new("http://127.0.0.1:1/leads", "token", 2).unwrap();
        let result = client.submit(contact_form().into_lead(), None).await;
        assert!(result.is_err());
    }
}
