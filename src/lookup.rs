/*!
 * Lookup service client
 *
 * The lookup service is an external collaborator: it takes an identifier
 * (mobile number or national id) and answers with matching subscriber
 * records. Only its request/response contract is modelled here.
 */

use std::time::Duration;

use async_trait::async_trait;
use querydesk_core_audit::LookupResponse;
use tracing::debug;

use crate::error::{QueryDeskError, Result};

/// Source of lookup responses
#[async_trait]
pub trait LookupClient: Send + Sync {
    /// Resolve `query`, failing with [`QueryDeskError::Lookup`] when the
    /// service cannot be reached or answers with a non-success status
    async fn lookup(&self, query: &str) -> Result<LookupResponse>;
}

/// HTTP client for `GET <endpoint>?query=<identifier>`
pub struct HttpLookupClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpLookupClient {
    pub fn new<S: Into<String>>(endpoint: S, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| QueryDeskError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl LookupClient for HttpLookupClient {
    async fn lookup(&self, query: &str) -> Result<LookupResponse> {
        debug!(endpoint = %self.endpoint, "Sending lookup request");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("query", query)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(QueryDeskError::Lookup(format!(
                "Server returned {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("")
            )
            .trim_end()
            .to_string()));
        }

        let body = response.json::<LookupResponse>().await?;
        Ok(body)
    }
}
