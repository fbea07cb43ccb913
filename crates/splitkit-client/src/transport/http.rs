//! `reqwest` implementation of the v1 transport.

use std::time::Duration;

use async_trait::async_trait;
use splitkit_core::VisitorId;
use splitkit_settings::ClientSettings;
use tracing::{debug, instrument};

use super::types::{
    AssignmentEvent, AssignmentOverride, Credentials, IdentifierRequest, IdentifierResponse,
    VisitorResponse,
};
use super::Transport;
use crate::errors::{ClientError, Result};

/// HTTP transport against the remote assignment service.
pub struct HttpTransport {
    /// Base URL without trailing slash.
    base_url: String,
    /// Timeout for the initial visitor fetch.
    visitor_timeout: Duration,
    /// HTTP client (reused across requests).
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with its own client.
    pub fn new(base_url: &str, visitor_timeout: Duration, request_timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .user_agent(concat!("splitkit/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();
        Self::with_client(base_url, visitor_timeout, client)
    }

    /// Create a transport sharing an existing client.
    pub fn with_client(base_url: &str, visitor_timeout: Duration, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            visitor_timeout,
            client,
        }
    }

    /// Create a transport from client settings.
    pub fn from_settings(settings: &ClientSettings) -> Self {
        Self::new(
            settings.base_url(),
            settings.visitor_fetch_timeout(),
            settings.request_timeout(),
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1/{path}", self.base_url)
    }
}

/// Turn a non-success response into [`ClientError::Api`].
async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = resp.text().await.unwrap_or_default();
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip_all, fields(visitor_id = %visitor_id))]
    async fn get_visitor(&self, visitor_id: &VisitorId) -> Result<VisitorResponse> {
        let resp = self
            .client
            .get(self.url(&format!("visitors/{visitor_id}")))
            .timeout(self.visitor_timeout)
            .send()
            .await?;
        let resp = check_status(resp).await?;
        Ok(resp.json().await?)
    }

    #[instrument(skip_all, fields(identifier_type = %request.identifier_type))]
    async fn post_identifier(&self, request: &IdentifierRequest) -> Result<VisitorResponse> {
        let resp = self
            .client
            .post(self.url("identifier"))
            .form(request)
            .send()
            .await?;
        let resp = check_status(resp).await?;
        let body: IdentifierResponse = resp.json().await?;
        Ok(body.visitor)
    }

    #[instrument(skip_all, fields(split = %event.split_name))]
    async fn post_assignment_event(&self, event: &AssignmentEvent) -> Result<()> {
        let resp = self
            .client
            .post(self.url("assignment_event"))
            .form(event)
            .send()
            .await?;
        let _ = check_status(resp).await?;
        debug!(result = ?event.mixpanel_result, "assignment event persisted");
        Ok(())
    }

    #[instrument(skip_all, fields(split = %assignment.split_name))]
    async fn post_assignment_override(
        &self,
        assignment: &AssignmentOverride,
        credentials: &Credentials,
    ) -> Result<()> {
        let resp = self
            .client
            .post(self.url("assignment_override"))
            .basic_auth(&credentials.username, Some(&credentials.password))
            .form(assignment)
            .send()
            .await?;
        let _ = check_status(resp).await?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
