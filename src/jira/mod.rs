//! Jira Cloud REST adapter.

pub mod payload;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use route_panel_common::IssueSnapshot;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::config::{JiraAuth, JiraConnection};
use crate::errors::FetchError;
use crate::panel_config::FieldMapping;
use crate::source::{IssueSource, RevisionProbe};

pub use payload::is_valid_issue_key;

const USER_AGENT: &str = concat!("route-panel/", env!("CARGO_PKG_VERSION"));

/// Client for the Jira issue-read endpoint.
#[derive(Debug, Clone)]
pub struct JiraClient {
    http: reqwest::Client,
    base_url: Url,
    auth: JiraAuth,
    fields: FieldMapping,
    site_filter: Option<String>,
}

impl JiraClient {
    pub fn new(connection: &JiraConnection, fields: FieldMapping) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(connection.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(FetchError::Transport)?;
        Ok(Self {
            http,
            base_url: connection.base_url.clone(),
            auth: connection.auth.clone(),
            fields,
            site_filter: connection.site_filter.clone(),
        })
    }

    /// Whether the configured site passes the host-side site filter.
    pub fn site_allowed(&self) -> bool {
        match &self.site_filter {
            None => true,
            Some(filter) => self
                .base_url
                .host_str()
                .is_some_and(|host| host.contains(filter.as_str())),
        }
    }

    /// `{base}/rest/api/3/issue/{key}`, with the key as an escaped path segment.
    pub fn issue_url(&self, key: &str) -> Result<Url, FetchError> {
        if !is_valid_issue_key(key) {
            return Err(FetchError::InvalidKey {
                key: key.to_string(),
            });
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidKey {
                key: key.to_string(),
            })?
            .pop_if_empty()
            .extend(["rest", "api", "3", "issue", key]);
        Ok(url)
    }

    /// GET the issue, restricted to `fields`, and parse the body as JSON.
    pub async fn fetch_payload(&self, key: &str, fields: &[&str]) -> Result<Value, FetchError> {
        let url = self.issue_url(key)?;
        debug!(issue = key, %url, "requesting issue from Jira");

        let request = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .query(&[("fields", fields.join(","))]);
        let resp = self
            .authorize(request)
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            warn!(issue = key, status = status.as_u16(), "Jira returned error status");
            return Err(FetchError::Status {
                key: key.to_string(),
                status: status.as_u16(),
            });
        }

        let body = resp.bytes().await.map_err(FetchError::Transport)?;
        serde_json::from_slice(&body)
            .map_err(|e| FetchError::Shape(format!("response body is not JSON: {}", e)))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth {
            JiraAuth::Basic { email, token } => request.basic_auth(email, Some(token)),
            JiraAuth::Bearer { token } => request.bearer_auth(token),
            JiraAuth::Anonymous => request,
        }
    }
}

#[async_trait]
impl IssueSource for JiraClient {
    async fn fetch_issue(&self, key: &str) -> Result<Option<IssueSnapshot>, FetchError> {
        if !self.site_allowed() {
            debug!(
                issue = key,
                host = self.base_url.host_str().unwrap_or(""),
                "site filter excludes this site, panel will not be shown"
            );
            return Ok(None);
        }
        let payload = self
            .fetch_payload(
                key,
                &["status", self.fields.pickup.as_str(), self.fields.delivery.as_str()],
            )
            .await?;
        payload::snapshot_from_payload(key, &payload, &self.fields).map(Some)
    }
}

#[async_trait]
impl RevisionProbe for JiraClient {
    async fn revision(&self, key: &str) -> Result<String, FetchError> {
        let payload = self.fetch_payload(key, &["updated"]).await?;
        payload::updated_from_payload(&payload)
    }
}
