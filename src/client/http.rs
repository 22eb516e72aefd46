// ABOUTME: HTTP client for the dashboard backend - fetches an embedded app's
// ABOUTME: self-reported configuration and submits fleet deployment requests.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::app::AppPatch;
use crate::error::FetchError;

/// Something that can report an application's configuration.
#[async_trait]
pub trait AppSource: Send + Sync {
    /// Fetch the configuration the application at `url` reports about itself.
    async fn fetch_app(&self, url: &str) -> Result<AppPatch, FetchError>;
}

/// Settings for [`DashboardClient`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Dashboard backend address; deploys go to `<base_url>/deploy`.
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("frameboard/{}", env!("CARGO_PKG_VERSION"))
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

/// Thin client over the dashboard backend and the embedded applications.
pub struct DashboardClient {
    http: reqwest::Client,
    base_url: String,
}

impl DashboardClient {
    /// Create a client from settings.
    pub fn new(config: &ClientConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self::with_client(http, config.base_url.clone()))
    }

    /// Create with a custom reqwest client.
    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Address deploy requests are posted to.
    pub fn deploy_url(&self) -> String {
        format!("{}/deploy", self.base_url.trim_end_matches('/'))
    }

    /// Fetch an application's configuration, bypassing caches.
    ///
    /// A non-success status becomes [`FetchError::Status`] carrying the
    /// status's canonical reason. No retries.
    pub async fn fetch_app(&self, url: &str) -> Result<AppPatch, FetchError> {
        let response = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                reason: status
                    .canonical_reason()
                    .unwrap_or("Unknown status")
                    .to_string(),
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Ask the backend to deploy the fleet.
    ///
    /// The response comes back untouched, whatever its status.
    pub async fn deploy(
        &self,
        payload: &serde_json::Value,
    ) -> Result<reqwest::Response, reqwest::Error> {
        let url = self.deploy_url();
        debug!(url = %url, "submitting deployment");
        self.http.post(url).json(payload).send().await
    }
}

#[async_trait]
impl AppSource for DashboardClient {
    async fn fetch_app(&self, url: &str) -> Result<AppPatch, FetchError> {
        DashboardClient::fetch_app(self, url).await
    }
}
