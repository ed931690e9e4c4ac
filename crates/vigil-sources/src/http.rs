//! HTTP source adapter — fetches a URL and observes the response body.

use std::time::Duration;

use async_trait::async_trait;

use vigil_core::error::{Result, VigilError};
use vigil_core::state::{Payload, State};
use vigil_core::traits::Query;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_USER_AGENT: &str = concat!("vigil/", env!("CARGO_PKG_VERSION"));

/// GETs a fixed URL on every poll. Non-2xx statuses and transport errors are
/// query errors, so the runner records them as failed observations.
pub struct HttpQuery {
    url: String,
    client: reqwest::Client,
}

impl HttpQuery {
    pub fn new(
        url: impl Into<String>,
        timeout: Option<Duration>,
        user_agent: Option<&str>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout.unwrap_or(DEFAULT_TIMEOUT))
            .user_agent(user_agent.unwrap_or(DEFAULT_USER_AGENT))
            .build()
            .map_err(|e| VigilError::query(format!("Build HTTP client: {e}")))?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

#[async_trait]
impl Query for HttpQuery {
    async fn query(&self) -> Result<State> {
        tracing::debug!("GET {}", self.url);
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| VigilError::query(format!("GET {}: {e}", self.url)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(VigilError::query(format!("GET {}: HTTP {status}", self.url)));
        }
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let body = response
            .text()
            .await
            .map_err(|e| VigilError::query(format!("Read body of {}: {e}", self.url)))?;

        Ok(State::ok(Payload::Resource {
            url: self.url.clone(),
            content_type,
            body,
        }))
    }
}
