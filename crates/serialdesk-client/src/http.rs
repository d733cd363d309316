use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::error::{ClientError, Result};

// ─── JsonClient ───────────────────────────────────────────────────────────────

/// Thin GET-and-parse wrapper over `reqwest::Client`.
///
/// One attempt per call: no retries, no caching. A non-success status is an
/// error regardless of the body.
#[derive(Debug, Clone)]
pub struct JsonClient {
    client: reqwest::Client,
}

impl JsonClient {
    pub fn new(user_agent: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(user_agent).gzip(true);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    pub async fn get(&self, url: &str) -> Result<String> {
        debug!(url, "GET");
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        resp.text().await.map_err(ClientError::Http)
    }

    pub async fn get_json(&self, url: &str) -> Result<Value> {
        let text = self.get(url).await?;
        serde_json::from_str(&text).map_err(|e| ClientError::Parse(e.to_string()))
    }
}
