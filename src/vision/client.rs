use async_trait::async_trait;
use base64::Engine as _;
use bytes::Bytes;
use std::time::Duration;

use crate::config::VisionConfig;

#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    #[error("vision endpoint returned {0}")]
    Status(reqwest::StatusCode),
    #[error("vision request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Remote vision model that turns a meal photo into nutrient estimates.
#[async_trait]
pub trait VisionClient: Send + Sync {
    /// Submit one photo and return the model's raw JSON response.
    async fn analyze_photo(
        &self,
        image: Bytes,
        content_type: &str,
    ) -> Result<serde_json::Value, VisionError>;
}

pub struct HttpVisionClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HttpVisionClient {
    pub fn new(cfg: &VisionConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            endpoint: cfg.endpoint.clone(),
            api_key: cfg.api_key.clone(),
        })
    }
}

#[async_trait]
impl VisionClient for HttpVisionClient {
    async fn analyze_photo(
        &self,
        image: Bytes,
        content_type: &str,
    ) -> Result<serde_json::Value, VisionError> {
        let body = serde_json::json!({
            "image_b64": base64::engine::general_purpose::STANDARD.encode(&image),
            "content_type": content_type,
        });

        let mut req = self.http.post(&self.endpoint).json(&body);
        if !self.api_key.is_empty() {
            req = req.bearer_auth(&self.api_key);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(%status, "vision endpoint rejected photo");
            return Err(VisionError::Status(status));
        }
        Ok(resp.json().await?)
    }
}
