//! OpenAI-compatible image generation client.

use crate::types::{AppError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

/// Renders a prompt into an image and returns its URL.
#[async_trait]
pub trait ImageService: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

pub struct OpenAIImageClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    size: String,
}

impl OpenAIImageClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        size: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            size: size.into(),
        }
    }
}

#[async_trait]
impl ImageService for OpenAIImageClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let response = self
            .http
            .post(format!("{}/images/generations", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": self.model,
                "prompt": prompt,
                "n": 1,
                "size": self.size,
            }))
            .send()
            .await
            .map_err(|e| AppError::Service(format!("Image API request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| format!("HTTP {}", status.as_u16()));
            return Err(AppError::Service(message));
        }

        let body: ImagesResponse = response
            .json()
            .await
            .map_err(|e| AppError::Service(format!("Invalid image response: {}", e)))?;

        body.data
            .into_iter()
            .find_map(|image| image.url)
            .ok_or_else(|| AppError::Service("Image API returned no image URL".to_string()))
    }
}
