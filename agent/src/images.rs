//! Image generation backend
//!
//! Calls an OpenAI-compatible `/images/generations` endpoint and returns the
//! URL of the first generated image.

use serde::{Deserialize, Serialize};

use crate::config::ImageConfig;
use crate::error::InvocationError;

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    size: &'a str,
    quality: &'a str,
    style: &'a str,
    n: u8,
    response_format: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    #[serde(default)]
    data: Vec<GeneratedImage>,
}

#[derive(Debug, Deserialize)]
struct GeneratedImage {
    url: Option<String>,
    #[serde(default)]
    revised_prompt: Option<String>,
}

/// Client for the image generation API
#[derive(Clone)]
pub struct ImageGenerator {
    client: reqwest::Client,
    config: ImageConfig,
    api_key: String,
}

impl ImageGenerator {
    /// Build a generator from config; `None` when no API key is configured
    pub fn from_config(client: reqwest::Client, config: &ImageConfig) -> Option<Self> {
        let api_key = config.api_key.clone().filter(|k| !k.is_empty())?;
        Some(Self {
            client,
            config: config.clone(),
            api_key,
        })
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> GenerationRequest<'a> {
        GenerationRequest {
            model: &self.config.model,
            prompt,
            size: &self.config.size,
            quality: &self.config.quality,
            style: &self.config.style,
            n: 1,
            response_format: "url",
        }
    }

    /// Generate one image and return its URL
    pub async fn generate(&self, prompt: &str) -> Result<String, InvocationError> {
        let endpoint = format!("{}/images/generations", self.config.api_url.trim_end_matches('/'));
        tracing::debug!(model = %self.config.model, size = %self.config.size, "Requesting image generation");

        let response = self
            .client
            .post(endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(prompt))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(InvocationError::Status {
                service: "image api",
                status,
                body,
            });
        }

        let parsed: GenerationResponse = response.json().await?;
        first_url(parsed)
    }
}

fn first_url(response: GenerationResponse) -> Result<String, InvocationError> {
    let image = response
        .data
        .into_iter()
        .next()
        .ok_or_else(|| InvocationError::Image("no image data returned".to_string()))?;

    if let Some(revised) = &image.revised_prompt {
        tracing::debug!(revised_prompt = %revised, "Image prompt was revised by the backend");
    }

    image
        .url
        .ok_or_else(|| InvocationError::Image("response did not contain an image url".to_string()))
}
