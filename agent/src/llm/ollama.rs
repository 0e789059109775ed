//! Ollama LLM implementation

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ChatOptions, Llm, Message};
use crate::error::InvocationError;

#[derive(Debug, Serialize)]
struct ChatRequestBody<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'static str>,
    options: RequestOptions,
}

#[derive(Debug, Default, Serialize)]
struct RequestOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponseBody {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

/// Ollama client wrapper
#[derive(Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    /// Create a new Ollama client
    pub fn new(url: &str, model: &str) -> Self {
        Self::with_client(reqwest::Client::new(), url, model)
    }

    /// Create a client that shares an existing connection pool
    pub fn with_client(client: reqwest::Client, url: &str, model: &str) -> Self {
        Self {
            client,
            base_url: url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    fn request_body<'a>(&'a self, messages: &'a [Message], options: &ChatOptions) -> ChatRequestBody<'a> {
        ChatRequestBody {
            model: &self.model,
            messages,
            stream: false,
            format: options.json.then_some("json"),
            options: RequestOptions {
                temperature: options.temperature,
                num_predict: options.max_tokens,
            },
        }
    }
}

#[async_trait]
impl Llm for OllamaClient {
    async fn chat(&self, messages: &[Message], options: &ChatOptions) -> Result<String, InvocationError> {
        let body = self.request_body(messages, options);
        tracing::debug!(model = %self.model, messages = messages.len(), json = options.json, "Sending chat request");

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(InvocationError::Status {
                service: "ollama",
                status,
                body,
            });
        }

        let parsed: ChatResponseBody = response.json().await?;
        Ok(parsed.message.content)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
