//! LLM abstraction layer

mod json;
mod ollama;

pub use json::{extract_json_object, strip_reasoning};
pub use ollama::OllamaClient;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::InvocationError;

/// Message in a conversation
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// Sampling options for a single request
#[derive(Debug, Clone, Default)]
pub struct ChatOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Ask the backend to constrain output to a JSON object
    pub json: bool,
}

/// Trait for LLM backends
#[async_trait]
pub trait Llm: Send + Sync {
    /// Send a conversation and get the assistant's reply
    async fn chat(&self, messages: &[Message], options: &ChatOptions) -> Result<String, InvocationError>;

    /// Get the model name
    fn model(&self) -> &str;
}
