//! Agent invocation capability
//!
//! The orchestrator only ever talks to specialists through
//! [`AgentCapability`]: pick a [`Specialist`], hand it an input string, get
//! back text or a structured value.

use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::InvocationError;
use crate::llm::extract_json_object;

/// The fixed set of specialists a workflow can call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Specialist {
    Researcher,
    PromptGenerator,
    Artist,
    Writer,
}

impl Specialist {
    pub const ALL: [Specialist; 4] = [
        Specialist::Researcher,
        Specialist::PromptGenerator,
        Specialist::Artist,
        Specialist::Writer,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Specialist::Researcher => "researcher",
            Specialist::PromptGenerator => "prompt_generator",
            Specialist::Artist => "artist",
            Specialist::Writer => "writer",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }
}

impl fmt::Display for Specialist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a specialist returned
#[derive(Debug, Clone, PartialEq)]
pub enum AgentOutput {
    Text(String),
    Structured(serde_json::Value),
}

impl AgentOutput {
    /// Final output as text; structured values are rendered as JSON
    pub fn into_text(self) -> String {
        match self {
            AgentOutput::Text(text) => text,
            AgentOutput::Structured(value) => value.to_string(),
        }
    }

    /// Final output as a typed value
    ///
    /// Text output is accepted when it contains a JSON object.
    pub fn into_structured<T: DeserializeOwned>(self, specialist: Specialist) -> Result<T, InvocationError> {
        let value = match self {
            AgentOutput::Structured(value) => value,
            AgentOutput::Text(text) => extract_json_object(&text)
                .ok_or_else(|| InvocationError::invalid_output(specialist.name(), "no JSON object in response"))?,
        };

        serde_json::from_value(value).map_err(|e| InvocationError::invalid_output(specialist.name(), e.to_string()))
    }
}

/// Run a specialist with an input and wait for its output
#[async_trait]
pub trait AgentCapability: Send + Sync {
    async fn invoke(&self, specialist: Specialist, input: &str) -> Result<AgentOutput, InvocationError>;
}
