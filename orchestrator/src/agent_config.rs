//! Specialist configuration and registry
//!
//! Defines the four content specialists with per-agent model selection,
//! system prompts and sampling settings.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use storyforge_agent::config::LlmConfig;
use storyforge_agent::Specialist;

use crate::prompts;

/// How a specialist's reply should be interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    Text,
    Json,
}

/// Configuration for a specialist agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialistConfig {
    pub specialist: Specialist,

    /// Display name for UI/logging
    pub display_name: String,

    /// LLM model to use (e.g., "qwen3:14b", "llama3.1:70b")
    pub model: String,

    /// System prompt defining agent behavior
    pub system_prompt: String,

    /// Temperature for LLM sampling (0.0 = deterministic, 1.0 = creative)
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default)]
    pub max_tokens: Option<u32>,

    pub output: OutputKind,
}

impl SpecialistConfig {
    pub fn new(specialist: Specialist, model: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        Self {
            specialist,
            display_name: specialist.name().to_string(),
            model: model.into(),
            system_prompt: system_prompt.into(),
            temperature: 0.7,
            max_tokens: None,
            output: OutputKind::Text,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_output(mut self, output: OutputKind) -> Self {
        self.output = output;
        self
    }
}

/// Registry of the configured specialists
#[derive(Debug, Clone, Default)]
pub struct SpecialistRegistry {
    agents: HashMap<Specialist, SpecialistConfig>,
}

impl SpecialistRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            agents: HashMap::new(),
        }
    }

    /// Create a registry with the built-in specialists
    ///
    /// The researcher and the writer run on the researcher model; the prompt
    /// generator and the artist run on the default model.
    pub fn from_llm_config(llm: &LlmConfig) -> Self {
        let mut registry = Self::new();

        registry.register(
            SpecialistConfig::new(Specialist::Researcher, llm.researcher_model(), prompts::RESEARCHER_PROMPT)
                .with_display_name("Researcher")
                .with_temperature(llm.temperature)
                .with_max_tokens(llm.max_tokens),
        );

        // Structured output wants low variance
        registry.register(
            SpecialistConfig::new(Specialist::PromptGenerator, &llm.model, prompts::PROMPT_GENERATOR_PROMPT)
                .with_display_name("Prompt Generator")
                .with_temperature(llm.temperature.min(0.4))
                .with_max_tokens(llm.max_tokens)
                .with_output(OutputKind::Json),
        );

        registry.register(
            SpecialistConfig::new(Specialist::Artist, &llm.model, prompts::ARTIST_PROMPT)
                .with_display_name("Artist")
                .with_temperature(llm.temperature)
                .with_max_tokens(llm.max_tokens),
        );

        registry.register(
            SpecialistConfig::new(Specialist::Writer, llm.researcher_model(), prompts::WRITER_PROMPT)
                .with_display_name("Writer")
                .with_temperature(llm.temperature)
                .with_max_tokens(llm.max_tokens),
        );

        registry
    }

    /// Register a specialist, replacing any previous config for it
    pub fn register(&mut self, config: SpecialistConfig) {
        self.agents.insert(config.specialist, config);
    }

    pub fn get(&self, specialist: Specialist) -> Option<&SpecialistConfig> {
        self.agents.get(&specialist)
    }

    /// Iterate in pipeline order
    pub fn iter(&self) -> impl Iterator<Item = &SpecialistConfig> {
        Specialist::ALL.into_iter().filter_map(|s| self.agents.get(&s))
    }

    /// Update model for all specialists
    pub fn set_all_models(&mut self, model: impl Into<String>) {
        let model = model.into();
        for agent in self.agents.values_mut() {
            agent.model = model.clone();
        }
    }
}
