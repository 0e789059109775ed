//! LLM-backed agent invocation
//!
//! Routes each specialist to its configured model. The researcher gets web
//! search results appended to its input when a search backend is
//! configured. The prompt generator is asked for JSON; the artist refines the
//! prompt with the LLM and then hands it to the image backend when one is
//! configured.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use storyforge_agent::images::ImageGenerator;
use storyforge_agent::llm::{extract_json_object, strip_reasoning, ChatOptions, Llm, Message, OllamaClient};
use storyforge_agent::search::{format_results, SearchBackend, SearxngBackend};
use storyforge_agent::{AgentCapability, AgentOutput, InvocationError, Specialist, StudioConfig};

use crate::agent_config::{OutputKind, SpecialistConfig, SpecialistRegistry};
use crate::phases::research_topic;

/// Production [`AgentCapability`]
pub struct LlmCapability {
    registry: SpecialistRegistry,
    clients: HashMap<Specialist, Arc<dyn Llm>>,
    images: Option<ImageGenerator>,
    search: Option<Arc<dyn SearchBackend>>,
    max_results: usize,
    timeout: Duration,
}

impl LlmCapability {
    /// Build Ollama clients for every specialist from config
    pub fn from_config(config: &StudioConfig) -> Self {
        Self::new(config, SpecialistRegistry::from_llm_config(&config.llm))
    }

    /// Build Ollama clients for the specialists of `registry`
    pub fn new(config: &StudioConfig, registry: SpecialistRegistry) -> Self {
        let http = reqwest::Client::new();

        let clients = registry
            .iter()
            .map(|agent| {
                let client: Arc<dyn Llm> = Arc::new(OllamaClient::with_client(http.clone(), &config.llm.url, &agent.model));
                (agent.specialist, client)
            })
            .collect();

        let search = SearxngBackend::from_config(http.clone(), &config.search)
            .map(|backend| Arc::new(backend) as Arc<dyn SearchBackend>);
        if search.is_none() {
            tracing::info!("Web search disabled; the researcher relies on the model alone");
        }

        let images = ImageGenerator::from_config(http, &config.images);
        if images.is_none() {
            tracing::info!("Image backend disabled; the artist returns refined descriptions");
        }

        Self {
            registry,
            clients,
            images,
            search,
            max_results: config.search.max_results,
            timeout: Duration::from_secs(config.llm.timeout_secs),
        }
    }

    /// Use one LLM for every specialist
    pub fn with_llm(registry: SpecialistRegistry, llm: Arc<dyn Llm>, timeout: Duration) -> Self {
        let clients = Specialist::ALL.into_iter().map(|s| (s, llm.clone())).collect();
        Self {
            registry,
            clients,
            images: None,
            search: None,
            max_results: 0,
            timeout,
        }
    }

    pub fn with_search(mut self, search: Arc<dyn SearchBackend>, max_results: usize) -> Self {
        self.search = Some(search);
        self.max_results = max_results;
        self
    }

    /// Append web search results to a researcher input
    ///
    /// A failed or empty search leaves the input unchanged.
    async fn with_search_results(&self, input: &str) -> String {
        let Some(search) = &self.search else {
            return input.to_string();
        };

        let query = research_topic(input);
        let results = match tokio::time::timeout(self.timeout, search.search(query, self.max_results)).await {
            Ok(Ok(results)) => results,
            Ok(Err(e)) => {
                tracing::warn!(backend = search.name(), error = %e, "Web search failed");
                return input.to_string();
            }
            Err(_) => {
                tracing::warn!(backend = search.name(), "Web search timed out");
                return input.to_string();
            }
        };

        tracing::debug!(backend = search.name(), query = %query, count = results.len(), "Web search results");
        if results.is_empty() {
            return input.to_string();
        }
        format!("{}\n\n## Web search results\n\n{}", input, format_results(&results))
    }

    async fn chat(&self, agent: &SpecialistConfig, input: &str) -> Result<String, InvocationError> {
        let llm = self
            .clients
            .get(&agent.specialist)
            .ok_or_else(|| InvocationError::Other(format!("no LLM client for {}", agent.specialist)))?;

        let messages = [Message::system(&agent.system_prompt), Message::user(input)];
        let options = ChatOptions {
            temperature: Some(agent.temperature),
            max_tokens: agent.max_tokens,
            json: agent.output == OutputKind::Json,
        };

        tokio::time::timeout(self.timeout, llm.chat(&messages, &options))
            .await
            .map_err(|_| InvocationError::Timeout {
                agent: agent.specialist.to_string(),
                timeout: self.timeout,
            })?
    }

    async fn render_image(&self, description: String) -> Result<AgentOutput, InvocationError> {
        let Some(images) = &self.images else {
            return Ok(AgentOutput::Text(description));
        };

        let url = tokio::time::timeout(self.timeout, images.generate(&description))
            .await
            .map_err(|_| InvocationError::Timeout {
                agent: Specialist::Artist.to_string(),
                timeout: self.timeout,
            })??;
        Ok(AgentOutput::Text(url))
    }
}

#[async_trait]
impl AgentCapability for LlmCapability {
    async fn invoke(&self, specialist: Specialist, input: &str) -> Result<AgentOutput, InvocationError> {
        let agent = self
            .registry
            .get(specialist)
            .ok_or_else(|| InvocationError::Other(format!("specialist not configured: {}", specialist)))?;

        tracing::debug!(agent = %agent.display_name, model = %agent.model, "Invoking specialist");
        let reply = match specialist {
            Specialist::Researcher => self.chat(agent, &self.with_search_results(input).await).await?,
            _ => self.chat(agent, input).await?,
        };
        let reply = strip_reasoning(&reply).trim().to_string();

        match (agent.output, specialist) {
            (OutputKind::Json, _) => extract_json_object(&reply)
                .map(AgentOutput::Structured)
                .ok_or_else(|| InvocationError::invalid_output(specialist.name(), "no JSON object in response")),
            (OutputKind::Text, Specialist::Artist) => self.render_image(reply).await,
            (OutputKind::Text, _) => Ok(AgentOutput::Text(reply)),
        }
    }
}
