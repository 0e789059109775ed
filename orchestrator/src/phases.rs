//! Phase functions
//!
//! Each phase builds its input string, calls one specialist and shapes the
//! reply. Failures are wrapped with the tool name and never retried.

use storyforge_agent::AgentCapability;

use crate::workflow::{PromptGenerationResult, Tool, WorkflowError};

const RESEARCH_INSTRUCTION: &str = "Research and gather comprehensive information about: ";

pub fn research_input(prompt: &str) -> String {
    format!("{}{}", RESEARCH_INSTRUCTION, prompt)
}

/// The user's topic inside a researcher input, used as the web search query
pub fn research_topic(input: &str) -> &str {
    input.strip_prefix(RESEARCH_INSTRUCTION).unwrap_or(input).trim()
}

pub fn prompt_generation_input(original_prompt: &str, research: &str) -> String {
    format!(
        "Based on this research data about \"{}\":\n\n\
         {}\n\n\
         Generate optimized prompts for:\n\
         1. An image that captures the key visual elements\n\
         2. A story that incorporates the most interesting findings",
        original_prompt, research
    )
}

pub fn image_input(image_prompt: &str) -> String {
    format!("Create an image: {}", image_prompt)
}

pub fn story_input(story_prompt: &str) -> String {
    format!("Write a story: {}", story_prompt)
}

/// Research the topic and return the findings as text
pub async fn research(capability: &dyn AgentCapability, prompt: &str) -> Result<String, WorkflowError> {
    invoke_text(capability, Tool::Research, &research_input(prompt)).await
}

/// Turn the research into an image prompt and a story prompt
pub async fn generate_prompts(
    capability: &dyn AgentCapability,
    original_prompt: &str,
    research: &str,
) -> Result<PromptGenerationResult, WorkflowError> {
    let tool = Tool::Prompt;
    let input = prompt_generation_input(original_prompt, research);

    let mut prompts: PromptGenerationResult = capability
        .invoke(tool.specialist(), &input)
        .await
        .and_then(|output| output.into_structured(tool.specialist()))
        .map_err(WorkflowError::phase(tool))?;

    for (field, value) in [("image_prompt", &prompts.image_prompt), ("story_prompt", &prompts.story_prompt)] {
        if value.trim().is_empty() {
            return Err(WorkflowError::IncompleteOutput {
                tool,
                reason: format!("{} is empty", field),
            });
        }
    }

    if prompts.source_research.is_empty() {
        prompts.source_research = research.to_string();
    }
    Ok(prompts)
}

/// Create an image; the reply may be a URL, a path or a description
pub async fn create_image(capability: &dyn AgentCapability, image_prompt: &str) -> Result<String, WorkflowError> {
    invoke_text(capability, Tool::Image, &image_input(image_prompt)).await
}

pub async fn write_story(capability: &dyn AgentCapability, story_prompt: &str) -> Result<String, WorkflowError> {
    invoke_text(capability, Tool::Story, &story_input(story_prompt)).await
}

async fn invoke_text(capability: &dyn AgentCapability, tool: Tool, input: &str) -> Result<String, WorkflowError> {
    capability
        .invoke(tool.specialist(), input)
        .await
        .map(|output| output.into_text())
        .map_err(WorkflowError::phase(tool))
}
