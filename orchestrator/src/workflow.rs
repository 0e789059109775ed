//! Workflow data model
//!
//! Types shared by the engine, the streaming adapter and the HTTP layer:
//! tool-usage entries, run status, metadata and the final artifact.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storyforge_agent::{InvocationError, Specialist};

/// A pipeline phase as it appears in tool-usage entries and progress events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tool {
    #[serde(rename = "research_tool")]
    Research,
    #[serde(rename = "prompt_tool")]
    Prompt,
    #[serde(rename = "image_tool")]
    Image,
    #[serde(rename = "story_tool")]
    Story,
}

impl Tool {
    pub fn name(&self) -> &'static str {
        match self {
            Tool::Research => "research_tool",
            Tool::Prompt => "prompt_tool",
            Tool::Image => "image_tool",
            Tool::Story => "story_tool",
        }
    }

    /// The specialist that does the work for this phase
    pub fn specialist(&self) -> Specialist {
        match self {
            Tool::Research => Specialist::Researcher,
            Tool::Prompt => Specialist::PromptGenerator,
            Tool::Image => Specialist::Artist,
            Tool::Story => Specialist::Writer,
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lifecycle record of one phase invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolUseStatus {
    pub name: Tool,
    pub complete: bool,
}

/// Terminal status of a run
///
/// Serialized as `"completed"` or `"error: <message>"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum RunStatus {
    Completed,
    Error(String),
}

const ERROR_PREFIX: &str = "error: ";

impl RunStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, RunStatus::Completed)
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            RunStatus::Completed => None,
            RunStatus::Error(message) => Some(message),
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Completed => f.write_str("completed"),
            RunStatus::Error(message) => write!(f, "{}{}", ERROR_PREFIX, message),
        }
    }
}

impl From<RunStatus> for String {
    fn from(status: RunStatus) -> Self {
        status.to_string()
    }
}

impl FromStr for RunStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "completed" {
            return Ok(RunStatus::Completed);
        }
        s.strip_prefix(ERROR_PREFIX)
            .or_else(|| s.strip_prefix("error:"))
            .map(|message| RunStatus::Error(message.to_string()))
            .ok_or_else(|| format!("unknown run status: {}", s))
    }
}

impl TryFrom<String> for RunStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, String> {
        value.parse()
    }
}

/// Metadata embedded in every artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowMetadata {
    pub workflow_id: String,
    pub timestamp: DateTime<Utc>,
    pub execution_time_seconds: f64,
    pub status: RunStatus,
    #[serde(default)]
    pub tool_used: Vec<ToolUseStatus>,
}

/// The final artifact of a run, successful or degraded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentCreationResult {
    pub research_summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story_prompt: Option<String>,
    pub generated_image: Option<String>,
    pub generated_story: String,
    pub metadata: WorkflowMetadata,
}

impl ContentCreationResult {
    pub fn is_completed(&self) -> bool {
        self.metadata.status.is_completed()
    }
}

/// Structured output of the prompt generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptGenerationResult {
    pub image_prompt: String,
    pub story_prompt: String,
    #[serde(default)]
    pub source_research: String,
}

/// Where a run is in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Created,
    Researching,
    Prompting,
    Generating,
    Aggregating,
    Completed,
    Failed,
}

/// Errors that stop a run
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("{tool} failed: {source}")]
    Phase {
        tool: Tool,
        #[source]
        source: InvocationError,
    },

    #[error("{tool} returned an incomplete result: {reason}")]
    IncompleteOutput { tool: Tool, reason: String },
}

impl WorkflowError {
    pub fn phase(tool: Tool) -> impl FnOnce(InvocationError) -> Self {
        move |source| WorkflowError::Phase { tool, source }
    }

    pub fn tool(&self) -> Tool {
        match self {
            WorkflowError::Phase { tool, .. } | WorkflowError::IncompleteOutput { tool, .. } => *tool,
        }
    }
}
