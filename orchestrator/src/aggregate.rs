//! Building the final artifact from phase outputs or a failure

use chrono::Utc;
use tokio::time::Instant;

use crate::workflow::{
    ContentCreationResult, PromptGenerationResult, RunStatus, ToolUseStatus, WorkflowMetadata,
};

/// Everything a successful run produced
#[derive(Debug, Clone)]
pub struct PhaseOutputs {
    pub research_summary: String,
    pub prompts: PromptGenerationResult,
    pub generated_image: String,
    pub generated_story: String,
}

/// Seconds since `started_at`, or zero when the run never started
pub fn elapsed_seconds(started_at: Option<Instant>) -> f64 {
    started_at.map(|start| start.elapsed().as_secs_f64()).unwrap_or(0.0)
}

pub fn success(
    workflow_id: &str,
    started_at: Option<Instant>,
    tool_used: Vec<ToolUseStatus>,
    outputs: PhaseOutputs,
) -> ContentCreationResult {
    ContentCreationResult {
        research_summary: outputs.research_summary,
        image_prompt: Some(outputs.prompts.image_prompt),
        story_prompt: Some(outputs.prompts.story_prompt),
        generated_image: Some(outputs.generated_image),
        generated_story: outputs.generated_story,
        metadata: metadata(workflow_id, started_at, RunStatus::Completed, tool_used),
    }
}

/// Degraded artifact carrying only the failure message
pub fn failure(
    workflow_id: &str,
    started_at: Option<Instant>,
    tool_used: Vec<ToolUseStatus>,
    message: &str,
) -> ContentCreationResult {
    ContentCreationResult {
        research_summary: format!("Workflow failed: {}", message),
        image_prompt: None,
        story_prompt: None,
        generated_image: None,
        generated_story: format!("Error occurred: {}", message),
        metadata: metadata(
            workflow_id,
            started_at,
            RunStatus::Error(message.to_string()),
            tool_used,
        ),
    }
}

fn metadata(
    workflow_id: &str,
    started_at: Option<Instant>,
    status: RunStatus,
    tool_used: Vec<ToolUseStatus>,
) -> WorkflowMetadata {
    WorkflowMetadata {
        workflow_id: workflow_id.to_string(),
        timestamp: Utc::now(),
        execution_time_seconds: elapsed_seconds(started_at),
        status,
        tool_used,
    }
}
