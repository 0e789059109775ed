use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use storyforge_orchestrator::{
    AgentOutput, ArtifactStore, ContentCreationResult, ContentWorkflow, MarkdownStore, RunState,
    RunStatus, Specialist, StorageError, Tool, ToolUseStatus,
};

use crate::support::*;

fn entry(name: Tool, complete: bool) -> ToolUseStatus {
    ToolUseStatus { name, complete }
}

#[tokio::test]
async fn test_happy_path_produces_completed_artifact() {
    let stub = Arc::new(StubCapability::happy());
    let mut workflow = ContentWorkflow::new(stub.clone());

    let result = workflow.execute("Mars colonization").await;

    assert_eq!(result.metadata.status, RunStatus::Completed);
    assert_eq!(result.metadata.workflow_id, workflow.id());
    assert_eq!(result.research_summary, RESEARCH);
    assert_eq!(result.image_prompt.as_deref(), Some(IMAGE_PROMPT));
    assert_eq!(result.story_prompt.as_deref(), Some(STORY_PROMPT));
    assert_eq!(result.generated_image.as_deref(), Some(IMAGE));
    assert_eq!(result.generated_story, STORY);
    assert!(result.metadata.execution_time_seconds >= 0.0);

    assert_eq!(
        result.metadata.tool_used,
        vec![
            entry(Tool::Research, true),
            entry(Tool::Prompt, true),
            entry(Tool::Image, true),
            entry(Tool::Story, true),
        ]
    );
    assert_eq!(workflow.state(), RunState::Completed);

    for specialist in Specialist::ALL {
        assert_eq!(stub.call_count(specialist), 1, "{} called once", specialist);
    }
}

#[tokio::test]
async fn test_phase_inputs_chain_outputs_forward() {
    let stub = Arc::new(StubCapability::happy());
    ContentWorkflow::new(stub.clone()).execute("Mars colonization").await;

    let calls = stub.calls();
    assert_eq!(
        calls[0],
        (
            Specialist::Researcher,
            "Research and gather comprehensive information about: Mars colonization".to_string()
        )
    );
    assert_eq!(calls[1].0, Specialist::PromptGenerator);
    assert!(calls[1].1.contains("Mars colonization"));
    assert!(calls[1].1.contains(RESEARCH));

    let content_calls = &calls[2..];
    assert!(content_calls.contains(&(Specialist::Artist, format!("Create an image: {}", IMAGE_PROMPT))));
    assert!(content_calls.contains(&(Specialist::Writer, format!("Write a story: {}", STORY_PROMPT))));
}

#[tokio::test]
async fn test_research_failure_stops_pipeline() {
    let stub = Arc::new(StubCapability::happy().failing(Specialist::Researcher, "search backend down"));
    let mut workflow = ContentWorkflow::new(stub.clone());

    let result = workflow.execute("Mars").await;

    let message = result.metadata.status.error_message().unwrap().to_string();
    assert!(message.contains("search backend down"));
    assert_eq!(result.research_summary, format!("Workflow failed: {}", message));
    assert_eq!(result.generated_story, format!("Error occurred: {}", message));
    assert_eq!(result.generated_image, None);
    assert_eq!(result.metadata.tool_used, vec![entry(Tool::Research, false)]);
    assert_eq!(workflow.state(), RunState::Failed);

    assert_eq!(stub.call_count(Specialist::PromptGenerator), 0);
    assert_eq!(stub.call_count(Specialist::Artist), 0);
    assert_eq!(stub.call_count(Specialist::Writer), 0);
}

#[tokio::test]
async fn test_prompt_failure_discards_research() {
    let stub = Arc::new(StubCapability::happy().failing(Specialist::PromptGenerator, "rate limited"));
    let result = ContentWorkflow::new(stub.clone()).execute("Mars").await;

    assert!(matches!(&result.metadata.status, RunStatus::Error(m) if m.contains("rate limited")));
    assert!(result.metadata.status.to_string().starts_with("error: "));
    assert!(!result.research_summary.contains(RESEARCH));
    assert_eq!(result.image_prompt, None);
    assert_eq!(
        result.metadata.tool_used,
        vec![entry(Tool::Research, true), entry(Tool::Prompt, false)]
    );

    assert_eq!(stub.call_count(Specialist::Artist), 0);
    assert_eq!(stub.call_count(Specialist::Writer), 0);
}

#[tokio::test]
async fn test_incomplete_prompt_pair_is_a_failure() {
    let stub = Arc::new(StubCapability::happy().with_output(
        Specialist::PromptGenerator,
        AgentOutput::Structured(serde_json::json!({"image_prompt": "dunes", "story_prompt": ""})),
    ));
    let result = ContentWorkflow::new(stub.clone()).execute("Mars").await;

    assert!(!result.is_completed());
    assert!(result.metadata.status.to_string().contains("story_prompt"));
    assert_eq!(stub.call_count(Specialist::Writer), 0);
}

#[tokio::test(start_paused = true)]
async fn test_image_failure_fails_run_after_story_finished() {
    let stub = Arc::new(
        StubCapability::happy()
            .with_delay(Specialist::Artist, Duration::from_secs(2))
            .with_delay(Specialist::Writer, Duration::from_secs(1))
            .failing(Specialist::Artist, "content policy"),
    );
    let result = ContentWorkflow::new(stub.clone()).execute("Mars").await;

    assert!(result.metadata.status.to_string().contains("content policy"));
    assert_eq!(result.generated_image, None);
    assert_ne!(result.generated_story, STORY);
    assert!(result.generated_story.starts_with("Error occurred:"));
    assert_eq!(
        result.metadata.tool_used,
        vec![
            entry(Tool::Research, true),
            entry(Tool::Prompt, true),
            entry(Tool::Image, false),
            entry(Tool::Story, true),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_story_failure_leaves_pending_image_incomplete() {
    let stub = Arc::new(
        StubCapability::happy()
            .with_delay(Specialist::Artist, Duration::from_secs(5))
            .failing(Specialist::Writer, "writer crashed"),
    );
    let result = ContentWorkflow::new(stub.clone()).execute("Mars").await;

    assert!(result.metadata.status.to_string().contains("writer crashed"));
    assert_eq!(
        &result.metadata.tool_used[2..],
        &[entry(Tool::Image, false), entry(Tool::Story, false)]
    );
    // The failure ends the join without waiting for the image
    assert!(result.metadata.execution_time_seconds < 5.0);
}

#[tokio::test(start_paused = true)]
async fn test_elapsed_time_reflects_concurrent_content_phase() {
    let stub = Arc::new(
        StubCapability::happy()
            .with_delay(Specialist::Researcher, Duration::from_secs(1))
            .with_delay(Specialist::PromptGenerator, Duration::from_secs(2))
            .with_delay(Specialist::Artist, Duration::from_secs(3))
            .with_delay(Specialist::Writer, Duration::from_secs(5)),
    );
    let result = ContentWorkflow::new(stub.clone()).execute("Mars").await;

    assert!(result.is_completed());
    let elapsed = result.metadata.execution_time_seconds;
    assert!((elapsed - 8.0).abs() < 0.05, "elapsed {}", elapsed);
    assert_eq!(stub.max_concurrency(), 2);
}

#[tokio::test]
async fn test_each_run_has_a_unique_id() {
    let stub = Arc::new(StubCapability::happy());
    let first = ContentWorkflow::new(stub.clone()).execute("a").await;
    let second = ContentWorkflow::new(stub.clone()).execute("a").await;

    assert_ne!(first.metadata.workflow_id, second.metadata.workflow_id);
    assert!(uuid_like(&first.metadata.workflow_id));
}

fn uuid_like(id: &str) -> bool {
    id.len() == 36 && id.chars().filter(|c| *c == '-').count() == 4
}

#[tokio::test]
async fn test_completed_run_is_saved() {
    let dir = tempfile::tempdir().unwrap();
    // A description keeps the image handler off the network
    let stub = Arc::new(
        StubCapability::happy().with_output(Specialist::Artist, AgentOutput::Text("A glass dome at dusk".to_string())),
    );
    let store = Arc::new(MarkdownStore::new(dir.path()));

    let result = ContentWorkflow::new(stub).with_store(store).execute("Mars").await;

    let files: Vec<PathBuf> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "md"))
        .collect();
    assert_eq!(files.len(), 1);

    let name = files[0].file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with(&format!("content_{}_", &result.metadata.workflow_id[..8])));
    let body = std::fs::read_to_string(&files[0]).unwrap();
    assert!(body.contains(STORY));
    assert!(body.contains("> A glass dome at dusk"));
}

#[tokio::test]
async fn test_failed_run_is_not_saved() {
    let dir = tempfile::tempdir().unwrap();
    let stub = Arc::new(StubCapability::happy().failing(Specialist::Writer, "boom"));
    let store = Arc::new(MarkdownStore::new(dir.path().join("out")));

    ContentWorkflow::new(stub).with_store(store).execute("Mars").await;

    assert!(!dir.path().join("out").exists());
}

struct BrokenStore;

#[async_trait]
impl ArtifactStore for BrokenStore {
    async fn persist(&self, _: &ContentCreationResult) -> Result<PathBuf, StorageError> {
        Err(StorageError::DownloadStatus(503))
    }
}

#[tokio::test]
async fn test_storage_failure_does_not_fail_run() {
    let stub = Arc::new(StubCapability::happy());
    let result = ContentWorkflow::new(stub)
        .with_store(Arc::new(BrokenStore))
        .execute("Mars")
        .await;

    assert!(result.is_completed());
}
