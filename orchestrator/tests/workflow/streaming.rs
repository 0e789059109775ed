use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;

use storyforge_orchestrator::{ContentWorkflow, ProgressEvent, Specialist, Tool, ToolProgress};

use crate::support::*;

fn started(tool: Tool) -> ProgressEvent {
    ProgressEvent::ToolUpdate {
        tool,
        status: ToolProgress::Started,
    }
}

fn completed(tool: Tool) -> ProgressEvent {
    ProgressEvent::ToolUpdate {
        tool,
        status: ToolProgress::Completed,
    }
}

async fn collect(stub: Arc<StubCapability>) -> Vec<ProgressEvent> {
    ContentWorkflow::new(stub)
        .execute_stream("Mars colonization".to_string())
        .collect()
        .await
}

#[tokio::test]
async fn test_success_event_order() {
    let stub = Arc::new(StubCapability::happy());
    let events = collect(stub).await;

    assert_eq!(
        &events[..8],
        &[
            started(Tool::Research),
            completed(Tool::Research),
            started(Tool::Prompt),
            completed(Tool::Prompt),
            started(Tool::Image),
            started(Tool::Story),
            completed(Tool::Image),
            completed(Tool::Story),
        ]
    );
    assert_eq!(events.len(), 9);

    match &events[8] {
        ProgressEvent::Complete { result } => {
            assert!(result.is_completed());
            assert_eq!(result.generated_story, STORY);
            assert_eq!(result.metadata.tool_used.len(), 4);
            assert!(result.metadata.tool_used.iter().all(|t| t.complete));
        }
        other => panic!("expected complete event, got {:?}", other),
    }
}

#[tokio::test]
async fn test_streamed_result_matches_execute() {
    let stub = Arc::new(StubCapability::happy());
    let direct = ContentWorkflow::new(stub.clone()).execute("Mars colonization").await;

    let streamed = match collect(stub).await.pop() {
        Some(ProgressEvent::Complete { result }) => *result,
        other => panic!("expected complete event, got {:?}", other),
    };

    assert_eq!(streamed.research_summary, direct.research_summary);
    assert_eq!(streamed.image_prompt, direct.image_prompt);
    assert_eq!(streamed.story_prompt, direct.story_prompt);
    assert_eq!(streamed.generated_image, direct.generated_image);
    assert_eq!(streamed.generated_story, direct.generated_story);
    assert_eq!(streamed.metadata.tool_used, direct.metadata.tool_used);
    assert_eq!(streamed.metadata.status, direct.metadata.status);
    assert_ne!(streamed.metadata.workflow_id, direct.metadata.workflow_id);
}

#[tokio::test]
async fn test_prompt_failure_ends_with_single_error() {
    let stub = Arc::new(StubCapability::happy().failing(Specialist::PromptGenerator, "rate limited"));
    let events = collect(stub.clone()).await;

    assert_eq!(
        &events[..3],
        &[started(Tool::Research), completed(Tool::Research), started(Tool::Prompt)]
    );
    assert_eq!(events.len(), 4);
    assert!(matches!(&events[3], ProgressEvent::Error { message } if message.contains("rate limited")));

    assert_eq!(stub.call_count(Specialist::Artist), 0);
    assert_eq!(stub.call_count(Specialist::Writer), 0);
}

#[tokio::test(start_paused = true)]
async fn test_content_failure_after_both_started() {
    let stub = Arc::new(
        StubCapability::happy()
            .with_delay(Specialist::Writer, Duration::from_secs(1))
            .failing(Specialist::Writer, "writer crashed"),
    );
    let events = collect(stub).await;

    let tail = &events[events.len() - 3..];
    assert_eq!(tail[0], started(Tool::Image));
    assert_eq!(tail[1], started(Tool::Story));
    assert!(matches!(&tail[2], ProgressEvent::Error { message } if message.contains("writer crashed")));

    let terminal = events.iter().filter(|e| e.is_terminal()).count();
    assert_eq!(terminal, 1);
    assert!(!events.contains(&completed(Tool::Image)));
}

#[tokio::test]
async fn test_stream_is_lazy() {
    let stub = Arc::new(StubCapability::happy());
    let stream = ContentWorkflow::new(stub.clone()).execute_stream("Mars".to_string());

    tokio::task::yield_now().await;
    assert!(stub.calls().is_empty());

    let events: Vec<_> = stream.collect().await;
    assert!(events.last().is_some_and(|e| matches!(e, ProgressEvent::Complete { .. })));
    assert_eq!(stub.calls().len(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_started_events_arrive_before_phase_finishes() {
    let stub = Arc::new(StubCapability::happy().with_delay(Specialist::Researcher, Duration::from_secs(30)));
    let mut stream = Box::pin(ContentWorkflow::new(stub.clone()).execute_stream("Mars".to_string()));

    assert_eq!(stream.next().await, Some(started(Tool::Research)));
    assert!(stub.calls().is_empty());

    assert_eq!(stream.next().await, Some(completed(Tool::Research)));
    assert_eq!(stub.call_count(Specialist::Researcher), 1);
}
