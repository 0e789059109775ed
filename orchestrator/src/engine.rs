//! Content workflow engine
//!
//! Runs one content-creation pipeline:
//! - Research and prompt generation in sequence
//! - Image creation and story writing concurrently
//! - Aggregation into a [`ContentCreationResult`]
//!
//! [`ContentWorkflow::execute`] never fails; a failing phase produces a
//! degraded artifact whose status carries the error message.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::time::Instant;
use uuid::Uuid;

use storyforge_agent::AgentCapability;

use crate::aggregate::{self, PhaseOutputs};
use crate::phases;
use crate::storage::ArtifactStore;
use crate::workflow::{
    ContentCreationResult, PromptGenerationResult, RunState, Tool, ToolUseStatus, WorkflowError,
};

/// Ordered record of which phases have started and finished
///
/// Shared by the two concurrent content phases, so entries live behind a
/// mutex that is never held across an await.
#[derive(Debug, Default)]
pub struct ToolTracker {
    entries: Mutex<Vec<ToolUseStatus>>,
}

impl ToolTracker {
    /// Append an incomplete entry and return its index
    pub fn start(&self, tool: Tool) -> usize {
        let mut entries = self.entries();
        entries.push(ToolUseStatus {
            name: tool,
            complete: false,
        });
        entries.len() - 1
    }

    pub fn complete(&self, index: usize) {
        if let Some(entry) = self.entries().get_mut(index) {
            entry.complete = true;
        }
    }

    pub fn snapshot(&self) -> Vec<ToolUseStatus> {
        self.entries().clone()
    }

    fn entries(&self) -> MutexGuard<'_, Vec<ToolUseStatus>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One content-creation run
pub struct ContentWorkflow {
    id: String,
    capability: Arc<dyn AgentCapability>,
    store: Option<Arc<dyn ArtifactStore>>,
    tracker: ToolTracker,
    state: RunState,
    started_at: Option<Instant>,
}

impl ContentWorkflow {
    pub fn new(capability: Arc<dyn AgentCapability>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            capability,
            store: None,
            tracker: ToolTracker::default(),
            state: RunState::Created,
            started_at: None,
        }
    }

    /// Persist completed artifacts to `store`
    pub fn with_store(mut self, store: Arc<dyn ArtifactStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn tool_status(&self) -> Vec<ToolUseStatus> {
        self.tracker.snapshot()
    }

    /// Run the whole pipeline and return the artifact
    pub async fn execute(&mut self, prompt: &str) -> ContentCreationResult {
        self.begin(prompt);

        let result = match self.run_phases(prompt).await {
            Ok(outputs) => self.finish(outputs),
            Err(e) => self.fail(&e),
        };

        self.persist(&result).await;
        result
    }

    async fn run_phases(&mut self, prompt: &str) -> Result<PhaseOutputs, WorkflowError> {
        let research_summary = self.research(prompt).await?;
        let prompts = self.generate_prompts(prompt, &research_summary).await?;
        let (generated_image, generated_story) = self.create_content(&prompts).await?;

        Ok(PhaseOutputs {
            research_summary,
            prompts,
            generated_image,
            generated_story,
        })
    }

    pub(crate) fn begin(&mut self, prompt: &str) {
        self.started_at = Some(Instant::now());
        tracing::info!(workflow_id = %self.id, prompt = %prompt, "Starting content workflow");
    }

    pub(crate) async fn research(&mut self, prompt: &str) -> Result<String, WorkflowError> {
        self.transition(RunState::Researching);
        let index = self.tracker.start(Tool::Research);

        let summary = phases::research(self.capability.as_ref(), prompt).await?;

        self.tracker.complete(index);
        tracing::info!(workflow_id = %self.id, chars = summary.len(), "Research complete");
        Ok(summary)
    }

    pub(crate) async fn generate_prompts(
        &mut self,
        prompt: &str,
        research: &str,
    ) -> Result<PromptGenerationResult, WorkflowError> {
        self.transition(RunState::Prompting);
        let index = self.tracker.start(Tool::Prompt);

        let prompts = phases::generate_prompts(self.capability.as_ref(), prompt, research).await?;

        self.tracker.complete(index);
        tracing::info!(workflow_id = %self.id, "Prompts generated");
        tracing::debug!(
            image_prompt = %prompts.image_prompt,
            story_prompt = %prompts.story_prompt,
            "Generated prompts"
        );
        Ok(prompts)
    }

    /// Image and story run concurrently; either failure fails both
    pub(crate) async fn create_content(
        &mut self,
        prompts: &PromptGenerationResult,
    ) -> Result<(String, String), WorkflowError> {
        self.transition(RunState::Generating);
        let image_index = self.tracker.start(Tool::Image);
        let story_index = self.tracker.start(Tool::Story);

        let capability = self.capability.as_ref();
        let tracker = &self.tracker;

        let image = async {
            let image = phases::create_image(capability, &prompts.image_prompt).await?;
            tracker.complete(image_index);
            Ok::<_, WorkflowError>(image)
        };
        let story = async {
            let story = phases::write_story(capability, &prompts.story_prompt).await?;
            tracker.complete(story_index);
            Ok::<_, WorkflowError>(story)
        };

        let (image, story) = tokio::try_join!(image, story)?;
        tracing::info!(workflow_id = %self.id, "Image and story complete");
        Ok((image, story))
    }

    pub(crate) fn finish(&mut self, outputs: PhaseOutputs) -> ContentCreationResult {
        self.transition(RunState::Aggregating);
        let result = aggregate::success(&self.id, self.started_at, self.tracker.snapshot(), outputs);
        self.transition(RunState::Completed);

        tracing::info!(
            workflow_id = %self.id,
            seconds = result.metadata.execution_time_seconds,
            "Content workflow completed"
        );
        result
    }

    fn fail(&mut self, error: &WorkflowError) -> ContentCreationResult {
        self.record_failure(error);
        aggregate::failure(&self.id, self.started_at, self.tracker.snapshot(), &error.to_string())
    }

    pub(crate) fn record_failure(&mut self, error: &WorkflowError) {
        self.transition(RunState::Failed);
        tracing::error!(workflow_id = %self.id, tool = %error.tool(), error = %error, "Content workflow failed");
    }

    /// Save a completed artifact; storage failures never fail the run
    pub(crate) async fn persist(&self, result: &ContentCreationResult) {
        let Some(store) = &self.store else {
            return;
        };
        if !result.is_completed() {
            return;
        }

        if let Err(e) = store.persist(result).await {
            tracing::warn!(workflow_id = %self.id, error = %e, "Failed to save artifact");
        }
    }

    fn transition(&mut self, next: RunState) {
        tracing::debug!(workflow_id = %self.id, from = ?self.state, to = ?next, "State transition");
        self.state = next;
    }
}
