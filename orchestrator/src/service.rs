//! Entry points used by the HTTP layer and the CLI

use std::sync::Arc;

use futures_util::Stream;

use storyforge_agent::AgentCapability;

use crate::engine::ContentWorkflow;
use crate::storage::ArtifactStore;
use crate::streaming::ProgressEvent;
use crate::workflow::ContentCreationResult;

/// Creates a fresh [`ContentWorkflow`] per request
#[derive(Clone)]
pub struct ContentService {
    capability: Arc<dyn AgentCapability>,
    store: Option<Arc<dyn ArtifactStore>>,
}

impl ContentService {
    pub fn new(capability: Arc<dyn AgentCapability>, store: Option<Arc<dyn ArtifactStore>>) -> Self {
        Self { capability, store }
    }

    fn workflow(&self, save_markdown: bool) -> ContentWorkflow {
        let workflow = ContentWorkflow::new(self.capability.clone());
        match (&self.store, save_markdown) {
            (Some(store), true) => workflow.with_store(store.clone()),
            _ => workflow,
        }
    }

    pub async fn create_content(&self, prompt: &str, save_markdown: bool) -> ContentCreationResult {
        self.workflow(save_markdown).execute(prompt).await
    }

    pub fn create_content_stream(
        &self,
        prompt: String,
        save_markdown: bool,
    ) -> impl Stream<Item = ProgressEvent> + Send + 'static {
        self.workflow(save_markdown).execute_stream(prompt)
    }
}
