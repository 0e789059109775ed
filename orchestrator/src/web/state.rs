//! Shared application state

use std::sync::Arc;

use storyforge_agent::{AgentCapability, StudioConfig};

use crate::service::ContentService;
use crate::storage::{ArtifactStore, MarkdownStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: ContentService,
    /// Default for requests that omit `save_markdown`
    pub save_markdown: bool,
}

impl AppState {
    pub fn new(service: ContentService) -> Self {
        Self {
            service,
            save_markdown: true,
        }
    }

    /// Wire the service to the configured output directory
    pub fn from_config(config: &StudioConfig, capability: Arc<dyn AgentCapability>) -> Self {
        let store: Arc<dyn ArtifactStore> = Arc::new(MarkdownStore::new(config.output.dir.clone()));
        tracing::info!("Saving artifacts under {}", config.output.dir.display());

        Self {
            service: ContentService::new(capability, Some(store)),
            save_markdown: config.output.save_markdown,
        }
    }
}
