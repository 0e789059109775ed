//! Content-creation workflow orchestration for storyforge
//!
//! This crate provides:
//! - Specialist configuration with per-agent model selection
//! - The content workflow (research, prompts, image and story)
//! - A progress-event stream over the same pipeline
//! - Markdown persistence of finished artifacts
//! - The HTTP API
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use storyforge_orchestrator::{ContentWorkflow, LlmCapability};
//!
//! let capability = Arc::new(LlmCapability::from_config(&config));
//! let result = ContentWorkflow::new(capability)
//!     .execute("A lighthouse keeper on Europa")
//!     .await;
//! ```

pub mod aggregate;
pub mod agent_config;
pub mod backend;
pub mod engine;
pub mod phases;
pub mod prompts;
pub mod service;
pub mod storage;
pub mod streaming;
pub mod web;
pub mod workflow;

pub use agent_config::{OutputKind, SpecialistConfig, SpecialistRegistry};
pub use backend::LlmCapability;
pub use engine::{ContentWorkflow, ToolTracker};
pub use service::ContentService;
pub use storage::{ArtifactStore, MarkdownStore, StorageError};
pub use streaming::{ProgressEvent, ToolProgress};
pub use workflow::{
    ContentCreationResult, PromptGenerationResult, RunState, RunStatus, Tool, ToolUseStatus,
    WorkflowError, WorkflowMetadata,
};

/// Re-export commonly used types from the agent crate
pub use storyforge_agent::{AgentCapability, AgentOutput, InvocationError, Specialist, StudioConfig};
