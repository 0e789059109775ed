//! Specialist agents, LLM, image and search backends for storyforge

pub mod capability;
pub mod config;
pub mod error;
pub mod images;
pub mod llm;
pub mod search;

pub use capability::{AgentCapability, AgentOutput, Specialist};
pub use config::StudioConfig;
pub use error::InvocationError;
