//! Errors returned by agent invocations

use std::time::Duration;

/// Failure of a single agent invocation
///
/// The orchestrator does not classify these further; it only carries the
/// message into the run status.
#[derive(Debug, thiserror::Error)]
pub enum InvocationError {
    #[error("LLM request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} returned {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("{agent} timed out after {}s", .timeout.as_secs())]
    Timeout { agent: String, timeout: Duration },

    #[error("{agent} returned invalid structured output: {reason}")]
    InvalidOutput { agent: String, reason: String },

    #[error("image generation failed: {0}")]
    Image(String),

    #[error("{0}")]
    Other(String),
}

impl InvocationError {
    pub fn invalid_output(agent: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOutput {
            agent: agent.into(),
            reason: reason.into(),
        }
    }
}
