//! Progress-event streaming
//!
//! [`ContentWorkflow::execute_stream`] runs the same pipeline as `execute`
//! but yields a [`ProgressEvent`] around every phase. The stream ends with
//! exactly one `complete` or `error` event.

use futures_util::Stream;
use serde::{Deserialize, Serialize};

use crate::aggregate::PhaseOutputs;
use crate::engine::ContentWorkflow;
use crate::workflow::{ContentCreationResult, Tool};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolProgress {
    Started,
    Completed,
}

/// One event on the progress stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    ToolUpdate { tool: Tool, status: ToolProgress },
    Complete { result: Box<ContentCreationResult> },
    Error { message: String },
}

impl ProgressEvent {
    pub fn started(tool: Tool) -> Self {
        ProgressEvent::ToolUpdate {
            tool,
            status: ToolProgress::Started,
        }
    }

    pub fn completed(tool: Tool) -> Self {
        ProgressEvent::ToolUpdate {
            tool,
            status: ToolProgress::Completed,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ProgressEvent::ToolUpdate { .. })
    }
}

impl ContentWorkflow {
    /// Run the pipeline lazily, yielding progress as phases start and finish
    ///
    /// Nothing runs until the stream is polled. Dropping the stream stops the
    /// run at its next suspension point.
    pub fn execute_stream(mut self, prompt: String) -> impl Stream<Item = ProgressEvent> + Send {
        async_stream::stream! {
            self.begin(&prompt);

            yield ProgressEvent::started(Tool::Research);
            let research_summary = match self.research(&prompt).await {
                Ok(summary) => summary,
                Err(e) => {
                    self.record_failure(&e);
                    yield ProgressEvent::Error { message: e.to_string() };
                    return;
                }
            };
            yield ProgressEvent::completed(Tool::Research);

            yield ProgressEvent::started(Tool::Prompt);
            let prompts = match self.generate_prompts(&prompt, &research_summary).await {
                Ok(prompts) => prompts,
                Err(e) => {
                    self.record_failure(&e);
                    yield ProgressEvent::Error { message: e.to_string() };
                    return;
                }
            };
            yield ProgressEvent::completed(Tool::Prompt);

            yield ProgressEvent::started(Tool::Image);
            yield ProgressEvent::started(Tool::Story);
            let (generated_image, generated_story) = match self.create_content(&prompts).await {
                Ok(content) => content,
                Err(e) => {
                    self.record_failure(&e);
                    yield ProgressEvent::Error { message: e.to_string() };
                    return;
                }
            };
            yield ProgressEvent::completed(Tool::Image);
            yield ProgressEvent::completed(Tool::Story);

            let result = self.finish(PhaseOutputs {
                research_summary,
                prompts,
                generated_image,
                generated_story,
            });
            self.persist(&result).await;

            yield ProgressEvent::Complete { result: Box::new(result) };
        }
    }
}
