//! Markdown artifact store

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{ArtifactStore, ImageHandler, ImageSource, StorageError};
use crate::workflow::ContentCreationResult;

/// How the generated image appears in the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageEmbed {
    /// A saved file or a remote URL, rendered as an image link
    Link(String),
    /// Anything else, rendered as a blockquote
    Description(String),
}

impl ImageEmbed {
    /// Embed an unsaved reference: URLs link, everything else is quoted
    pub fn from_reference(reference: &str) -> Self {
        match ImageSource::classify(reference) {
            ImageSource::Url(url) => ImageEmbed::Link(url.to_string()),
            _ => ImageEmbed::Description(reference.to_string()),
        }
    }
}

/// Writes `<output_dir>/content_<id8>_<YYYYmmdd_HHMMSS>.md`
#[derive(Debug, Clone)]
pub struct MarkdownStore {
    output_dir: PathBuf,
    images: ImageHandler,
}

impl MarkdownStore {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self::with_client(output_dir, reqwest::Client::new())
    }

    pub fn with_client(output_dir: impl Into<PathBuf>, client: reqwest::Client) -> Self {
        let output_dir = output_dir.into();
        Self {
            images: ImageHandler::new(&output_dir, client),
            output_dir,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn file_path(&self, result: &ContentCreationResult) -> PathBuf {
        let id: String = result.metadata.workflow_id.chars().take(8).collect();
        let stamp = result.metadata.timestamp.format("%Y%m%d_%H%M%S");
        self.output_dir.join(format!("content_{}_{}.md", id, stamp))
    }

    /// Localize the image if possible, falling back to the original reference
    async fn image_embed(&self, result: &ContentCreationResult) -> Option<ImageEmbed> {
        let image = result.generated_image.as_deref()?;

        match self.images.save(image, &result.metadata.workflow_id).await {
            Ok(Some(saved)) => Some(ImageEmbed::Link(saved.relative)),
            Ok(None) => Some(ImageEmbed::from_reference(image)),
            Err(e) => {
                tracing::warn!(
                    workflow_id = %result.metadata.workflow_id,
                    error = %e,
                    "Failed to save generated image, keeping original reference"
                );
                Some(ImageEmbed::from_reference(image))
            }
        }
    }
}

#[async_trait]
impl ArtifactStore for MarkdownStore {
    async fn persist(&self, result: &ContentCreationResult) -> Result<PathBuf, StorageError> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(StorageError::io(&self.output_dir))?;

        let image = self.image_embed(result).await;
        let path = self.file_path(result);
        let body = render_markdown(result, image);
        tokio::fs::write(&path, body).await.map_err(StorageError::io(&path))?;

        tracing::info!(
            workflow_id = %result.metadata.workflow_id,
            path = %path.display(),
            "Saved content to markdown"
        );
        Ok(path)
    }
}

/// Render an artifact as a markdown document
///
/// `image` overrides `generated_image` when the image was saved locally.
pub fn render_markdown(result: &ContentCreationResult, image: Option<ImageEmbed>) -> String {
    let meta = &result.metadata;
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(out, "# Content Creation Result\n");
    let _ = writeln!(out, "**Workflow ID:** `{}`  ", meta.workflow_id);
    let _ = writeln!(out, "**Created:** {}\n", meta.timestamp.format("%Y-%m-%d %H:%M:%S UTC"));

    let _ = writeln!(out, "## Research Summary\n\n{}\n", result.research_summary.trim());

    if result.image_prompt.is_some() || result.story_prompt.is_some() {
        let _ = writeln!(out, "## Prompts\n");
        if let Some(prompt) = &result.image_prompt {
            let _ = writeln!(out, "**Image prompt:** {}\n", prompt.trim());
        }
        if let Some(prompt) = &result.story_prompt {
            let _ = writeln!(out, "**Story prompt:** {}\n", prompt.trim());
        }
    }

    let _ = writeln!(out, "## Generated Image\n");
    let embed = image.or_else(|| result.generated_image.as_deref().map(ImageEmbed::from_reference));
    match embed {
        Some(ImageEmbed::Link(reference)) => {
            let _ = writeln!(out, "![Generated image]({})\n", reference);
        }
        Some(ImageEmbed::Description(description)) => {
            for line in description.trim().lines() {
                let _ = writeln!(out, "> {}", line);
            }
            out.push('\n');
        }
        None => {
            let _ = writeln!(out, "_No image generated._\n");
        }
    }

    let _ = writeln!(out, "## Story\n\n{}\n", result.generated_story.trim());

    let _ = writeln!(out, "## Metadata\n");
    let _ = writeln!(out, "| Field | Value |");
    let _ = writeln!(out, "|---|---|");
    let _ = writeln!(out, "| Status | {} |", meta.status);
    let _ = writeln!(out, "| Execution time | {:.2}s |", meta.execution_time_seconds);
    let tools: Vec<String> = meta
        .tool_used
        .iter()
        .map(|t| format!("{} ({})", t.name, if t.complete { "complete" } else { "incomplete" }))
        .collect();
    let _ = writeln!(out, "| Tools | {} |", tools.join(", "));

    out
}
