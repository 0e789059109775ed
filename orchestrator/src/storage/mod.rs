//! Artifact persistence
//!
//! Completed runs can be written to disk as markdown, with the generated
//! image localized into an `images/` directory next to the file.

mod images;
mod markdown;

pub use images::{ImageHandler, ImageSource, SavedImage};
pub use markdown::{render_markdown, ImageEmbed, MarkdownStore};

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::workflow::ContentCreationResult;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("image download failed: {0}")]
    Download(#[from] reqwest::Error),

    #[error("image download returned {0}")]
    DownloadStatus(u16),

    #[error("invalid base64 image data: {0}")]
    Decode(#[from] base64::DecodeError),
}

impl StorageError {
    pub(crate) fn io(path: &Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| StorageError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Somewhere to keep finished artifacts
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Persist an artifact and return where it was written
    async fn persist(&self, result: &ContentCreationResult) -> Result<PathBuf, StorageError>;
}
