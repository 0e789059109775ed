//! Saving generated images next to markdown artifacts

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;

use super::StorageError;

/// Raw base64 shorter than this is treated as text
const MIN_RAW_BASE64_LEN: usize = 64;

/// What kind of reference the artist returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource<'a> {
    Url(&'a str),
    /// Base64 payload of a `data:` URL or a bare `...;base64,` string
    DataUrl(&'a str),
    Base64(&'a str),
    /// Anything else: a path or a text description, left inline
    Description,
}

impl<'a> ImageSource<'a> {
    pub fn classify(image: &'a str) -> Self {
        let image = image.trim();

        if image.starts_with("http://") || image.starts_with("https://") {
            return ImageSource::Url(image);
        }
        if let Some((_, payload)) = image.split_once(";base64,") {
            return ImageSource::DataUrl(payload);
        }
        if looks_like_base64(image) {
            return ImageSource::Base64(image);
        }
        ImageSource::Description
    }
}

fn looks_like_base64(s: &str) -> bool {
    s.len() >= MIN_RAW_BASE64_LEN
        && s.bytes().all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'='))
}

/// A localized image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedImage {
    pub path: PathBuf,
    /// Path relative to the markdown file
    pub relative: String,
}

/// Downloads or decodes images into `<output_dir>/images/`
#[derive(Debug, Clone)]
pub struct ImageHandler {
    dir: PathBuf,
    client: reqwest::Client,
}

impl ImageHandler {
    pub fn new(output_dir: impl AsRef<Path>, client: reqwest::Client) -> Self {
        Self {
            dir: output_dir.as_ref().join("images"),
            client,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save an image reference locally
    ///
    /// Returns `None` when the reference is not image data.
    pub async fn save(&self, image: &str, workflow_id: &str) -> Result<Option<SavedImage>, StorageError> {
        let bytes = match ImageSource::classify(image) {
            ImageSource::Url(url) => self.download(url).await?,
            ImageSource::DataUrl(payload) | ImageSource::Base64(payload) => STANDARD.decode(payload)?,
            ImageSource::Description => return Ok(None),
        };

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(StorageError::io(&self.dir))?;

        let id: String = workflow_id.chars().take(8).collect();
        let filename = format!("image_{}_{}.png", id, Utc::now().format("%Y%m%d_%H%M%S"));
        let path = self.dir.join(&filename);
        tokio::fs::write(&path, &bytes).await.map_err(StorageError::io(&path))?;

        tracing::debug!(path = %path.display(), bytes = bytes.len(), "Saved generated image");
        Ok(Some(SavedImage {
            path,
            relative: format!("images/{}", filename),
        }))
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, StorageError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::DownloadStatus(status.as_u16()));
        }
        Ok(response.bytes().await?.to_vec())
    }
}
