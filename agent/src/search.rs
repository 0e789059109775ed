//! Web search backend for the researcher
//!
//! Trait-based so the researcher can run against a self-hosted SearXNG
//! instance or a stub in tests.
//! See: https://docs.searxng.org/dev/search_api.html

use std::fmt::Write as _;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::SearchConfig;
use crate::error::InvocationError;

/// A single web search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    /// Snippet of the page, may be empty
    pub description: String,
}

/// Trait for search backends
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Get the name of this backend
    fn name(&self) -> &str;

    /// Perform a web search
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, InvocationError>;
}

/// SearXNG backend
pub struct SearxngBackend {
    client: reqwest::Client,
    url: String,
    engines: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearxngResponse {
    #[serde(default)]
    results: Vec<SearxngResult>,
}

#[derive(Debug, Deserialize)]
struct SearxngResult {
    title: String,
    url: String,
    content: Option<String>,
    img_src: Option<String>,
}

impl SearxngBackend {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into().trim_end_matches('/').to_string(),
            engines: None,
        }
    }

    /// Build a backend from config; `None` when no search URL is configured
    pub fn from_config(client: reqwest::Client, config: &SearchConfig) -> Option<Self> {
        let url = config.url.as_deref().filter(|u| !u.is_empty())?;
        Some(Self {
            engines: config.engines.clone().filter(|e| !e.is_empty()),
            ..Self::new(client, url)
        })
    }
}

#[async_trait]
impl SearchBackend for SearxngBackend {
    fn name(&self) -> &str {
        "searxng"
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, InvocationError> {
        let mut params = vec![
            ("q", query.to_string()),
            ("format", "json".to_string()),
            ("pageno", "1".to_string()),
        ];
        if let Some(engines) = &self.engines {
            params.push(("engines", engines.clone()));
        }

        let response = self
            .client
            .get(format!("{}/search", self.url))
            .query(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(InvocationError::Status {
                service: "searxng",
                status,
                body,
            });
        }

        let parsed: SearxngResponse = response.json().await?;
        Ok(web_results(parsed, limit))
    }
}

fn web_results(response: SearxngResponse, limit: usize) -> Vec<SearchResult> {
    response
        .results
        .into_iter()
        // Image-only hits carry a non-empty img_src
        .filter(|r| r.img_src.as_ref().map_or(true, |s| s.is_empty()))
        .take(limit)
        .map(|r| SearchResult {
            title: r.title,
            url: r.url,
            description: r.content.unwrap_or_default(),
        })
        .collect()
}

/// Render results as a numbered markdown list
pub fn format_results(results: &[SearchResult]) -> String {
    let mut out = String::new();
    for (i, result) in results.iter().enumerate() {
        let _ = writeln!(out, "{}. [{}]({})", i + 1, result.title, result.url);
        if !result.description.is_empty() {
            let _ = writeln!(out, "   {}", result.description);
        }
    }
    out
}
