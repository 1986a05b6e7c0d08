//! Media search and fetch collaborators.
//!
//! Search resolves a free-text query to its top hit; fetch turns the
//! hit's canonical URL into a direct download URL through a converter
//! API. Both are lenient about response field names, since the upstream
//! services rename them between revisions.

use super::{classify, ProviderError};
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Top search result for a free-text query.
#[derive(Clone, Debug)]
pub struct MediaHit {
    /// Result title
    pub title: String,
    /// Canonical URL (input to [`MediaFetch`])
    pub url: String,
    /// Human-readable duration label
    pub duration: String,
    /// Thumbnail URL, if the service provides one
    pub thumbnail: Option<String>,
}

/// Resolved direct-download information for a canonical URL.
#[derive(Clone, Debug)]
pub struct ResolvedMedia {
    /// Title as reported by the converter
    pub title: String,
    /// Direct download URL for the binary
    pub download_url: String,
    /// Human-readable duration label
    pub duration: String,
}

/// Which rendition of the media to resolve.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchKind {
    /// Audio-only rendition
    Audio,
    /// Full video rendition
    Video,
}

/// Free-text media search.
#[async_trait]
pub trait MediaSearch: Send + Sync {
    /// Returns the top hit for `query`, or `None` when nothing matches.
    async fn search(&self, query: &str) -> Result<Option<MediaHit>, ProviderError>;
}

/// Canonical-URL-to-download-URL resolution.
#[async_trait]
pub trait MediaFetch: Send + Sync {
    /// Resolves `canonical_url` into a direct download for `kind`.
    async fn fetch(
        &self,
        canonical_url: &str,
        kind: FetchKind,
    ) -> Result<ResolvedMedia, ProviderError>;
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(default, alias = "results")]
    result: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    title: Option<String>,
    #[serde(alias = "link")]
    url: Option<String>,
    #[serde(alias = "timestamp")]
    duration: Option<String>,
    #[serde(alias = "thumb")]
    thumbnail: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FetchEnvelope {
    result: Option<FetchItem>,
}

#[derive(Debug, Deserialize)]
struct FetchItem {
    title: Option<String>,
    #[serde(alias = "url")]
    download_url: Option<String>,
    duration: Option<String>,
}

/// Search implementation against a JSON GET API.
pub struct HttpMediaSearch {
    client: HttpClient,
    url: String,
    api_key: String,
}

impl HttpMediaSearch {
    /// Creates a search client for the configured endpoint.
    #[must_use]
    pub const fn new(client: HttpClient, url: String, api_key: String) -> Self {
        Self {
            client,
            url,
            api_key,
        }
    }
}

#[async_trait]
impl MediaSearch for HttpMediaSearch {
    async fn search(&self, query: &str) -> Result<Option<MediaHit>, ProviderError> {
        debug!(%query, "media search");
        let envelope: SearchEnvelope = self
            .client
            .get(&self.url)
            .query(&[("apikey", self.api_key.as_str()), ("query", query)])
            .send()
            .await
            .map_err(classify)?
            .error_for_status()
            .map_err(classify)?
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        let hit = envelope.result.into_iter().find_map(|item| {
            let url = item.url?;
            Some(MediaHit {
                title: item.title.unwrap_or_else(|| "Unknown".to_owned()),
                url,
                duration: item.duration.unwrap_or_else(|| "Unknown".to_owned()),
                thumbnail: item.thumbnail,
            })
        });

        Ok(hit)
    }
}

/// Fetch implementation against audio/video converter endpoints.
pub struct HttpMediaFetch {
    client: HttpClient,
    audio_url: String,
    video_url: String,
    api_key: String,
    timeout: Duration,
}

impl HttpMediaFetch {
    /// Creates a fetch client for the configured converter endpoints.
    #[must_use]
    pub const fn new(
        client: HttpClient,
        audio_url: String,
        video_url: String,
        api_key: String,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            audio_url,
            video_url,
            api_key,
            timeout,
        }
    }
}

#[async_trait]
impl MediaFetch for HttpMediaFetch {
    async fn fetch(
        &self,
        canonical_url: &str,
        kind: FetchKind,
    ) -> Result<ResolvedMedia, ProviderError> {
        let endpoint = match kind {
            FetchKind::Audio => &self.audio_url,
            FetchKind::Video => &self.video_url,
        };
        debug!(url = %canonical_url, ?kind, "media fetch");

        let envelope: FetchEnvelope = self
            .client
            .get(endpoint)
            .query(&[("apikey", self.api_key.as_str()), ("url", canonical_url)])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(classify)?
            .error_for_status()
            .map_err(classify)?
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        let item = envelope
            .result
            .ok_or_else(|| ProviderError::Malformed("missing result object".to_owned()))?;
        let download_url = item
            .download_url
            .ok_or_else(|| ProviderError::Malformed("missing download url".to_owned()))?;

        Ok(ResolvedMedia {
            title: item.title.unwrap_or_else(|| "Unknown".to_owned()),
            download_url,
            duration: item.duration.unwrap_or_else(|| "Unknown".to_owned()),
        })
    }
}
