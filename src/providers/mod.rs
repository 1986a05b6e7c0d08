//! External collaborator interfaces and their HTTP implementations.
//!
//! The core consumes four collaborators (media search, media fetch,
//! app lookup, AI completion), each behind its own trait so tests
//! can script them. The shipped implementations talk to JSON GET APIs
//! (api key + query parameters, `{"result": ...}` envelopes).

/// AI completion collaborator
pub mod ai;
/// App lookup collaborator
pub mod apps;
/// Media search and fetch collaborators
pub mod media;

use bytes::Bytes;
use reqwest::Client as HttpClient;
use std::time::Duration;
use thiserror::Error;

/// Failure categories for collaborator calls.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The call exceeded its timeout
    #[error("request timed out")]
    Timeout,

    /// The collaborator answered but had no result
    #[error("no result")]
    NotFound,

    /// The collaborator failed (network error, non-success status)
    #[error("upstream error: {0}")]
    Upstream(String),

    /// The collaborator answered with a body this client cannot use
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Maps a transport-level HTTP error into the taxonomy.
pub(crate) fn classify(error: reqwest::Error) -> ProviderError {
    if error.is_timeout() {
        ProviderError::Timeout
    } else {
        ProviderError::Upstream(error.to_string())
    }
}

/// Creates an HTTP client with a default timeout. Individual calls may
/// tighten or extend it per request.
#[must_use]
pub fn create_http_client(timeout: Duration) -> HttpClient {
    HttpClient::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| HttpClient::new())
}

/// Fetches binary content, bounded by `timeout` and `max_bytes`.
///
/// # Errors
///
/// Returns [`ProviderError::Timeout`] on expiry, [`ProviderError::Upstream`]
/// on non-success status or oversized content.
pub async fn download_bytes(
    client: &HttpClient,
    url: &str,
    timeout: Duration,
    max_bytes: u64,
) -> Result<Bytes, ProviderError> {
    let response = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(classify)?;

    let status = response.status();
    if !status.is_success() {
        return Err(ProviderError::Upstream(format!(
            "HTTP {status} fetching binary content"
        )));
    }

    if let Some(length) = response.content_length() {
        if length > max_bytes {
            return Err(ProviderError::Upstream(format!(
                "content too large: {length} bytes (limit {max_bytes})"
            )));
        }
    }

    let bytes = response.bytes().await.map_err(classify)?;
    if bytes.len() as u64 > max_bytes {
        return Err(ProviderError::Upstream(format!(
            "content too large: {len} bytes (limit {max_bytes})",
            len = bytes.len()
        )));
    }

    Ok(bytes)
}
