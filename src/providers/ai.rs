//! AI completion collaborator.

use super::{classify, ProviderError};
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Text completion with a caller-supplied timeout. On timeout the call
/// fails; retry, if any, is the collaborator's concern, not the core's.
#[async_trait]
pub trait AiCompletion: Send + Sync {
    /// Completes `prompt`, bounded by `timeout`.
    async fn complete(&self, prompt: &str, timeout: Duration) -> Result<String, ProviderError>;
}

#[derive(Debug, Deserialize)]
struct CompletionEnvelope {
    result: Option<String>,
    answer: Option<String>,
}

impl CompletionEnvelope {
    fn into_text(self) -> Option<String> {
        self.result.or(self.answer).filter(|text| !text.is_empty())
    }
}

/// Completion implementation against a JSON GET API.
pub struct HttpAiCompletion {
    client: HttpClient,
    url: String,
    api_key: String,
}

impl HttpAiCompletion {
    /// Creates a completion client for the configured endpoint.
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
impl AiCompletion for HttpAiCompletion {
    async fn complete(&self, prompt: &str, timeout: Duration) -> Result<String, ProviderError> {
        debug!(prompt_chars = prompt.len(), "ai completion");
        let envelope: CompletionEnvelope = self
            .client
            .get(&self.url)
            .query(&[("apikey", self.api_key.as_str()), ("q", prompt)])
            .timeout(timeout)
            .send()
            .await
            .map_err(classify)?
            .error_for_status()
            .map_err(classify)?
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        envelope
            .into_text()
            .ok_or_else(|| ProviderError::Malformed("empty completion".to_owned()))
    }
}
