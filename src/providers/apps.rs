//! App lookup collaborator.

use super::{classify, ProviderError};
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// A resolvable app package.
#[derive(Clone, Debug)]
pub struct AppPackage {
    /// App name as reported by the catalog
    pub name: String,
    /// Version label, if known
    pub version: Option<String>,
    /// Size label, if known
    pub size: Option<String>,
    /// Direct download URL for the package binary
    pub download_url: String,
}

/// App-by-name lookup.
#[async_trait]
pub trait AppLookup: Send + Sync {
    /// Resolves `app_name` to a downloadable package.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::NotFound`] when the catalog has no match.
    async fn lookup(&self, app_name: &str) -> Result<AppPackage, ProviderError>;
}

#[derive(Debug, Deserialize)]
struct LookupEnvelope {
    result: Option<LookupItem>,
}

#[derive(Debug, Deserialize)]
struct LookupItem {
    name: Option<String>,
    version: Option<String>,
    size: Option<String>,
    #[serde(alias = "url")]
    download_url: Option<String>,
}

/// Lookup implementation against a JSON GET API.
pub struct HttpAppLookup {
    client: HttpClient,
    url: String,
    api_key: String,
    timeout: Duration,
}

impl HttpAppLookup {
    /// Creates a lookup client for the configured endpoint.
    #[must_use]
    pub const fn new(client: HttpClient, url: String, api_key: String, timeout: Duration) -> Self {
        Self {
            client,
            url,
            api_key,
            timeout,
        }
    }
}

#[async_trait]
impl AppLookup for HttpAppLookup {
    async fn lookup(&self, app_name: &str) -> Result<AppPackage, ProviderError> {
        debug!(app = %app_name, "app lookup");
        let envelope: LookupEnvelope = self
            .client
            .get(&self.url)
            .query(&[("apikey", self.api_key.as_str()), ("appName", app_name)])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(classify)?
            .error_for_status()
            .map_err(classify)?
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        let item = envelope.result.ok_or(ProviderError::NotFound)?;
        let download_url = item.download_url.ok_or(ProviderError::NotFound)?;

        Ok(AppPackage {
            name: item.name.unwrap_or_else(|| app_name.to_owned()),
            version: item.version,
            size: item.size,
            download_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_envelope_parses_full_item() {
        let body = r#"{"result":{"name":"Signal","version":"7.1.0","size":"48 MB","download_url":"https://cdn/a.apk"}}"#;
        let envelope: LookupEnvelope = serde_json::from_str(body).expect("parse");

        let item = envelope.result.expect("result");
        assert_eq!(item.name.as_deref(), Some("Signal"));
        assert_eq!(item.download_url.as_deref(), Some("https://cdn/a.apk"));
    }

    #[test]
    fn lookup_envelope_tolerates_missing_result() {
        let envelope: LookupEnvelope = serde_json::from_str("{}").expect("parse");
        assert!(envelope.result.is_none());
    }
}
