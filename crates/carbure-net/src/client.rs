//! REST client for the Carbure backend.
//!
//! Every successful backend response wraps its payload in a `data` field;
//! [`ApiClient::get_json`] unwraps it.
//!
//! # Example
//!
//! ```ignore
//! use carbure_net::ApiClient;
//!
//! let client = ApiClient::builder("https://carbure.beta.gouv.fr/api")
//!     .bearer_auth("token")
//!     .timeout(Duration::from_secs(10))
//!     .build()?;
//!
//! let depots: Vec<Depot> = client
//!     .get_json("/resources/depots", &[("query".into(), "fos".into())])
//!     .await?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use carbure_core::logging::targets;

use crate::error::{NetworkError, Result};

/// Builder for an [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ApiClientBuilder {
    base_url: String,
    bearer: Option<String>,
    timeout: Option<Duration>,
    default_query: Vec<(String, String)>,
}

impl ApiClientBuilder {
    /// Start a builder for `base_url`. Request paths are appended to it.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            bearer: None,
            timeout: None,
            default_query: Vec::new(),
        }
    }

    /// Authenticate with `Authorization: Bearer <token>`.
    pub fn bearer_auth(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    /// Total timeout of each request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Query parameter added to every request, such as the current entity.
    pub fn default_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_query.push((key.into(), value.into()));
        self
    }

    /// Build the client.
    ///
    /// Fails with [`NetworkError::InvalidUrl`] unless the base URL is an
    /// absolute http(s) URL.
    pub fn build(self) -> Result<ApiClient> {
        let base_url = self.base_url.trim_end_matches('/').to_string();
        let parsed = Url::parse(&base_url)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(NetworkError::InvalidUrl(format!(
                "unsupported scheme `{}`",
                parsed.scheme()
            )));
        }

        let mut http = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }

        Ok(ApiClient {
            inner: Arc::new(ApiClientInner {
                http: http.build()?,
                base_url,
                bearer: self.bearer,
                default_query: self.default_query,
            }),
        })
    }
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: String,
    bearer: Option<String>,
    default_query: Vec<(String, String)>,
}

/// Client for the Carbure JSON API. Cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

impl ApiClient {
    /// Create a new builder.
    pub fn builder(base_url: impl Into<String>) -> ApiClientBuilder {
        ApiClientBuilder::new(base_url)
    }

    /// The base URL, without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Absolute URL of `path`, with the default and given query parameters.
    pub fn url(&self, path: &str, query: &[(String, String)]) -> Result<Url> {
        let path = path.trim_start_matches('/');
        let mut url = Url::parse(&format!("{}/{}", self.inner.base_url, path))?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in self.inner.default_query.iter().chain(query) {
                pairs.append_pair(key, value);
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }
        Ok(url)
    }

    /// GET `path` and decode the `data` field of the response.
    ///
    /// Non-success statuses become [`NetworkError::HttpStatus`], carrying the
    /// backend's `error` or `message` field when present.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<T> {
        let url = self.url(path, query)?;
        tracing::debug!(target: targets::NET, %url, "GET");

        let mut request = self.inner.http.get(url.clone());
        if let Some(token) = &self.inner.bearer {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = error_message(&body);
            tracing::warn!(target: targets::NET, %url, status = status.as_u16(), ?message, "request failed");
            return Err(NetworkError::HttpStatus {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: Envelope<T> = serde_json::from_slice(&body)?;
        Ok(envelope.data)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .field("has_auth", &self.inner.bearer.is_some())
            .finish()
    }
}

fn error_message(body: &[u8]) -> Option<String> {
    if let Ok(Value::Object(object)) = serde_json::from_slice::<Value>(body) {
        return ["error", "message"]
            .iter()
            .find_map(|key| object.get(*key).and_then(Value::as_str))
            .map(str::to_string);
    }
    let text = String::from_utf8_lossy(body).trim().to_string();
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_normalization() {
        let client = ApiClient::builder("https://carbure.example/api/")
            .build()
            .expect("Failed to build client");
        assert_eq!(client.base_url(), "https://carbure.example/api");
    }

    #[test]
    fn test_url_joins_path_and_query() {
        let client = ApiClient::builder("https://carbure.example/api")
            .default_query("entity_id", "7")
            .build()
            .expect("Failed to build client");

        let url = client
            .url("resources/depots", &[("query".into(), "lavéra".into())])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://carbure.example/api/resources/depots?entity_id=7&query=lav%C3%A9ra"
        );

        let bare = ApiClient::builder("https://carbure.example/api").build().unwrap();
        assert_eq!(
            bare.url("/resources/biofuels", &[]).unwrap().as_str(),
            "https://carbure.example/api/resources/biofuels"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            ApiClient::builder("carbure").build(),
            Err(NetworkError::InvalidUrl(_))
        ));
        assert!(matches!(
            ApiClient::builder("ftp://carbure.example").build(),
            Err(NetworkError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(br#"{"status":"error","error":"ENTITY_NOT_FOUND"}"#),
            Some("ENTITY_NOT_FOUND".to_string())
        );
        assert_eq!(error_message(b"Bad Gateway\n"), Some("Bad Gateway".to_string()));
        assert_eq!(error_message(b""), None);
        assert_eq!(error_message(br#"{"status":"error"}"#), None);
    }
}
