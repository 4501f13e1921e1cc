//! Configuration for the remote document-QA client.
//!
//! The service contract fixes almost everything: the upload path and the file
//! size limit are constants, and the only deployment-specific value is the
//! base URL. [`ClientConfig`] carries that URL plus the transport knobs a Rust
//! HTTP client needs (timeout, user agent).

use crate::error::DocQaError;
use reqwest::Url;
use std::fmt;

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:10000";

/// Path of the upload endpoint, appended to the base URL.
pub const UPLOAD_PATH: &str = "/api/v1/hackrx/upload";

/// Configuration for [`crate::client::RemoteQaClient`].
///
/// Built via [`ClientConfig::builder()`] or using [`ClientConfig::default()`].
///
/// # Example
/// ```rust
/// use docqa_client::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .base_url("https://qa.example.com")
///     .request_timeout_secs(30)
///     .build()
///     .unwrap();
/// assert_eq!(config.upload_url(), "https://qa.example.com/api/v1/hackrx/upload");
/// ```
#[derive(Clone)]
pub struct ClientConfig {
    /// Scheme, host and optional port (and path prefix) of the backend.
    /// Default: `http://localhost:10000`.
    pub base_url: String,

    /// Whole-request timeout in seconds. Default: 60.
    ///
    /// Document QA runs retrieval and generation server-side for every
    /// question, so a single upload regularly takes tens of seconds.
    pub request_timeout_secs: u64,

    /// `User-Agent` header sent with the upload.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 60,
            user_agent: concat!("docqa-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl ClientConfig {
    /// Create a new builder for `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::default(),
        }
    }

    /// Full URL of the upload endpoint.
    ///
    /// A trailing slash on the base URL is ignored so that
    /// `http://host/` and `http://host` give the same endpoint.
    pub fn upload_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), UPLOAD_PATH)
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ClientConfig, DocQaError> {
        let c = &self.config;
        let parsed = Url::parse(&c.base_url).map_err(|e| {
            DocQaError::InvalidConfig(format!("base URL '{}' is not a valid URL: {}", c.base_url, e))
        })?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(DocQaError::InvalidConfig(format!(
                "base URL must use http or https, got '{}'",
                parsed.scheme()
            )));
        }
        if c.request_timeout_secs == 0 {
            return Err(DocQaError::InvalidConfig(
                "Request timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}
