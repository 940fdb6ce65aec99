//! HTTP client for direct IMDSv2 requests.

use std::time::Duration;

use reqwest::Client;

use crate::error::MetadataError;
use crate::source::{Fetched, MetadataSource};

/// Default timeout for metadata requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default metadata service base URL (link-local address).
pub const DEFAULT_BASE_URL: &str = "http://169.254.169.254";

/// IMDSv2 token endpoint path.
pub(crate) const TOKEN_PATH: &str = "/latest/api/token";

/// Instance metadata root path.
pub(crate) const META_DATA_PATH: &str = "/latest/meta-data";

/// Token TTL header name.
pub(crate) const TOKEN_TTL_HEADER: &str = "X-aws-ec2-metadata-token-ttl-seconds";

/// Token header name for requests.
pub(crate) const TOKEN_HEADER: &str = "X-aws-ec2-metadata-token";

/// Build the URL of a metadata path relative to the meta-data root.
pub(crate) fn meta_data_url(base_url: &str, path: &str) -> String {
    if path.is_empty() {
        format!("{base_url}{META_DATA_PATH}")
    } else {
        format!("{base_url}{META_DATA_PATH}/{path}")
    }
}

/// HTTP client for the instance metadata service.
#[derive(Debug, Clone)]
pub struct MetadataClient {
    inner: Client,
    base_url: String,
    token_ttl: u64,
}

impl MetadataClient {
    /// Create a new metadata client with the specified timeout and base URL.
    pub fn new(timeout: Duration, base_url: &str) -> Result<Self, reqwest::Error> {
        let inner = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            inner,
            base_url: base_url.trim_end_matches('/').to_string(),
            token_ttl: crate::aws_meta::DEFAULT_TOKEN_TTL,
        })
    }

    /// Create a new metadata client with the default timeout and base URL.
    pub fn with_default_timeout() -> Result<Self, reqwest::Error> {
        Self::new(DEFAULT_TIMEOUT, DEFAULT_BASE_URL)
    }

    /// Create a new metadata client with a custom base URL.
    pub fn with_base_url(base_url: &str) -> Result<Self, reqwest::Error> {
        Self::new(DEFAULT_TIMEOUT, base_url)
    }

    /// Set the TTL, in seconds, requested for session tokens.
    pub fn with_token_ttl(mut self, seconds: u64) -> Self {
        self.token_ttl = seconds;
        self
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the requested token TTL in seconds.
    pub fn token_ttl(&self) -> u64 {
        self.token_ttl
    }
}

impl MetadataSource for MetadataClient {
    async fn token(&self) -> Result<String, MetadataError> {
        let url = format!("{}{}", self.base_url, TOKEN_PATH);

        let response = self
            .inner
            .put(&url)
            .header(TOKEN_TTL_HEADER, self.token_ttl.to_string())
            .send()
            .await
            .map_err(timeout_or_request)?;

        if !response.status().is_success() {
            return Err(MetadataError::Http(response.status().as_u16()));
        }

        let token = response.text().await.map_err(timeout_or_request)?;
        Ok(token.trim().to_string())
    }

    async fn fetch(&self, token: &str, path: &str) -> Result<Fetched, MetadataError> {
        let url = meta_data_url(&self.base_url, path);

        let response = self
            .inner
            .get(&url)
            .header(TOKEN_HEADER, token)
            .send()
            .await
            .map_err(timeout_or_request)?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Ok(Fetched::NotFound);
        }
        if !status.is_success() {
            return Err(MetadataError::Http(status.as_u16()));
        }

        let body = response.text().await.map_err(timeout_or_request)?;
        Ok(Fetched::Body(body.trim().to_string()))
    }
}

fn timeout_or_request(err: reqwest::Error) -> MetadataError {
    if err.is_timeout() {
        MetadataError::Timeout
    } else {
        MetadataError::Request(err)
    }
}
