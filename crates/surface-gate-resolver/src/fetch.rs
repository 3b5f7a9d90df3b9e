// crates/surface-gate-resolver/src/fetch.rs
// ============================================================================
// Module: Off-Chain Content Fetcher
// Description: Bounded JSON fetcher for agent cards and UI manifests.
// Purpose: Fetch pointer-chain documents with scheme, size, and time limits.
// Dependencies: async-trait, reqwest, serde, serde_json, thiserror, tokio, url
// ============================================================================

//! ## Overview
//! The content fetcher retrieves the off-chain hops of the pointer chain.
//! `ipfs://` URIs are rewritten through a configurable HTTPS gateway; only
//! `https` is allowed outbound (`http` behind an explicit opt-in), redirects
//! are disabled, and response bodies are capped. A fetch either yields parsed
//! JSON or a typed error.
//!
//! Security posture: fetched URIs originate from untrusted on-chain data;
//! every limit here fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::redirect::Policy;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for the HTTP content fetcher.
///
/// # Invariants
/// - `allow_http = false` blocks cleartext `http://` URLs.
/// - `max_response_bytes` is a hard upper bound on accepted bodies.
/// - `timeout_ms` applies to the full request lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct FetcherConfig {
    /// Gateway base URL used to rewrite `ipfs://` URIs.
    pub gateway_base: String,
    /// Allow cleartext HTTP (disabled by default).
    pub allow_http: bool,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum response size allowed, in bytes.
    pub max_response_bytes: usize,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            gateway_base: "https://ipfs.io/ipfs/".to_string(),
            allow_http: false,
            timeout_ms: 5_000,
            max_response_bytes: 1024 * 1024,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Content fetch errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The URI does not parse as a URL after gateway rewriting.
    #[error("invalid uri: {0}")]
    InvalidUri(String),
    /// The URI scheme is outside the allowlist.
    #[error("disallowed uri scheme: {0}")]
    DisallowedScheme(String),
    /// The HTTP request failed below the status layer.
    #[error("fetch transport failure: {0}")]
    Transport(String),
    /// The request did not complete within the configured timeout.
    #[error("fetch timed out")]
    Timeout,
    /// The endpoint answered with a non-success status.
    #[error("fetch failed with http status {0}")]
    HttpStatus(u16),
    /// The response body exceeds the configured size cap.
    #[error("response too large: {actual} > {max}")]
    TooLarge {
        /// Configured maximum body size in bytes.
        max: usize,
        /// Actual body size in bytes.
        actual: usize,
    },
    /// The response body is not valid JSON.
    #[error("response is not valid json: {0}")]
    InvalidJson(String),
}

impl FetchError {
    /// Returns the stable snake_case error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidUri(_) => "fetch_invalid_uri",
            Self::DisallowedScheme(_) => "fetch_disallowed_scheme",
            Self::Transport(_) => "fetch_transport_failure",
            Self::Timeout => "fetch_timeout",
            Self::HttpStatus(_) => "fetch_http_status",
            Self::TooLarge {
                ..
            } => "fetch_response_too_large",
            Self::InvalidJson(_) => "fetch_invalid_json",
        }
    }
}

// ============================================================================
// SECTION: Content Fetcher Trait
// ============================================================================

/// Bounded JSON retrieval for pointer-chain documents.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Fetches and parses one JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when the URI is rejected, the transfer fails,
    /// or the body is not JSON within the size cap.
    async fn fetch_json(&self, uri: &str) -> Result<Value, FetchError>;
}

#[async_trait]
impl<T> ContentFetcher for std::sync::Arc<T>
where
    T: ContentFetcher + ?Sized,
{
    async fn fetch_json(&self, uri: &str) -> Result<Value, FetchError> {
        self.as_ref().fetch_json(uri).await
    }
}

// ============================================================================
// SECTION: HTTP Implementation
// ============================================================================

/// HTTP content fetcher with gateway rewriting and hard limits.
///
/// # Invariants
/// - Redirects are never followed.
/// - Bodies above `max_response_bytes` are rejected, never truncated.
#[derive(Debug, Clone)]
pub struct HttpContentFetcher {
    /// Fetcher configuration, including limits and the IPFS gateway.
    config: FetcherConfig,
    /// HTTP client used for outbound requests.
    client: Client,
}

impl HttpContentFetcher {
    /// Creates a fetcher with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] when the HTTP client cannot be
    /// built.
    pub fn new(config: FetcherConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .redirect(Policy::none())
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|err| FetchError::Transport(err.to_string()))?;
        Ok(Self {
            config,
            client,
        })
    }

    /// Rewrites and validates a URI into a fetchable URL.
    fn admitted_url(&self, uri: &str) -> Result<Url, FetchError> {
        let rewritten = rewrite_ipfs_uri(uri, &self.config.gateway_base)
            .unwrap_or_else(|| uri.to_string());
        let url =
            Url::parse(&rewritten).map_err(|_| FetchError::InvalidUri(rewritten.clone()))?;
        match url.scheme() {
            "https" => {}
            "http" if self.config.allow_http => {}
            scheme => return Err(FetchError::DisallowedScheme(scheme.to_string())),
        }
        Ok(url)
    }
}

#[async_trait]
impl ContentFetcher for HttpContentFetcher {
    async fn fetch_json(&self, uri: &str) -> Result<Value, FetchError> {
        let url = self.admitted_url(uri)?;
        let request = self.client.get(url).send();
        let response = tokio::time::timeout(Duration::from_millis(self.config.timeout_ms), request)
            .await
            .map_err(|_| FetchError::Timeout)?
            .map_err(|err| FetchError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }
        let body =
            response.bytes().await.map_err(|err| FetchError::Transport(err.to_string()))?;
        if body.len() > self.config.max_response_bytes {
            return Err(FetchError::TooLarge {
                max: self.config.max_response_bytes,
                actual: body.len(),
            });
        }
        serde_json::from_slice(&body).map_err(|err| FetchError::InvalidJson(err.to_string()))
    }
}

// ============================================================================
// SECTION: Gateway Rewriting
// ============================================================================

/// Rewrites an `ipfs://` URI through the given HTTPS gateway base.
///
/// Returns `None` for every other scheme; callers pass those URIs through
/// unchanged for scheme validation.
#[must_use]
pub fn rewrite_ipfs_uri(uri: &str, gateway_base: &str) -> Option<String> {
    let path = uri.strip_prefix("ipfs://")?;
    let path = path.trim_start_matches('/');
    if gateway_base.ends_with('/') {
        Some(format!("{gateway_base}{path}"))
    } else {
        Some(format!("{gateway_base}/{path}"))
    }
}
