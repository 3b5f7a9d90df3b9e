// crates/surface-gate-resolver/src/rpc.rs
// ============================================================================
// Module: JSON-RPC Chain Reader
// Description: eth_call reader for the agent registry tokenURI pointer.
// Purpose: Read the first pointer-chain hop from an EVM JSON-RPC endpoint.
// Dependencies: crate::abi, surface-gate-core, async-trait, reqwest, serde_json, thiserror, tokio, url
// ============================================================================

//! ## Overview
//! The chain reader issues a single JSON-RPC 2.0 `eth_call` against the agent
//! registry contract and ABI-decodes the returned token URI. The HTTP client
//! is bounded: redirects disabled and a fixed short timeout, so a slow or
//! malicious endpoint cannot stall resolution.
//!
//! Security posture: the RPC endpoint and the contract behind it are both
//! untrusted; every response field is checked before use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::redirect::Policy;
use serde_json::Value;
use serde_json::json;
use surface_gate_core::AgentId;
use thiserror::Error;
use url::Url;

use crate::abi::AbiError;
use crate::abi::decode_string_result;
use crate::abi::encode_token_uri_call;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default timeout for one chain read, in milliseconds.
pub const DEFAULT_RPC_TIMEOUT_MS: u64 = 5_000;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Chain read errors.
///
/// # Invariants
/// - `Rpc` carries the endpoint's own error object verbatim; `Transport`
///   covers everything below the JSON-RPC layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// The HTTP request or response handling failed.
    #[error("chain transport failure: {0}")]
    Transport(String),
    /// The endpoint returned a JSON-RPC error object.
    #[error("rpc error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code.
        code: i64,
        /// JSON-RPC error message.
        message: String,
    },
    /// The response carries neither a string result nor an error object.
    #[error("rpc response carries no string result")]
    MissingResult,
    /// The returned call data failed ABI decoding.
    #[error(transparent)]
    Abi(#[from] AbiError),
    /// The chain read did not complete within the configured timeout.
    #[error("chain read timed out")]
    Timeout,
}

impl ChainError {
    /// Returns the stable snake_case error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "chain_transport_failure",
            Self::Rpc {
                ..
            } => "chain_rpc_error",
            Self::MissingResult => "chain_missing_result",
            Self::Abi(_) => "chain_abi_error",
            Self::Timeout => "chain_read_timeout",
        }
    }
}

// ============================================================================
// SECTION: Chain Reader Trait
// ============================================================================

/// Read access to the on-chain agent registry.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Reads the token URI for an agent id from the registry contract.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError`] when the call cannot complete or the return
    /// data cannot be decoded.
    async fn get_token_uri(&self, registry: &str, agent_id: &AgentId)
    -> Result<String, ChainError>;
}

#[async_trait]
impl<T> ChainReader for std::sync::Arc<T>
where
    T: ChainReader + ?Sized,
{
    async fn get_token_uri(
        &self,
        registry: &str,
        agent_id: &AgentId,
    ) -> Result<String, ChainError> {
        self.as_ref().get_token_uri(registry, agent_id).await
    }
}

// ============================================================================
// SECTION: HTTP Implementation
// ============================================================================

/// JSON-RPC chain reader over HTTP.
///
/// # Invariants
/// - Redirects are never followed.
/// - Every call is bounded by the configured timeout.
#[derive(Debug, Clone)]
pub struct HttpChainReader {
    /// JSON-RPC endpoint URL.
    endpoint: Url,
    /// HTTP client used for outbound requests.
    client: Client,
    /// Per-call timeout in milliseconds.
    timeout_ms: u64,
}

impl HttpChainReader {
    /// Creates a reader against the given JSON-RPC endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Transport`] when the HTTP client cannot be
    /// built.
    pub fn new(endpoint: Url) -> Result<Self, ChainError> {
        Self::with_timeout_ms(endpoint, DEFAULT_RPC_TIMEOUT_MS)
    }

    /// Creates a reader with an explicit per-call timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Transport`] when the HTTP client cannot be
    /// built.
    pub fn with_timeout_ms(endpoint: Url, timeout_ms: u64) -> Result<Self, ChainError> {
        let client = Client::builder()
            .redirect(Policy::none())
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|err| ChainError::Transport(err.to_string()))?;
        Ok(Self {
            endpoint,
            client,
            timeout_ms,
        })
    }
}

#[async_trait]
impl ChainReader for HttpChainReader {
    async fn get_token_uri(
        &self,
        registry: &str,
        agent_id: &AgentId,
    ) -> Result<String, ChainError> {
        let data = encode_token_uri_call(agent_id)?;
        let payload = eth_call_payload(registry, &data);
        let request = self.client.post(self.endpoint.clone()).json(&payload).send();
        let response = tokio::time::timeout(Duration::from_millis(self.timeout_ms), request)
            .await
            .map_err(|_| ChainError::Timeout)?
            .map_err(|err| ChainError::Transport(err.to_string()))?;
        let body: Value = response
            .json()
            .await
            .map_err(|err| ChainError::Transport(err.to_string()))?;

        if let Some(error) = body.get("error") {
            return Err(ChainError::Rpc {
                code: error.get("code").and_then(Value::as_i64).unwrap_or(0),
                message: error
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown rpc error")
                    .to_string(),
            });
        }
        let result =
            body.get("result").and_then(Value::as_str).ok_or(ChainError::MissingResult)?;
        Ok(decode_string_result(result)?)
    }
}

// ============================================================================
// SECTION: Request Building
// ============================================================================

/// Builds the JSON-RPC 2.0 `eth_call` payload at the latest block.
#[must_use]
pub fn eth_call_payload(registry: &str, data: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "eth_call",
        "params": [
            { "to": registry, "data": data },
            "latest"
        ]
    })
}
