// crates/surface-gate-resolver/src/lib.rs
// ============================================================================
// Module: Surface Gate Resolver Library
// Description: Pointer-chain resolution from agent registry to UI manifest.
// Purpose: Resolve registry entry -> agent card -> validated UI manifest.
// Dependencies: surface-gate-core, async-trait, hex, reqwest, serde, serde_json, thiserror, tokio, url
// ============================================================================

//! ## Overview
//! The resolver walks the three-hop pointer chain that anchors an agent's UI
//! manifest: an on-chain registry read (`tokenURI`), an off-chain agent-card
//! fetch, and an off-chain manifest fetch that ends in structural validation.
//! Every hop fails with a distinct error so callers can tell transport,
//! pointer, and content failures apart, and no hop is retried.
//! Invariants:
//! - Only the single `tokenURI(uint256)` call shape is encoded or decoded.
//! - Outbound fetches are bounded: redirects disabled, fixed timeout, hard
//!   response size cap, scheme allowlist.
//! - A manifest that fails validation never leaves this crate as a success.
//!
//! Security posture: registry data, agent cards, and manifests are all
//! untrusted remote content.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod abi;
pub mod cache;
pub mod fetch;
pub mod resolver;
pub mod rpc;
pub mod telemetry;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::abi::AbiError;
pub use crate::abi::TOKEN_URI_SELECTOR;
pub use crate::abi::decode_string_result;
pub use crate::abi::encode_token_uri_call;
pub use crate::cache::InMemoryManifestCache;
pub use crate::cache::ManifestCache;
pub use crate::cache::NoopManifestCache;
pub use crate::fetch::ContentFetcher;
pub use crate::fetch::FetchError;
pub use crate::fetch::FetcherConfig;
pub use crate::fetch::HttpContentFetcher;
pub use crate::fetch::rewrite_ipfs_uri;
pub use crate::resolver::PointerChainResolver;
pub use crate::resolver::PointerChainResult;
pub use crate::resolver::ResolveError;
pub use crate::resolver::ResolverConfig;
pub use crate::rpc::ChainError;
pub use crate::rpc::ChainReader;
pub use crate::rpc::DEFAULT_RPC_TIMEOUT_MS;
pub use crate::rpc::HttpChainReader;
pub use crate::rpc::eth_call_payload;
pub use crate::telemetry::Hop;
pub use crate::telemetry::HopOutcome;
pub use crate::telemetry::NoopResolverMetrics;
pub use crate::telemetry::ResolverMetrics;
