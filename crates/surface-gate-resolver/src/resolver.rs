// crates/surface-gate-resolver/src/resolver.rs
// ============================================================================
// Module: Pointer-Chain Resolver
// Description: Three-hop resolution from registry entry to validated manifest.
// Purpose: Tie the chain reader, fetcher, cache, and validator together.
// Dependencies: crate::{cache, fetch, rpc, telemetry}, surface-gate-core, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Resolution walks three hops: `tokenURI` on the registry contract yields
//! the agent-card URI, the agent card yields the manifest pointer, and the
//! manifest fetch ends in structural validation. Each hop failure is a
//! distinct [`ResolveError`] variant, no hop is retried, and the manifest
//! hop consults the cache seam before fetching.
//!
//! Security posture: everything the chain and the fetches return is
//! untrusted; a resolution only succeeds with a fully validated manifest.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde_json::Value;
use surface_gate_core::AgentId;
use surface_gate_core::Issue;
use surface_gate_core::UiManifest;
use thiserror::Error;

use crate::cache::ManifestCache;
use crate::cache::NoopManifestCache;
use crate::fetch::ContentFetcher;
use crate::fetch::FetchError;
use crate::rpc::ChainError;
use crate::rpc::ChainReader;
use crate::telemetry::Hop;
use crate::telemetry::HopOutcome;
use crate::telemetry::NoopResolverMetrics;
use crate::telemetry::ResolverMetrics;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for the pointer-chain resolver.
///
/// # Invariants
/// - `manifest_pointer_field` names the agent-card field holding the
///   manifest URI; registries that use a different key configure it here.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct ResolverConfig {
    /// Agent-card field holding the manifest URI.
    pub manifest_pointer_field: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            manifest_pointer_field: "uiManifestUri".to_string(),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Pointer-chain resolution errors, one variant per failure site.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The registry address is blank.
    #[error("agent registry address is missing")]
    AgentRegistryMissing,
    /// The on-chain read failed.
    #[error(transparent)]
    Chain(#[from] ChainError),
    /// The agent-card fetch failed.
    #[error("agent card fetch failed: {0}")]
    CardFetch(FetchError),
    /// The agent card carries no usable manifest pointer.
    #[error("pointer chain failed: {reason}")]
    PointerChainFailed {
        /// Why the pointer could not be followed.
        reason: String,
    },
    /// The manifest fetch failed.
    #[error("manifest fetch failed: {0}")]
    ManifestFetch(FetchError),
    /// The fetched manifest failed structural validation.
    #[error("manifest failed validation with {} issue(s)", issues.len())]
    ManifestInvalid {
        /// Every validation issue found.
        issues: Vec<Issue>,
    },
}

impl ResolveError {
    /// Returns the stable snake_case error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::AgentRegistryMissing => "agent_registry_missing",
            Self::Chain(_) => "chain_read_failed",
            Self::CardFetch(_) => "agent_card_fetch_failed",
            Self::PointerChainFailed {
                ..
            } => "pointer_chain_failed",
            Self::ManifestFetch(_) => "manifest_fetch_failed",
            Self::ManifestInvalid {
                ..
            } => "manifest_invalid",
        }
    }
}

// ============================================================================
// SECTION: Resolution Result
// ============================================================================

/// Successful three-hop resolution.
///
/// # Invariants
/// - `manifest` passed structural validation before this value was built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerChainResult {
    /// Raw agent-card document from hop two.
    pub agent_card: Value,
    /// Validated UI manifest from hop three.
    pub manifest: UiManifest,
}

// ============================================================================
// SECTION: Resolver
// ============================================================================

/// Three-hop pointer-chain resolver.
///
/// # Invariants
/// - No hop is retried; the first failure ends the resolution.
/// - Only validated manifests enter the cache.
pub struct PointerChainResolver<R, F> {
    /// On-chain registry reader (hop one).
    reader: R,
    /// Off-chain document fetcher (hops two and three).
    fetcher: F,
    /// Manifest cache consulted before hop three.
    cache: Box<dyn ManifestCache>,
    /// Hop outcome recorder.
    metrics: Box<dyn ResolverMetrics>,
    /// Resolver configuration.
    config: ResolverConfig,
}

impl<R, F> PointerChainResolver<R, F>
where
    R: ChainReader,
    F: ContentFetcher,
{
    /// Creates a resolver with no cache and no metrics backend.
    pub fn new(reader: R, fetcher: F, config: ResolverConfig) -> Self {
        Self {
            reader,
            fetcher,
            cache: Box::new(NoopManifestCache),
            metrics: Box::new(NoopResolverMetrics),
            config,
        }
    }

    /// Replaces the manifest cache seam.
    #[must_use]
    pub fn with_cache(mut self, cache: impl ManifestCache + 'static) -> Self {
        self.cache = Box::new(cache);
        self
    }

    /// Replaces the metrics recorder.
    #[must_use]
    pub fn with_metrics(mut self, metrics: impl ResolverMetrics + 'static) -> Self {
        self.metrics = Box::new(metrics);
        self
    }

    /// Resolves an agent's UI manifest through the full pointer chain.
    ///
    /// # Errors
    ///
    /// Returns the [`ResolveError`] variant naming the hop that failed.
    pub async fn resolve(
        &self,
        registry: &str,
        agent_id: &AgentId,
    ) -> Result<PointerChainResult, ResolveError> {
        if registry.trim().is_empty() {
            return Err(ResolveError::AgentRegistryMissing);
        }

        let card_uri = self.hop(Hop::ChainRead, async {
            self.reader.get_token_uri(registry, agent_id).await.map_err(ResolveError::Chain)
        })
        .await?;

        let agent_card = self.hop(Hop::CardFetch, async {
            self.fetcher.fetch_json(&card_uri).await.map_err(ResolveError::CardFetch)
        })
        .await?;
        let manifest_uri = extract_pointer(&agent_card, &self.config.manifest_pointer_field)?;

        if let Some(manifest) = self.cache.get(&manifest_uri) {
            self.metrics.record_hop(Hop::ManifestFetch, HopOutcome::Success);
            return Ok(PointerChainResult {
                agent_card,
                manifest,
            });
        }
        let manifest = self.hop(Hop::ManifestFetch, async {
            let value =
                self.fetcher.fetch_json(&manifest_uri).await.map_err(ResolveError::ManifestFetch)?;
            UiManifest::from_value(&value).map_err(|report| ResolveError::ManifestInvalid {
                issues: report.issues,
            })
        })
        .await?;
        self.cache.put(&manifest_uri, &manifest);

        Ok(PointerChainResult {
            agent_card,
            manifest,
        })
    }

    /// Runs one hop and records its outcome.
    async fn hop<T>(
        &self,
        hop: Hop,
        work: impl Future<Output = Result<T, ResolveError>>,
    ) -> Result<T, ResolveError> {
        let result = work.await;
        let outcome = if result.is_ok() { HopOutcome::Success } else { HopOutcome::Failure };
        self.metrics.record_hop(hop, outcome);
        result
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Extracts the manifest pointer from an agent card.
fn extract_pointer(agent_card: &Value, field: &str) -> Result<String, ResolveError> {
    match agent_card.get(field) {
        Some(Value::String(uri)) if !uri.trim().is_empty() => Ok(uri.clone()),
        Some(_) => Err(ResolveError::PointerChainFailed {
            reason: format!("agent card field {field} is not a non-empty string"),
        }),
        None => Err(ResolveError::PointerChainFailed {
            reason: format!("agent card has no field {field}"),
        }),
    }
}
