// crates/surface-gate-resolver/tests/resolver_hops.rs
// ============================================================================
// Module: Pointer-Chain Resolver Tests
// Description: Hop-by-hop resolution tests using stub reader and fetcher.
// Purpose: Ensure each hop failure maps to its own error variant.
// Dependencies: surface-gate-resolver, surface-gate-core, serde_json, tokio
// ============================================================================

//! Pointer-chain resolution with stubbed chain and fetch hops.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use serde_json::Value;
use serde_json::json;
use surface_gate_core::AgentId;
use surface_gate_resolver::ChainError;
use surface_gate_resolver::ChainReader;
use surface_gate_resolver::ContentFetcher;
use surface_gate_resolver::FetchError;
use surface_gate_resolver::Hop;
use surface_gate_resolver::HopOutcome;
use surface_gate_resolver::InMemoryManifestCache;
use surface_gate_resolver::PointerChainResolver;
use surface_gate_resolver::ResolveError;
use surface_gate_resolver::ResolverConfig;
use surface_gate_resolver::ResolverMetrics;

// ============================================================================
// SECTION: Stubs
// ============================================================================

/// Chain reader answering from a fixed result.
struct StubReader {
    /// Result returned for every read.
    result: Result<String, ChainError>,
}

#[async_trait]
impl ChainReader for StubReader {
    async fn get_token_uri(
        &self,
        _registry: &str,
        _agent_id: &AgentId,
    ) -> Result<String, ChainError> {
        self.result.clone()
    }
}

/// Fetcher answering from a fixed uri-to-document table.
#[derive(Default)]
struct StubFetcher {
    /// Documents keyed by URI.
    documents: HashMap<String, Value>,
    /// Number of fetches issued.
    calls: AtomicUsize,
}

impl StubFetcher {
    fn with(mut self, uri: &str, document: Value) -> Self {
        self.documents.insert(uri.to_string(), document);
        self
    }
}

#[async_trait]
impl ContentFetcher for StubFetcher {
    async fn fetch_json(&self, uri: &str) -> Result<Value, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.documents.get(uri).cloned().ok_or(FetchError::HttpStatus(404))
    }
}

/// Metrics recorder collecting every observation.
#[derive(Default, Clone)]
struct RecordingMetrics {
    /// Observed hop outcomes in call order.
    observed: Arc<Mutex<Vec<(Hop, HopOutcome)>>>,
}

impl ResolverMetrics for RecordingMetrics {
    fn record_hop(&self, hop: Hop, outcome: HopOutcome) {
        if let Ok(mut observed) = self.observed.lock() {
            observed.push((hop, outcome));
        }
    }
}

// ============================================================================
// SECTION: Fixtures
// ============================================================================

const REGISTRY: &str = "eip155:1:0x00";
const CARD_URI: &str = "https://agents.example.com/7/card.json";
const MANIFEST_URI: &str = "https://agents.example.com/7/ui-manifest.json";

fn valid_manifest() -> Value {
    json!({
        "type": "https://a2ui.org/schemas/ui-manifest",
        "manifestVersion": "2",
        "agentRegistry": REGISTRY,
        "agentId": "7",
        "updatedAt": "2026-08-30T00:00:00Z",
        "a2ui": {
            "version": "0.9",
            "extensionUri": "https://a2ui.org/extensions/render/v1",
            "dataPartMime": "application/vnd.a2ui+json",
            "supportedCatalogIds": ["catalog-1"],
            "acceptsInlineCatalogs": false
        },
        "widgets": [
            { "id": "w-1", "surfaceContract": { "surfaceIds": ["preview"] }, "events": [] }
        ]
    })
}

fn agent_card() -> Value {
    json!({ "name": "Example Agent", "uiManifestUri": MANIFEST_URI })
}

fn happy_fetcher() -> StubFetcher {
    StubFetcher::default()
        .with(CARD_URI, agent_card())
        .with(MANIFEST_URI, valid_manifest())
}

fn happy_reader() -> StubReader {
    StubReader {
        result: Ok(CARD_URI.to_string()),
    }
}

// ============================================================================
// SECTION: Resolution Tests
// ============================================================================

#[tokio::test(flavor = "current_thread")]
async fn full_chain_resolves_a_validated_manifest() {
    let resolver =
        PointerChainResolver::new(happy_reader(), happy_fetcher(), ResolverConfig::default());
    let result = resolver.resolve(REGISTRY, &AgentId::new("7")).await.unwrap();
    assert_eq!(result.manifest.agent_id, "7");
    assert_eq!(result.agent_card["name"], "Example Agent");
}

#[tokio::test(flavor = "current_thread")]
async fn blank_registry_fails_before_the_first_hop() {
    let resolver =
        PointerChainResolver::new(happy_reader(), happy_fetcher(), ResolverConfig::default());
    let result = resolver.resolve("  ", &AgentId::new("7")).await;
    assert_eq!(result, Err(ResolveError::AgentRegistryMissing));
}

#[tokio::test(flavor = "current_thread")]
async fn chain_failures_surface_as_chain_errors() {
    let reader = StubReader {
        result: Err(ChainError::Rpc {
            code: -32000,
            message: "execution reverted".to_string(),
        }),
    };
    let resolver = PointerChainResolver::new(reader, happy_fetcher(), ResolverConfig::default());
    let result = resolver.resolve(REGISTRY, &AgentId::new("7")).await;
    let Err(err) = result else {
        panic!("expected a chain failure");
    };
    assert_eq!(err.code(), "chain_read_failed");
}

#[tokio::test(flavor = "current_thread")]
async fn card_fetch_failures_are_distinct_from_manifest_fetch_failures() {
    let fetcher = StubFetcher::default().with(MANIFEST_URI, valid_manifest());
    let resolver = PointerChainResolver::new(happy_reader(), fetcher, ResolverConfig::default());
    let result = resolver.resolve(REGISTRY, &AgentId::new("7")).await;
    assert_eq!(result, Err(ResolveError::CardFetch(FetchError::HttpStatus(404))));

    let fetcher = StubFetcher::default().with(CARD_URI, agent_card());
    let resolver = PointerChainResolver::new(happy_reader(), fetcher, ResolverConfig::default());
    let result = resolver.resolve(REGISTRY, &AgentId::new("7")).await;
    assert_eq!(result, Err(ResolveError::ManifestFetch(FetchError::HttpStatus(404))));
}

#[tokio::test(flavor = "current_thread")]
async fn missing_manifest_pointer_fails_the_pointer_chain() {
    let fetcher = StubFetcher::default().with(CARD_URI, json!({ "name": "No Pointer" }));
    let resolver = PointerChainResolver::new(happy_reader(), fetcher, ResolverConfig::default());
    let result = resolver.resolve(REGISTRY, &AgentId::new("7")).await;
    let Err(ResolveError::PointerChainFailed {
        reason,
    }) = result
    else {
        panic!("expected a pointer-chain failure, got {result:?}");
    };
    assert!(reason.contains("uiManifestUri"));
}

#[tokio::test(flavor = "current_thread")]
async fn non_string_manifest_pointer_fails_the_pointer_chain() {
    let fetcher = StubFetcher::default().with(CARD_URI, json!({ "uiManifestUri": 7 }));
    let resolver = PointerChainResolver::new(happy_reader(), fetcher, ResolverConfig::default());
    let result = resolver.resolve(REGISTRY, &AgentId::new("7")).await;
    assert_eq!(result.err().map(|err| err.code()), Some("pointer_chain_failed"));
}

#[tokio::test(flavor = "current_thread")]
async fn configurable_pointer_field_is_honored() {
    let fetcher = StubFetcher::default()
        .with(CARD_URI, json!({ "manifestUrl": MANIFEST_URI }))
        .with(MANIFEST_URI, valid_manifest());
    let config = ResolverConfig {
        manifest_pointer_field: "manifestUrl".to_string(),
    };
    let resolver = PointerChainResolver::new(happy_reader(), fetcher, config);
    assert!(resolver.resolve(REGISTRY, &AgentId::new("7")).await.is_ok());
}

#[tokio::test(flavor = "current_thread")]
async fn invalid_manifests_carry_the_issue_list() {
    let mut broken = valid_manifest();
    broken["manifestVersion"] = json!("1");
    broken.as_object_mut().unwrap().remove("widgets");
    let fetcher =
        StubFetcher::default().with(CARD_URI, agent_card()).with(MANIFEST_URI, broken);
    let resolver = PointerChainResolver::new(happy_reader(), fetcher, ResolverConfig::default());
    let result = resolver.resolve(REGISTRY, &AgentId::new("7")).await;
    let Err(ResolveError::ManifestInvalid {
        issues,
    }) = result
    else {
        panic!("expected manifest validation to fail, got {result:?}");
    };
    assert!(issues.len() >= 2);
}

// ============================================================================
// SECTION: Cache and Metrics Tests
// ============================================================================

#[tokio::test(flavor = "current_thread")]
async fn cached_manifests_skip_the_third_hop() {
    let fetcher = Arc::new(happy_fetcher());
    let resolver = PointerChainResolver::new(
        happy_reader(),
        Arc::clone(&fetcher),
        ResolverConfig::default(),
    )
    .with_cache(InMemoryManifestCache::new());

    resolver.resolve(REGISTRY, &AgentId::new("7")).await.unwrap();
    resolver.resolve(REGISTRY, &AgentId::new("7")).await.unwrap();
    // First run fetches card and manifest; second run only the card.
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(flavor = "current_thread")]
async fn hop_outcomes_are_recorded_in_order() {
    let metrics = RecordingMetrics::default();
    let fetcher = StubFetcher::default().with(CARD_URI, agent_card());
    let resolver = PointerChainResolver::new(happy_reader(), fetcher, ResolverConfig::default())
        .with_metrics(metrics.clone());

    let _ = resolver.resolve(REGISTRY, &AgentId::new("7")).await;
    let observed = metrics.observed.lock().unwrap().clone();
    assert_eq!(
        observed,
        vec![
            (Hop::ChainRead, HopOutcome::Success),
            (Hop::CardFetch, HopOutcome::Success),
            (Hop::ManifestFetch, HopOutcome::Failure),
        ]
    );
}
