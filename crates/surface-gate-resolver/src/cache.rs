// crates/surface-gate-resolver/src/cache.rs
// ============================================================================
// Module: Manifest Cache Seam
// Description: Pluggable cache for resolved UI manifests.
// Purpose: Let hosts skip the manifest-fetch hop for recently seen URIs.
// Dependencies: surface-gate-core
// ============================================================================

//! ## Overview
//! The cache seam is keyed by manifest URI and stores only manifests that
//! already passed validation, so a cache hit is as trustworthy as a fresh
//! fetch. The default implementation caches nothing; hosts that want caching
//! plug in their own policy or use the bundled in-memory map.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use surface_gate_core::UiManifest;

// ============================================================================
// SECTION: Cache Trait
// ============================================================================

/// Cache for validated UI manifests, keyed by manifest URI.
pub trait ManifestCache: Send + Sync {
    /// Returns the cached manifest for a URI, if any.
    fn get(&self, uri: &str) -> Option<UiManifest>;

    /// Stores a validated manifest under its URI.
    fn put(&self, uri: &str, manifest: &UiManifest);
}

// ============================================================================
// SECTION: Implementations
// ============================================================================

/// Cache that never stores anything; every resolution fetches fresh.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopManifestCache;

impl ManifestCache for NoopManifestCache {
    fn get(&self, _uri: &str) -> Option<UiManifest> {
        None
    }

    fn put(&self, _uri: &str, _manifest: &UiManifest) {}
}

/// Unbounded in-memory manifest cache.
///
/// # Invariants
/// - Entries are never evicted; intended for tests and short-lived hosts.
#[derive(Debug, Default)]
pub struct InMemoryManifestCache {
    /// Cached manifests keyed by URI.
    entries: Mutex<HashMap<String, UiManifest>>,
}

impl InMemoryManifestCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ManifestCache for InMemoryManifestCache {
    fn get(&self, uri: &str) -> Option<UiManifest> {
        lock_unpoisoned(&self.entries).get(uri).cloned()
    }

    fn put(&self, uri: &str, manifest: &UiManifest) {
        lock_unpoisoned(&self.entries).insert(uri.to_string(), manifest.clone());
    }
}

// ============================================================================
// SECTION: Lock Helpers
// ============================================================================

/// Locks a mutex, recovering the guard from a poisoned lock.
fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
