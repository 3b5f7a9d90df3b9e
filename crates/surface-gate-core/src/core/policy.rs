// crates/surface-gate-core/src/core/policy.rs
// ============================================================================
// Module: Surface Gate Policy
// Description: Per-invocation security policy for agent-authored UI content.
// Purpose: Default to the most restrictive preview policy and normalize caller input.
// Dependencies: crate::core::identifiers, serde
// ============================================================================

//! ## Overview
//! A [`PolicyConfig`] is supplied by the caller per invocation and never
//! mutated. Unset fields fall back to the most restrictive preview policy:
//! only the `"preview"` surface, with network access, external links, and
//! wallet intents all disallowed. Policy normalization is the first step of
//! every preview render so a partially specified policy can never widen
//! access by accident.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::SurfaceId;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default preview surface name used when a policy lists no surfaces.
pub const DEFAULT_PREVIEW_SURFACE: &str = "preview";

// ============================================================================
// SECTION: Policy Configuration
// ============================================================================

/// Security policy governing one preview render or bundle validation.
///
/// # Invariants
/// - Never mutated after construction; normalization returns a new value.
/// - `Default` is the most restrictive preview policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PolicyConfig {
    /// Surfaces that messages may target.
    pub allowed_surfaces: Vec<SurfaceId>,
    /// Whether remote URL references are allowed.
    pub allow_network: bool,
    /// Whether open-URL capabilities are allowed.
    pub allow_external_links: bool,
    /// Whether wallet-intent capabilities are allowed.
    pub allow_wallet_intents: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            allowed_surfaces: vec![SurfaceId::new(DEFAULT_PREVIEW_SURFACE)],
            allow_network: false,
            allow_external_links: false,
            allow_wallet_intents: false,
        }
    }
}

impl PolicyConfig {
    /// Returns a normalized copy with unset fields forced to restrictive defaults.
    ///
    /// An empty surface list is replaced by the default preview surface so the
    /// renderer always has a chosen surface to fold.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let mut policy = self.clone();
        if policy.allowed_surfaces.is_empty() {
            policy.allowed_surfaces = vec![SurfaceId::new(DEFAULT_PREVIEW_SURFACE)];
        }
        policy
    }

    /// Returns the surface the preview renderer folds updates into.
    ///
    /// Callers must normalize first; on an empty list this falls back to the
    /// default preview surface rather than panicking.
    #[must_use]
    pub fn chosen_surface(&self) -> SurfaceId {
        self.allowed_surfaces
            .first()
            .cloned()
            .unwrap_or_else(|| SurfaceId::new(DEFAULT_PREVIEW_SURFACE))
    }

    /// Returns true when the given surface is allowed by this policy.
    #[must_use]
    pub fn allows_surface(&self, surface_id: &str) -> bool {
        self.allowed_surfaces.iter().any(|allowed| allowed.as_str() == surface_id)
    }
}
