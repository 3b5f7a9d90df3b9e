// crates/surface-gate-resolver/src/telemetry.rs
// ============================================================================
// Module: Resolver Telemetry Seam
// Description: Dependency-light hop outcome recording for resolutions.
// Purpose: Let hosts count hop successes/failures without a metrics stack.
// Dependencies: none
// ============================================================================

//! ## Overview
//! The telemetry seam records one outcome per pointer-chain hop. It carries
//! no metrics dependency of its own; hosts adapt it to whatever counter
//! backend they run, and the default recorder drops everything.

// ============================================================================
// SECTION: Hop Taxonomy
// ============================================================================

/// One hop of the pointer chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hop {
    /// On-chain registry read.
    ChainRead,
    /// Off-chain agent-card fetch.
    CardFetch,
    /// Off-chain manifest fetch and validation.
    ManifestFetch,
}

impl Hop {
    /// Returns the stable snake_case hop name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ChainRead => "chain_read",
            Self::CardFetch => "card_fetch",
            Self::ManifestFetch => "manifest_fetch",
        }
    }
}

/// Outcome of one hop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HopOutcome {
    /// The hop completed.
    Success,
    /// The hop failed and the resolution stopped.
    Failure,
}

impl HopOutcome {
    /// Returns the stable snake_case outcome name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }
}

// ============================================================================
// SECTION: Metrics Trait
// ============================================================================

/// Recorder for pointer-chain hop outcomes.
pub trait ResolverMetrics: Send + Sync {
    /// Records one hop outcome.
    fn record_hop(&self, hop: Hop, outcome: HopOutcome);
}

/// Recorder that drops every observation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopResolverMetrics;

impl ResolverMetrics for NoopResolverMetrics {
    fn record_hop(&self, _hop: Hop, _outcome: HopOutcome) {}
}
