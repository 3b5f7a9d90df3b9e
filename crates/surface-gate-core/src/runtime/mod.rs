// crates/surface-gate-core/src/runtime/mod.rs
// ============================================================================
// Module: Surface Gate Runtime
// Description: Sandbox renderer, live session engine, and admission gate.
// Purpose: Enforce the trust policy over validated agent-authored UI content.
// Dependencies: crate::core, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The runtime components consume the core model: the sandbox scan and
//! preview renderer are pure functions, while the session engine and
//! admission gate own mutable per-session state behind per-key locks. Hosts
//! supply timestamps at every mutating call boundary; the gate's system-clock
//! wrapper is the single exception.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod gate;
pub mod render;
pub mod sandbox;
pub mod session;
