// crates/surface-gate-core/src/core/mod.rs
// ============================================================================
// Module: Surface Gate Core Model
// Description: Data model and structural validation for agent-authored UI.
// Purpose: Define the pure types and checks shared by the runtime components.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The core model holds identifiers, the manifest and message wire types, the
//! per-invocation policy, and the structural validator. Everything here is
//! pure data or pure functions; mutable runtime state lives in
//! [`crate::runtime`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod identifiers;
pub mod issue;
pub mod manifest;
pub mod message;
pub mod policy;
pub mod validate;
