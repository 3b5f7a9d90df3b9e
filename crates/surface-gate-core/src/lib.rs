// crates/surface-gate-core/src/lib.rs
// ============================================================================
// Module: Surface Gate Core Library
// Description: Trust and sandbox core for agent-authored UI content.
// Purpose: Validate, sandbox, and session-confine untrusted remote agent UI.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Surface Gate Core takes UI content authored by an untrusted remote agent
//! (a manifest describing widgets, and a stream of structured update
//! messages) and turns it into something safe to render under an explicit
//! security policy. It ships the structural validator, the preview sandbox
//! renderer, the live session engine, and the live-update admission gate.
//! Invariants:
//! - No public operation propagates an unhandled fault; every boundary
//!   returns a discriminated success/failure result.
//! - The validator and renderer are pure; session and gate state is owned
//!   exclusively by their engines behind per-key locks.
//! - A policy-violating batch or message is never partially applied.
//!
//! Security posture: every input to this crate is untrusted agent content.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::identifiers::AgentId;
pub use crate::core::identifiers::ComponentId;
pub use crate::core::identifiers::SessionKey;
pub use crate::core::identifiers::SurfaceId;
pub use crate::core::identifiers::WidgetId;
pub use crate::core::issue::Issue;
pub use crate::core::issue::IssueCode;
pub use crate::core::issue::ValidationReport;
pub use crate::core::manifest::A2uiBlock;
pub use crate::core::manifest::MANIFEST_TYPE_URI;
pub use crate::core::manifest::MANIFEST_VERSION;
pub use crate::core::manifest::PREVIEW_MODE_BUNDLE;
pub use crate::core::manifest::SurfaceContract;
pub use crate::core::manifest::UiManifest;
pub use crate::core::manifest::Widget;
pub use crate::core::manifest::WidgetPreview;
pub use crate::core::message::BeginRendering;
pub use crate::core::message::ComponentEntry;
pub use crate::core::message::Message;
pub use crate::core::message::SurfaceUpdate;
pub use crate::core::policy::DEFAULT_PREVIEW_SURFACE;
pub use crate::core::policy::PolicyConfig;
pub use crate::core::validate::parse_json;
pub use crate::core::validate::validate_preview_bundle;
pub use crate::core::validate::validate_ui_manifest;
pub use crate::runtime::gate::AdmissionError;
pub use crate::runtime::gate::AdmissionGate;
pub use crate::runtime::gate::GateLimits;
pub use crate::runtime::render::RenderFallback;
pub use crate::runtime::render::RenderOutcome;
pub use crate::runtime::render::RenderPlan;
pub use crate::runtime::render::render_preview;
pub use crate::runtime::render::render_widget_preview;
pub use crate::runtime::sandbox::MAX_SCAN_DEPTH;
pub use crate::runtime::session::SessionEngine;
pub use crate::runtime::session::SessionError;
pub use crate::runtime::session::StartOptions;
pub use crate::runtime::session::SurfaceSnapshot;
pub use crate::runtime::session::WidgetContract;
