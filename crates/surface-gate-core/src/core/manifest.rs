// crates/surface-gate-core/src/core/manifest.rs
// ============================================================================
// Module: Surface Gate UI Manifest
// Description: Typed model of the agent-published UI manifest.
// Purpose: Carry widget contracts and protocol metadata after structural validation.
// Dependencies: crate::core::{identifiers, issue, policy, validate}, serde, serde_json
// ============================================================================

//! ## Overview
//! The UI manifest is the document an agent publishes describing its
//! renderable widgets and their contracts. Instances are immutable once
//! loaded and are only constructed from values that already passed
//! [`crate::core::validate::validate_ui_manifest`]. Widget fields beyond the
//! contract sets are opaque payload the trust core never interprets.
//!
//! Security posture: manifests are authored by untrusted remote agents; see
//! the validator for the structural contract enforced at load time.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::core::identifiers::SurfaceId;
use crate::core::identifiers::WidgetId;
use crate::core::issue::IssueCode;
use crate::core::issue::ValidationReport;
use crate::core::policy::PolicyConfig;
use crate::core::validate::validate_ui_manifest;

// ============================================================================
// SECTION: Protocol Constants
// ============================================================================

/// Fixed manifest type URI; the `type` field must equal this exactly.
pub const MANIFEST_TYPE_URI: &str = "https://a2ui.org/schemas/ui-manifest";

/// Fixed manifest version; the `manifestVersion` field must equal this exactly.
pub const MANIFEST_VERSION: &str = "2";

/// Known inline preview mode accepted by the manifest-driven preview path.
pub const PREVIEW_MODE_BUNDLE: &str = "a2uiBundle";

// ============================================================================
// SECTION: Manifest Model
// ============================================================================

/// Protocol metadata block of a UI manifest.
///
/// # Invariants
/// - `supported_catalog_ids` is non-empty after validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct A2uiBlock {
    /// Protocol version string.
    pub version: String,
    /// Extension URI identifying the protocol extension.
    pub extension_uri: String,
    /// MIME type of data parts carried by update messages.
    pub data_part_mime: String,
    /// Catalog identifiers the agent supports.
    pub supported_catalog_ids: Vec<String>,
    /// Whether inline catalogs are accepted.
    pub accepts_inline_catalogs: bool,
}

/// Surface contract declared by a widget.
///
/// # Invariants
/// - Only surfaces listed here may be targeted by the widget's live updates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceContract {
    /// Surfaces the widget is allowed to update.
    pub surface_ids: Vec<SurfaceId>,
}

/// Inline preview payload declared by a widget.
///
/// # Invariants
/// - `bundle` is an opaque value until it is validated as a preview bundle at
///   render time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetPreview {
    /// Preview mode; only [`PREVIEW_MODE_BUNDLE`] is understood.
    pub mode: String,
    /// Inline preview bundle value.
    pub bundle: Value,
    /// Optional preview policy declared by the widget.
    #[serde(default)]
    pub policy: Option<PolicyConfig>,
}

/// One widget described by a UI manifest.
///
/// # Invariants
/// - Only `surface_contract` and `events` are interpreted by the trust core;
///   everything else is opaque payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    /// Widget identifier.
    pub id: WidgetId,
    /// Surfaces the widget may update.
    #[serde(default)]
    pub surface_contract: SurfaceContract,
    /// Event type names the widget may receive.
    #[serde(default)]
    pub events: Vec<String>,
    /// Optional inline preview payload.
    #[serde(default)]
    pub preview: Option<WidgetPreview>,
    /// Opaque widget payload not interpreted by the trust core.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// UI manifest published by an agent.
///
/// # Invariants
/// - Immutable once loaded.
/// - `manifest_type` equals [`MANIFEST_TYPE_URI`] and `manifest_version`
///   equals [`MANIFEST_VERSION`] for every constructed instance.
/// - `widgets` is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiManifest {
    /// Manifest type URI.
    #[serde(rename = "type")]
    pub manifest_type: String,
    /// Manifest version string.
    pub manifest_version: String,
    /// Registry address the agent identity lives in.
    pub agent_registry: String,
    /// Agent identifier within the registry.
    pub agent_id: String,
    /// Last-updated timestamp string (opaque to the core).
    pub updated_at: String,
    /// Protocol metadata block.
    pub a2ui: A2uiBlock,
    /// Widgets described by this manifest.
    pub widgets: Vec<Widget>,
}

impl UiManifest {
    /// Builds a typed manifest from an untrusted value.
    ///
    /// Runs the structural validator first so every defect is reported at
    /// once; only a structurally valid value is deserialized.
    ///
    /// # Errors
    ///
    /// Returns the full [`ValidationReport`] when the value fails structural
    /// validation or cannot be deserialized into the typed model.
    pub fn from_value(value: &Value) -> Result<Self, ValidationReport> {
        let report = validate_ui_manifest(value);
        if !report.is_ok() {
            return Err(report);
        }
        serde_json::from_value(value.clone()).map_err(|err| {
            let mut report = ValidationReport::new();
            report.push(IssueCode::InvalidInput, "", format!("manifest deserialization failed: {err}"));
            report
        })
    }

    /// Returns the widget with the given id, or the first widget when no id
    /// is requested.
    #[must_use]
    pub fn pick_widget(&self, widget_id: Option<&WidgetId>) -> Option<&Widget> {
        match widget_id {
            Some(id) => self.widgets.iter().find(|widget| widget.id == *id),
            None => self.widgets.first(),
        }
    }
}
