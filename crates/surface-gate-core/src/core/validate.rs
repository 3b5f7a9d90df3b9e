// crates/surface-gate-core/src/core/validate.rs
// ============================================================================
// Module: Surface Gate Validator
// Description: Structural contract checks for UI manifests and preview bundles.
// Purpose: Surface every structural defect of untrusted wire input in one pass.
// Dependencies: crate::core::{identifiers, issue, manifest, message}, serde_json
// ============================================================================

//! ## Overview
//! Pure, synchronous, side-effect-free validation of the two wire formats an
//! untrusted agent supplies: the UI manifest and a preview/live bundle of
//! update messages. Validation is exhaustive, not fail-fast, so one call
//! reports every structural defect at once. Widget internals are *not*
//! deep-validated here; component payloads are judged at consumption time by
//! the sandbox renderer and the live session engine.
//!
//! Security posture: every input to this module is untrusted; malformed
//! payloads must produce issue reports, never faults.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;

use crate::core::identifiers::SurfaceId;
use crate::core::issue::Issue;
use crate::core::issue::IssueCode;
use crate::core::issue::ValidationReport;
use crate::core::manifest::MANIFEST_TYPE_URI;
use crate::core::manifest::MANIFEST_VERSION;
use crate::core::message::KEY_BEGIN_RENDERING;
use crate::core::message::KEY_SURFACE_UPDATE;

// ============================================================================
// SECTION: Safe Parse
// ============================================================================

/// Parses raw text into a JSON value with a typed failure.
///
/// The surrounding system always has untrusted raw bytes at its boundary;
/// this is the single entry point that turns them into structured data.
///
/// # Errors
///
/// Returns an [`Issue`] with code `invalid_json` when the text is not valid JSON.
pub fn parse_json(text: &str) -> Result<Value, Issue> {
    serde_json::from_str(text)
        .map_err(|err| Issue::new(IssueCode::InvalidJson, "", format!("invalid json: {err}")))
}

// ============================================================================
// SECTION: Manifest Validation
// ============================================================================

/// Validates the structural contract of a UI manifest value.
///
/// Checks presence and type of every required top-level field, exact equality
/// of `type` and `manifestVersion` against the protocol constants, the `a2ui`
/// sub-object fields, and that `widgets` is a non-empty array. Widget
/// internals are opaque at this layer.
#[must_use]
pub fn validate_ui_manifest(value: &Value) -> ValidationReport {
    let mut report = ValidationReport::new();
    let Some(map) = value.as_object() else {
        report.push(IssueCode::InvalidType, "", "manifest must be an object");
        return report;
    };

    if let Some(manifest_type) = require_string(map, "type", &mut report)
        && manifest_type != MANIFEST_TYPE_URI
    {
        report.push(
            IssueCode::InvalidValue,
            "type",
            format!("type must equal {MANIFEST_TYPE_URI}"),
        );
    }
    if let Some(version) = require_string(map, "manifestVersion", &mut report)
        && version != MANIFEST_VERSION
    {
        report.push(
            IssueCode::InvalidValue,
            "manifestVersion",
            format!("manifestVersion must equal {MANIFEST_VERSION}"),
        );
    }
    require_string(map, "agentRegistry", &mut report);
    require_string(map, "agentId", &mut report);
    require_string(map, "updatedAt", &mut report);

    validate_a2ui_block(map, &mut report);

    match map.get("widgets") {
        None => report.push(IssueCode::MissingRequired, "widgets", "widgets is required"),
        Some(Value::Array(widgets)) => {
            if widgets.is_empty() {
                report.push(IssueCode::InvalidValue, "widgets", "widgets must be non-empty");
            }
        }
        Some(_) => report.push(IssueCode::InvalidType, "widgets", "widgets must be an array"),
    }

    report
}

/// Validates the `a2ui` protocol metadata block.
fn validate_a2ui_block(map: &Map<String, Value>, report: &mut ValidationReport) {
    let block = match map.get("a2ui") {
        None => {
            report.push(IssueCode::MissingRequired, "a2ui", "a2ui is required");
            return;
        }
        Some(Value::Object(block)) => block,
        Some(_) => {
            report.push(IssueCode::InvalidType, "a2ui", "a2ui must be an object");
            return;
        }
    };

    require_string_at(block, "version", "a2ui.version", report);
    require_string_at(block, "extensionUri", "a2ui.extensionUri", report);
    require_string_at(block, "dataPartMime", "a2ui.dataPartMime", report);

    match block.get("supportedCatalogIds") {
        None => report.push(
            IssueCode::MissingRequired,
            "a2ui.supportedCatalogIds",
            "supportedCatalogIds is required",
        ),
        Some(Value::Array(ids)) => {
            if ids.is_empty() {
                report.push(
                    IssueCode::InvalidValue,
                    "a2ui.supportedCatalogIds",
                    "supportedCatalogIds must be non-empty",
                );
            }
            for (index, id) in ids.iter().enumerate() {
                if !id.is_string() {
                    report.push(
                        IssueCode::InvalidType,
                        format!("a2ui.supportedCatalogIds[{index}]"),
                        "catalog id must be a string",
                    );
                }
            }
        }
        Some(_) => report.push(
            IssueCode::InvalidType,
            "a2ui.supportedCatalogIds",
            "supportedCatalogIds must be an array",
        ),
    }

    match block.get("acceptsInlineCatalogs") {
        None => report.push(
            IssueCode::MissingRequired,
            "a2ui.acceptsInlineCatalogs",
            "acceptsInlineCatalogs is required",
        ),
        Some(Value::Bool(_)) => {}
        Some(_) => report.push(
            IssueCode::InvalidType,
            "a2ui.acceptsInlineCatalogs",
            "acceptsInlineCatalogs must be a boolean",
        ),
    }
}

// ============================================================================
// SECTION: Bundle Validation
// ============================================================================

/// Validates the structural contract of a preview/live bundle value.
///
/// Checks that `messages` is a non-empty array and that every message
/// carrying a `surfaceUpdate` or `beginRendering` body references a surface
/// in `allowed_surfaces` with a well-formed shape. Messages with neither
/// discriminating key are inert at this layer.
#[must_use]
pub fn validate_preview_bundle(value: &Value, allowed_surfaces: &[SurfaceId]) -> ValidationReport {
    let mut report = ValidationReport::new();
    let Some(map) = value.as_object() else {
        report.push(IssueCode::InvalidType, "", "bundle must be an object");
        return report;
    };
    let messages = match map.get("messages") {
        None => {
            report.push(IssueCode::MissingRequired, "messages", "messages is required");
            return report;
        }
        Some(Value::Array(messages)) => messages,
        Some(_) => {
            report.push(IssueCode::InvalidType, "messages", "messages must be an array");
            return report;
        }
    };
    if messages.is_empty() {
        report.push(IssueCode::InvalidValue, "messages", "messages must be non-empty");
    }

    for (index, message) in messages.iter().enumerate() {
        let Some(message_map) = message.as_object() else {
            report.push(
                IssueCode::InvalidType,
                format!("messages[{index}]"),
                "message must be an object",
            );
            continue;
        };
        if let Some(body) = message_map.get(KEY_SURFACE_UPDATE) {
            let path = format!("messages[{index}].{KEY_SURFACE_UPDATE}");
            validate_surface_update_body(body, &path, allowed_surfaces, &mut report);
        } else if let Some(body) = message_map.get(KEY_BEGIN_RENDERING) {
            let path = format!("messages[{index}].{KEY_BEGIN_RENDERING}");
            validate_begin_rendering_body(body, &path, allowed_surfaces, &mut report);
        }
        // Shape-unknown messages are inert at this layer.
    }

    report
}

/// Validates a `surfaceUpdate` message body.
fn validate_surface_update_body(
    body: &Value,
    path: &str,
    allowed_surfaces: &[SurfaceId],
    report: &mut ValidationReport,
) {
    let Some(map) = body.as_object() else {
        report.push(IssueCode::InvalidType, path, "surfaceUpdate must be an object");
        return;
    };
    check_surface_membership(map, path, allowed_surfaces, report);
    match map.get("components") {
        None => report.push(
            IssueCode::MissingRequired,
            format!("{path}.components"),
            "components is required",
        ),
        Some(Value::Array(components)) => {
            for (index, entry) in components.iter().enumerate() {
                let entry_path = format!("{path}.components[{index}]");
                let Some(entry_map) = entry.as_object() else {
                    report.push(IssueCode::InvalidType, entry_path, "component entry must be an object");
                    continue;
                };
                match entry_map.get("id") {
                    None => report.push(
                        IssueCode::MissingRequired,
                        format!("{entry_path}.id"),
                        "component id is required",
                    ),
                    Some(Value::String(_)) => {}
                    Some(_) => report.push(
                        IssueCode::InvalidType,
                        format!("{entry_path}.id"),
                        "component id must be a string",
                    ),
                }
            }
        }
        Some(_) => report.push(
            IssueCode::InvalidType,
            format!("{path}.components"),
            "components must be an array",
        ),
    }
}

/// Validates a `beginRendering` message body.
fn validate_begin_rendering_body(
    body: &Value,
    path: &str,
    allowed_surfaces: &[SurfaceId],
    report: &mut ValidationReport,
) {
    let Some(map) = body.as_object() else {
        report.push(IssueCode::InvalidType, path, "beginRendering must be an object");
        return;
    };
    check_surface_membership(map, path, allowed_surfaces, report);
    match map.get("root") {
        None => report.push(IssueCode::MissingRequired, format!("{path}.root"), "root is required"),
        Some(Value::String(_)) => {}
        Some(_) => {
            report.push(IssueCode::InvalidType, format!("{path}.root"), "root must be a string");
        }
    }
}

/// Checks that a message body's `surfaceId` is well-formed and allowed.
fn check_surface_membership(
    map: &Map<String, Value>,
    path: &str,
    allowed_surfaces: &[SurfaceId],
    report: &mut ValidationReport,
) {
    match map.get("surfaceId") {
        None => report.push(
            IssueCode::MissingRequired,
            format!("{path}.surfaceId"),
            "surfaceId is required",
        ),
        Some(Value::String(surface_id)) => {
            let allowed = allowed_surfaces.iter().any(|allowed| allowed.as_str() == surface_id);
            if !allowed {
                report.push(
                    IssueCode::SurfaceNotAllowed,
                    format!("{path}.surfaceId"),
                    format!("surface not allowed: {surface_id}"),
                );
            }
        }
        Some(_) => report.push(
            IssueCode::InvalidType,
            format!("{path}.surfaceId"),
            "surfaceId must be a string",
        ),
    }
}

// ============================================================================
// SECTION: Field Helpers
// ============================================================================

/// Requires a top-level string field, reporting absence or type defects.
fn require_string<'a>(
    map: &'a Map<String, Value>,
    field: &str,
    report: &mut ValidationReport,
) -> Option<&'a str> {
    require_string_at(map, field, field, report)
}

/// Requires a string field at an explicit report path.
fn require_string_at<'a>(
    map: &'a Map<String, Value>,
    field: &str,
    path: &str,
    report: &mut ValidationReport,
) -> Option<&'a str> {
    match map.get(field) {
        None => {
            report.push(IssueCode::MissingRequired, path, format!("{field} is required"));
            None
        }
        Some(Value::String(value)) => Some(value),
        Some(_) => {
            report.push(IssueCode::InvalidType, path, format!("{field} must be a string"));
            None
        }
    }
}
