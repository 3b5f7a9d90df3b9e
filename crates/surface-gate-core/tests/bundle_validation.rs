// crates/surface-gate-core/tests/bundle_validation.rs
// ============================================================================
// Module: Bundle Validation Tests
// Description: Structural validation tests for preview bundle messages.
// Purpose: Ensure surface membership and message shapes are checked as data.
// Dependencies: surface-gate-core, serde_json
// ============================================================================

//! Structural validation behavior for untrusted preview bundles.

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

use serde_json::json;
use surface_gate_core::IssueCode;
use surface_gate_core::Message;
use surface_gate_core::SurfaceId;
use surface_gate_core::validate_preview_bundle;

// ============================================================================
// SECTION: Helper Functions
// ============================================================================

fn preview_only() -> Vec<SurfaceId> {
    vec![SurfaceId::new("preview")]
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn disallowed_surface_is_reported_at_the_surface_id_path() {
    let bundle = json!({
        "messages": [
            { "surfaceUpdate": { "surfaceId": "main", "components": [] } }
        ]
    });
    let report = validate_preview_bundle(&bundle, &preview_only());
    assert!(!report.is_ok());
    let issue = report.issues.iter().find(|issue| issue.path.contains("surfaceId")).unwrap();
    assert_eq!(issue.code, IssueCode::SurfaceNotAllowed);
    assert_eq!(issue.path, "messages[0].surfaceUpdate.surfaceId");
}

#[test]
fn begin_rendering_surface_is_also_checked() {
    let bundle = json!({
        "messages": [
            { "beginRendering": { "surfaceId": "main", "root": "root" } }
        ]
    });
    let report = validate_preview_bundle(&bundle, &preview_only());
    let issue = report.issues.iter().find(|issue| issue.path.contains("surfaceId")).unwrap();
    assert_eq!(issue.code, IssueCode::SurfaceNotAllowed);
}

#[test]
fn empty_messages_are_invalid() {
    let report = validate_preview_bundle(&json!({ "messages": [] }), &preview_only());
    let issue = report.issues.iter().find(|issue| issue.path == "messages").unwrap();
    assert_eq!(issue.code, IssueCode::InvalidValue);
}

#[test]
fn missing_messages_are_required() {
    let report = validate_preview_bundle(&json!({}), &preview_only());
    let issue = report.issues.iter().find(|issue| issue.path == "messages").unwrap();
    assert_eq!(issue.code, IssueCode::MissingRequired);
}

#[test]
fn shape_unknown_messages_are_inert_at_this_layer() {
    let bundle = json!({
        "messages": [
            { "narration": { "text": "thinking..." } },
            { "surfaceUpdate": { "surfaceId": "preview", "components": [] } }
        ]
    });
    let report = validate_preview_bundle(&bundle, &preview_only());
    assert!(report.is_ok());
}

#[test]
fn malformed_surface_update_fields_are_typed_defects() {
    let bundle = json!({
        "messages": [
            { "surfaceUpdate": { "surfaceId": 7, "components": {} } }
        ]
    });
    let report = validate_preview_bundle(&bundle, &preview_only());
    let codes_by_path: Vec<(&str, IssueCode)> =
        report.issues.iter().map(|issue| (issue.path.as_str(), issue.code)).collect();
    assert!(
        codes_by_path.contains(&("messages[0].surfaceUpdate.surfaceId", IssueCode::InvalidType))
    );
    assert!(
        codes_by_path.contains(&("messages[0].surfaceUpdate.components", IssueCode::InvalidType))
    );
}

#[test]
fn component_entries_require_string_ids() {
    let bundle = json!({
        "messages": [
            {
                "surfaceUpdate": {
                    "surfaceId": "preview",
                    "components": [ { "component": { "Text": {} } }, { "id": 9 } ]
                }
            }
        ]
    });
    let report = validate_preview_bundle(&bundle, &preview_only());
    let codes_by_path: Vec<(&str, IssueCode)> =
        report.issues.iter().map(|issue| (issue.path.as_str(), issue.code)).collect();
    assert!(codes_by_path.contains(&(
        "messages[0].surfaceUpdate.components[0].id",
        IssueCode::MissingRequired
    )));
    assert!(codes_by_path.contains(&(
        "messages[0].surfaceUpdate.components[1].id",
        IssueCode::InvalidType
    )));
}

#[test]
fn tagged_messages_are_produced_once_at_the_boundary() {
    let update = Message::from_value(&json!({
        "surfaceUpdate": {
            "surfaceId": "preview",
            "components": [ { "id": "root", "component": { "Text": { "literalString": "hi" } } } ]
        }
    }));
    let Message::SurfaceUpdate(update) = update else {
        panic!("expected a surface update");
    };
    assert_eq!(update.surface_id.as_str(), "preview");
    assert_eq!(update.components.len(), 1);

    let unknown = Message::from_value(&json!({ "surfaceUpdate": { "surfaceId": 1 } }));
    assert!(matches!(unknown, Message::Unknown(_)));

    let begin = Message::from_value(&json!({
        "beginRendering": { "surfaceId": "preview", "root": "root" }
    }));
    assert!(matches!(begin, Message::BeginRendering(_)));
}
