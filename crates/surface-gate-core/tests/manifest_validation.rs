// crates/surface-gate-core/tests/manifest_validation.rs
// ============================================================================
// Module: Manifest Validation Tests
// Description: Structural validation tests for the UI manifest contract.
// Purpose: Ensure every manifest defect is surfaced as data in one pass.
// Dependencies: surface-gate-core, serde_json
// ============================================================================

//! Structural validation behavior for untrusted UI manifests.

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

use serde_json::Value;
use serde_json::json;
use surface_gate_core::IssueCode;
use surface_gate_core::MANIFEST_TYPE_URI;
use surface_gate_core::UiManifest;
use surface_gate_core::WidgetId;
use surface_gate_core::parse_json;
use surface_gate_core::validate_ui_manifest;

// ============================================================================
// SECTION: Helper Functions
// ============================================================================

fn sample_manifest() -> Value {
    json!({
        "type": MANIFEST_TYPE_URI,
        "manifestVersion": "2",
        "agentRegistry": "0x00000000000000000000000000000000000000aa",
        "agentId": "55",
        "updatedAt": "2026-08-01T00:00:00Z",
        "a2ui": {
            "version": "0.9",
            "extensionUri": "https://a2ui.org/extensions/render/v1",
            "dataPartMime": "application/vnd.a2ui+json",
            "supportedCatalogIds": ["standard"],
            "acceptsInlineCatalogs": false
        },
        "widgets": [
            {
                "id": "ticker",
                "surfaceContract": { "surfaceIds": ["preview", "main"] },
                "events": ["refresh"]
            }
        ]
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn valid_manifest_passes_with_no_issues() {
    let report = validate_ui_manifest(&sample_manifest());
    assert!(report.is_ok());
    assert!(report.issues.is_empty());
}

#[test]
fn missing_type_is_reported_at_the_type_path() {
    let mut manifest = sample_manifest();
    manifest.as_object_mut().unwrap().remove("type");
    let report = validate_ui_manifest(&manifest);
    assert!(!report.is_ok());
    let issue = report.issues.iter().find(|issue| issue.path == "type").unwrap();
    assert_eq!(issue.code, IssueCode::MissingRequired);
}

#[test]
fn wrong_type_uri_is_an_invalid_value() {
    let mut manifest = sample_manifest();
    manifest["type"] = json!("https://example.com/not-the-manifest-type");
    let report = validate_ui_manifest(&manifest);
    let issue = report.issues.iter().find(|issue| issue.path == "type").unwrap();
    assert_eq!(issue.code, IssueCode::InvalidValue);
}

#[test]
fn wrong_manifest_version_is_an_invalid_value() {
    let mut manifest = sample_manifest();
    manifest["manifestVersion"] = json!("1");
    let report = validate_ui_manifest(&manifest);
    let issue = report.issues.iter().find(|issue| issue.path == "manifestVersion").unwrap();
    assert_eq!(issue.code, IssueCode::InvalidValue);
}

#[test]
fn validation_is_exhaustive_not_fail_fast() {
    let mut manifest = sample_manifest();
    let map = manifest.as_object_mut().unwrap();
    map.remove("type");
    map.remove("agentRegistry");
    map["a2ui"]["supportedCatalogIds"] = json!([]);
    map["widgets"] = json!([]);
    let report = validate_ui_manifest(&Value::Object(map.clone()));
    let paths: Vec<&str> = report.issues.iter().map(|issue| issue.path.as_str()).collect();
    assert!(paths.contains(&"type"));
    assert!(paths.contains(&"agentRegistry"));
    assert!(paths.contains(&"a2ui.supportedCatalogIds"));
    assert!(paths.contains(&"widgets"));
}

#[test]
fn a2ui_field_defects_are_reported_with_nested_paths() {
    let mut manifest = sample_manifest();
    manifest["a2ui"]["acceptsInlineCatalogs"] = json!("yes");
    manifest["a2ui"]["supportedCatalogIds"] = json!(["standard", 7]);
    let report = validate_ui_manifest(&manifest);
    let codes_by_path: Vec<(&str, IssueCode)> =
        report.issues.iter().map(|issue| (issue.path.as_str(), issue.code)).collect();
    assert!(codes_by_path.contains(&("a2ui.acceptsInlineCatalogs", IssueCode::InvalidType)));
    assert!(codes_by_path.contains(&("a2ui.supportedCatalogIds[1]", IssueCode::InvalidType)));
}

#[test]
fn missing_a2ui_block_is_required() {
    let mut manifest = sample_manifest();
    manifest.as_object_mut().unwrap().remove("a2ui");
    let report = validate_ui_manifest(&manifest);
    let issue = report.issues.iter().find(|issue| issue.path == "a2ui").unwrap();
    assert_eq!(issue.code, IssueCode::MissingRequired);
}

#[test]
fn non_object_manifest_is_rejected_without_fault() {
    let report = validate_ui_manifest(&json!("not a manifest"));
    assert!(!report.is_ok());
    assert_eq!(report.issues[0].code, IssueCode::InvalidType);
}

#[test]
fn typed_manifest_loads_only_after_validation() {
    let manifest = UiManifest::from_value(&sample_manifest()).unwrap();
    assert_eq!(manifest.manifest_version, "2");
    assert_eq!(manifest.widgets.len(), 1);
    let widget = manifest.pick_widget(Some(&WidgetId::new("ticker"))).unwrap();
    assert_eq!(widget.events, vec!["refresh".to_string()]);
    assert!(manifest.pick_widget(Some(&WidgetId::new("missing"))).is_none());
    assert_eq!(manifest.pick_widget(None).unwrap().id, WidgetId::new("ticker"));
}

#[test]
fn typed_manifest_load_reports_structural_defects() {
    let mut value = sample_manifest();
    value.as_object_mut().unwrap().remove("widgets");
    let report = UiManifest::from_value(&value).unwrap_err();
    assert!(report.issues.iter().any(|issue| issue.path == "widgets"));
}

#[test]
fn parse_json_returns_typed_failures() {
    let issue = parse_json("{not json").unwrap_err();
    assert_eq!(issue.code, IssueCode::InvalidJson);
    let value = parse_json("{\"ok\":true}").unwrap();
    assert_eq!(value["ok"], json!(true));
}
