// crates/surface-gate-core/tests/sandbox_scan.rs
// ============================================================================
// Module: Sandbox Scan Tests
// Description: Content-security scan tests over untrusted component trees.
// Purpose: Ensure disallowed capabilities are found at any nesting depth.
// Dependencies: surface-gate-core, serde_json
// ============================================================================

//! Sandbox scan behavior for disallowed capabilities and remote URLs.

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
use surface_gate_core::MAX_SCAN_DEPTH;
use surface_gate_core::PolicyConfig;
use surface_gate_core::SurfaceId;
use surface_gate_core::ValidationReport;
use surface_gate_core::runtime::sandbox::scan_component;

// ============================================================================
// SECTION: Helper Functions
// ============================================================================

fn scan(component: &Value, policy: &PolicyConfig) -> ValidationReport {
    let mut report = ValidationReport::new();
    scan_component("component", component, policy, &mut report);
    report
}

fn restrictive() -> PolicyConfig {
    PolicyConfig::default()
}

fn nested(mut inner: Value, levels: usize) -> Value {
    for _ in 0..levels {
        inner = json!({ "children": [inner] });
    }
    inner
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn open_url_is_found_at_depth() {
    let component = nested(json!({ "action": { "openUrl": { "url": "inline" } } }), 8);
    let report = scan(&component, &restrictive());
    assert!(report.issues.iter().any(|issue| issue.code == IssueCode::ExternalLinkDisallowed));
}

#[test]
fn wallet_intent_is_found_in_both_casings() {
    for key in ["walletIntent", "WalletIntent"] {
        let component = json!({ "Button": { "action": { key: { "chain": "mainnet" } } } });
        let report = scan(&component, &restrictive());
        assert!(
            report.issues.iter().any(|issue| issue.code == IssueCode::WalletIntentDisallowed),
            "expected a wallet violation for key {key}"
        );
    }
}

#[test]
fn remote_image_url_violates_network_and_link_policy_independently() {
    let component = json!({ "Image": { "source": { "uri": "https://cdn.example.com/a.png" } } });
    let report = scan(&component, &restrictive());
    let codes: Vec<IssueCode> = report.issues.iter().map(|issue| issue.code).collect();
    assert!(codes.contains(&IssueCode::NetworkDisallowed));
    assert!(codes.contains(&IssueCode::ExternalLinkDisallowed));
}

#[test]
fn ipfs_urls_count_as_remote() {
    let component = json!({ "Video": { "src": "ipfs://bafyexample/clip.mp4" } });
    let report = scan(&component, &restrictive());
    assert!(report.issues.iter().any(|issue| issue.code == IssueCode::NetworkDisallowed));
}

#[test]
fn local_references_are_not_remote() {
    let component = json!({
        "Image": { "src": "assets/logo.png" },
        "Link": { "href": "#section" }
    });
    let report = scan(&component, &restrictive());
    assert!(report.is_ok());
}

#[test]
fn permissive_policy_suppresses_the_corresponding_checks() {
    let policy = PolicyConfig {
        allowed_surfaces: vec![SurfaceId::new("preview")],
        allow_network: true,
        allow_external_links: true,
        allow_wallet_intents: true,
    };
    let component = json!({
        "action": { "openUrl": { "url": "https://example.com" } },
        "pay": { "walletIntent": { "chain": "mainnet" } },
        "Image": { "src": "https://cdn.example.com/a.png" }
    });
    let report = scan(&component, &policy);
    assert!(report.is_ok());
}

#[test]
fn traversal_covers_arrays_and_objects() {
    let component = json!({
        "Column": {
            "children": [
                { "Row": { "children": [ { "Button": { "action": { "OpenUrl": {} } } } ] } }
            ]
        }
    });
    let report = scan(&component, &restrictive());
    let issue = report
        .issues
        .iter()
        .find(|issue| issue.code == IssueCode::ExternalLinkDisallowed)
        .unwrap();
    assert!(issue.path.contains("OpenUrl"));
}

#[test]
fn pathological_nesting_trips_the_depth_guard() {
    let component = nested(json!({ "leaf": true }), MAX_SCAN_DEPTH + 8);
    let report = scan(&component, &restrictive());
    let depth_issues: Vec<_> = report
        .issues
        .iter()
        .filter(|issue| issue.code == IssueCode::ScanDepthExceeded)
        .collect();
    assert_eq!(depth_issues.len(), 1);
}

#[test]
fn nesting_within_the_guard_is_fully_scanned() {
    let component = nested(json!({ "action": { "openUrl": {} } }), MAX_SCAN_DEPTH / 4);
    let report = scan(&component, &restrictive());
    assert!(report.issues.iter().any(|issue| issue.code == IssueCode::ExternalLinkDisallowed));
    assert!(!report.issues.iter().any(|issue| issue.code == IssueCode::ScanDepthExceeded));
}
