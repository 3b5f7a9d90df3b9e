// crates/surface-gate-core/src/runtime/sandbox.rs
// ============================================================================
// Module: Surface Gate Sandbox Scan
// Description: Content-security scan over untrusted component trees.
// Purpose: Find disallowed capabilities at any nesting depth without recursion.
// Dependencies: crate::core::{issue, message, policy}, serde_json
// ============================================================================

//! ## Overview
//! The sandbox scan walks every value reachable from a surface update's
//! component entries and records a policy violation for every disallowed
//! capability it finds: open-URL actions, wallet-signing intents, and
//! remote-scheme URL fields. The walk is iterative with an explicit work
//! stack and a nesting-depth guard, so pathological deeply-nested input is
//! reported as a violation instead of exhausting the call stack.
//!
//! The remote-URL checks are independent: one remote image URL can violate
//! both the network policy and the external-link policy simultaneously.
//!
//! Security posture: component trees are authored by untrusted remote agents
//! and have no declared schema; the *shape* of nested keys is the
//! security-relevant surface.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;

use crate::core::issue::IssueCode;
use crate::core::issue::ValidationReport;
use crate::core::message::Message;
use crate::core::policy::PolicyConfig;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum nesting depth the scan will traverse before failing closed.
pub const MAX_SCAN_DEPTH: usize = 64;

/// Keys denoting an open-URL capability.
const OPEN_URL_KEYS: [&str; 2] = ["openUrl", "OpenUrl"];

/// Keys denoting a wallet-intent capability.
const WALLET_INTENT_KEYS: [&str; 2] = ["walletIntent", "WalletIntent"];

/// Keys whose string values are treated as URL-shaped fields.
const URL_FIELD_KEYS: [&str; 4] = ["url", "uri", "href", "src"];

// ============================================================================
// SECTION: Scan Entry Points
// ============================================================================

/// Scans every surface update in a tagged message list under the policy.
///
/// Non-update messages carry no component payload and are skipped.
pub fn scan_messages(messages: &[Message], policy: &PolicyConfig, report: &mut ValidationReport) {
    for (index, message) in messages.iter().enumerate() {
        let Message::SurfaceUpdate(update) = message else {
            continue;
        };
        for (entry_index, entry) in update.components.iter().enumerate() {
            let path = format!(
                "messages[{index}].surfaceUpdate.components[{entry_index}].component"
            );
            scan_component(&path, &entry.component, policy, report);
        }
    }
}

/// Scans one component tree for disallowed capabilities.
///
/// Traverses arrays and nested objects iteratively; exceeding
/// [`MAX_SCAN_DEPTH`] records a single `scan_depth_exceeded` violation and
/// stops descending into the offending subtree.
pub fn scan_component(
    path: &str,
    component: &Value,
    policy: &PolicyConfig,
    report: &mut ValidationReport,
) {
    let mut stack: Vec<(String, &Value, usize)> = vec![(path.to_string(), component, 0)];
    let mut depth_exceeded = false;

    while let Some((node_path, node, depth)) = stack.pop() {
        if depth > MAX_SCAN_DEPTH {
            if !depth_exceeded {
                depth_exceeded = true;
                report.push(
                    IssueCode::ScanDepthExceeded,
                    node_path,
                    format!("component nesting exceeds depth guard of {MAX_SCAN_DEPTH}"),
                );
            }
            continue;
        }
        match node {
            Value::Object(map) => {
                for (key, value) in map {
                    let child_path = format!("{node_path}.{key}");
                    check_key(key, value, &child_path, policy, report);
                    stack.push((child_path, value, depth.saturating_add(1)));
                }
            }
            Value::Array(items) => {
                for (index, item) in items.iter().enumerate() {
                    let child_path = format!("{node_path}[{index}]");
                    stack.push((child_path, item, depth.saturating_add(1)));
                }
            }
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {}
        }
    }
}

// ============================================================================
// SECTION: Key Checks
// ============================================================================

/// Applies the capability checks for one key/value pair.
fn check_key(
    key: &str,
    value: &Value,
    path: &str,
    policy: &PolicyConfig,
    report: &mut ValidationReport,
) {
    if OPEN_URL_KEYS.contains(&key) && !policy.allow_external_links {
        report.push(
            IssueCode::ExternalLinkDisallowed,
            path,
            "open-URL capability is disallowed by policy",
        );
    }
    if WALLET_INTENT_KEYS.contains(&key) && !policy.allow_wallet_intents {
        report.push(
            IssueCode::WalletIntentDisallowed,
            path,
            "wallet-intent capability is disallowed by policy",
        );
    }
    if URL_FIELD_KEYS.contains(&key)
        && let Value::String(url) = value
        && is_remote_url(url)
    {
        if !policy.allow_network {
            report.push(
                IssueCode::NetworkDisallowed,
                path,
                format!("remote URL is disallowed by policy: {url}"),
            );
        }
        if !policy.allow_external_links {
            report.push(
                IssueCode::ExternalLinkDisallowed,
                path,
                format!("external link is disallowed by policy: {url}"),
            );
        }
    }
}

/// Returns true when a string value names a remote scheme.
///
/// Matches `http:`, `https:`, and `ipfs:` prefixes; everything else
/// (relative references, data URIs, inline identifiers) is local.
#[must_use]
pub fn is_remote_url(value: &str) -> bool {
    value.starts_with("http:") || value.starts_with("https:") || value.starts_with("ipfs:")
}
