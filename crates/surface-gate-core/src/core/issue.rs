// crates/surface-gate-core/src/core/issue.rs
// ============================================================================
// Module: Surface Gate Issues
// Description: Structural and policy findings reported as data.
// Purpose: Surface every defect of an untrusted input in one pass, never as a fault.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Validation and sandbox findings are plain data, not exceptions. Each
//! [`Issue`] carries a stable code, the JSON path of the offending value, and
//! a human-readable message. Reports are exhaustive: one validation call
//! surfaces every structural defect at once instead of failing fast.
//!
//! Security posture: issue paths and messages echo untrusted field names and
//! must be treated as untrusted display data by transports.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Issue Codes
// ============================================================================

/// Stable issue codes for structural and policy findings.
///
/// # Invariants
/// - Variants serialize as snake_case strings and are stable for programmatic
///   handling by transports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    /// A required field is absent.
    MissingRequired,
    /// A field is present with the wrong JSON type.
    InvalidType,
    /// A field has the right type but a disallowed value.
    InvalidValue,
    /// Raw text could not be parsed as JSON.
    InvalidJson,
    /// The input as a whole has an unusable shape.
    InvalidInput,
    /// A message references a surface outside the allowed set.
    SurfaceNotAllowed,
    /// A component carries an open-URL capability while external links are disallowed.
    ExternalLinkDisallowed,
    /// A component carries a wallet-intent capability while wallet intents are disallowed.
    WalletIntentDisallowed,
    /// A component references a remote URL while network access is disallowed.
    NetworkDisallowed,
    /// The sandbox scan exceeded its nesting-depth guard.
    ScanDepthExceeded,
    /// No `beginRendering` message targeted the chosen surface.
    MissingRoot,
    /// The declared root id is not present in the folded component table.
    UnknownRoot,
    /// The selected widget does not expose a usable inline preview.
    PreviewUnavailable,
}

impl IssueCode {
    /// Returns the stable snake_case code string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingRequired => "missing_required",
            Self::InvalidType => "invalid_type",
            Self::InvalidValue => "invalid_value",
            Self::InvalidJson => "invalid_json",
            Self::InvalidInput => "invalid_input",
            Self::SurfaceNotAllowed => "surface_not_allowed",
            Self::ExternalLinkDisallowed => "external_link_disallowed",
            Self::WalletIntentDisallowed => "wallet_intent_disallowed",
            Self::NetworkDisallowed => "network_disallowed",
            Self::ScanDepthExceeded => "scan_depth_exceeded",
            Self::MissingRoot => "missing_root",
            Self::UnknownRoot => "unknown_root",
            Self::PreviewUnavailable => "preview_unavailable",
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Issues and Reports
// ============================================================================

/// One structural or policy finding against an untrusted input.
///
/// # Invariants
/// - `path` uses dotted/indexed JSON-path notation (for example
///   `messages[2].surfaceUpdate.surfaceId`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Stable issue code.
    pub code: IssueCode,
    /// JSON path of the offending value.
    pub path: String,
    /// Human-readable message.
    pub message: String,
}

impl Issue {
    /// Creates an issue with the provided code, path, and message.
    #[must_use]
    pub fn new(code: IssueCode, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Exhaustive validation report for one input.
///
/// # Invariants
/// - `issues` is empty exactly when the input passed every applicable check.
/// - Issue order follows check order and is deterministic for identical inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// All findings for the input, in check order.
    pub issues: Vec<Issue>,
}

impl ValidationReport {
    /// Creates an empty report.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            issues: Vec::new(),
        }
    }

    /// Returns true when no issues were recorded.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.issues.is_empty()
    }

    /// Records a finding.
    pub fn push(&mut self, code: IssueCode, path: impl Into<String>, message: impl Into<String>) {
        self.issues.push(Issue::new(code, path, message));
    }

    /// Merges another report's findings into this one, preserving order.
    pub fn extend(&mut self, other: Self) {
        self.issues.extend(other.issues);
    }
}
