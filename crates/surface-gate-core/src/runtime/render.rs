// crates/surface-gate-core/src/runtime/render.rs
// ============================================================================
// Module: Surface Gate Preview Renderer
// Description: Sandbox renderer producing render plans from preview bundles.
// Purpose: Turn validated, policy-clean bundles into flat component tables.
// Dependencies: crate::core, crate::runtime::sandbox, serde, serde_json
// ============================================================================

//! ## Overview
//! The preview renderer consumes an untrusted bundle value and a policy and
//! produces either a [`RenderPlan`] (a flattened id-to-component table plus a
//! root reference) or a [`RenderOutcome::Blocked`] carrying every issue found
//! and a guaranteed fallback, so a caller never has to special-case "no
//! usable output". Rendering is a pure function: identical inputs yield
//! identical plans or identical issue lists.
//!
//! Structural validation and the sandbox scan both run before any
//! short-circuit, so one call surfaces every problem; the plan is only built
//! when both passes are clean.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::identifiers::ComponentId;
use crate::core::identifiers::SurfaceId;
use crate::core::identifiers::WidgetId;
use crate::core::issue::Issue;
use crate::core::issue::IssueCode;
use crate::core::issue::ValidationReport;
use crate::core::manifest::PREVIEW_MODE_BUNDLE;
use crate::core::manifest::UiManifest;
use crate::core::message::Message;
use crate::core::policy::PolicyConfig;
use crate::core::validate::validate_preview_bundle;
use crate::runtime::sandbox::scan_messages;

// ============================================================================
// SECTION: Render Plan
// ============================================================================

/// Flattened, validated render output ready for a display layer.
///
/// # Invariants
/// - `root_id` is a key present in `components` (checked at build time).
/// - `components` is keyed deterministically for stable serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderPlan {
    /// Surface the plan renders into.
    pub surface_id: SurfaceId,
    /// Root component id.
    pub root_id: ComponentId,
    /// Flat id-to-component table.
    pub components: BTreeMap<ComponentId, Value>,
}

/// Safe fallback returned whenever a preview cannot be rendered.
///
/// # Invariants
/// - Always present on a blocked outcome; contains no agent-authored content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderFallback {
    /// Fallback kind discriminator.
    pub kind: String,
    /// Display text for the placeholder.
    pub text: String,
}

impl RenderFallback {
    /// Creates the placeholder fallback.
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            kind: "placeholder".to_string(),
            text: "Preview unavailable.".to_string(),
        }
    }
}

/// Outcome of a preview render.
///
/// # Invariants
/// - `Blocked` always carries at least one issue and a fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RenderOutcome {
    /// The bundle passed every check and produced a plan.
    Ready {
        /// The render plan.
        plan: RenderPlan,
    },
    /// The bundle was rejected; the fallback is safe to display.
    Blocked {
        /// Every issue found, in check order.
        issues: Vec<Issue>,
        /// Safe placeholder output.
        fallback: RenderFallback,
    },
}

impl RenderOutcome {
    /// Returns the plan when the render succeeded.
    #[must_use]
    pub const fn plan(&self) -> Option<&RenderPlan> {
        match self {
            Self::Ready {
                plan,
            } => Some(plan),
            Self::Blocked {
                ..
            } => None,
        }
    }

    /// Returns the issues when the render was blocked.
    #[must_use]
    pub fn issues(&self) -> &[Issue] {
        match self {
            Self::Ready {
                ..
            } => &[],
            Self::Blocked {
                issues, ..
            } => issues,
        }
    }

    /// Returns true when the render produced a plan.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }
}

// ============================================================================
// SECTION: Bundle Rendering
// ============================================================================

/// Renders an untrusted preview bundle under the given policy.
///
/// Steps, in order: policy normalization, structural validation, sandbox
/// scan, and (only when both passes are clean) plan building. Every
/// applicable check runs so the caller sees every problem in one call.
#[must_use]
pub fn render_preview(bundle: &Value, policy: &PolicyConfig) -> RenderOutcome {
    let policy = policy.normalized();
    let mut report = validate_preview_bundle(bundle, &policy.allowed_surfaces);

    let messages = collect_messages(bundle);
    scan_messages(&messages, &policy, &mut report);

    if !report.is_ok() {
        return blocked(report);
    }

    let chosen = policy.chosen_surface();
    let mut components: BTreeMap<ComponentId, Value> = BTreeMap::new();
    let mut root: Option<ComponentId> = None;
    for message in &messages {
        match message {
            Message::SurfaceUpdate(update) if update.surface_id == chosen => {
                for entry in &update.components {
                    components.insert(entry.id.clone(), entry.component.clone());
                }
            }
            Message::BeginRendering(begin) if begin.surface_id == chosen => {
                root = Some(begin.root.clone());
            }
            Message::SurfaceUpdate(_) | Message::BeginRendering(_) | Message::Unknown(_) => {}
        }
    }

    // A bundle can be shaped correctly yet reference a nonexistent root, so
    // these checks run even though structural validation already passed.
    let Some(root_id) = root else {
        report.push(
            IssueCode::MissingRoot,
            "messages",
            format!("no beginRendering message targets surface {chosen}"),
        );
        return blocked(report);
    };
    if !components.contains_key(&root_id) {
        report.push(
            IssueCode::UnknownRoot,
            "messages",
            format!("root id {root_id} is not present in the component table"),
        );
        return blocked(report);
    }

    RenderOutcome::Ready {
        plan: RenderPlan {
            surface_id: chosen,
            root_id,
            components,
        },
    }
}

/// Renders a widget's inline preview from a validated manifest.
///
/// Picks the widget by id (or the first widget), requires an inline preview
/// of the known bundle mode, and delegates to [`render_preview`] using the
/// widget's own declared preview policy (or the restrictive default).
#[must_use]
pub fn render_widget_preview(manifest: &UiManifest, widget_id: Option<&WidgetId>) -> RenderOutcome {
    let Some(widget) = manifest.pick_widget(widget_id) else {
        let mut report = ValidationReport::new();
        report.push(IssueCode::PreviewUnavailable, "widgets", "no matching widget");
        return blocked(report);
    };
    let Some(preview) = &widget.preview else {
        let mut report = ValidationReport::new();
        report.push(
            IssueCode::PreviewUnavailable,
            format!("widgets.{}.preview", widget.id),
            "widget declares no inline preview",
        );
        return blocked(report);
    };
    if preview.mode != PREVIEW_MODE_BUNDLE {
        let mut report = ValidationReport::new();
        report.push(
            IssueCode::PreviewUnavailable,
            format!("widgets.{}.preview.mode", widget.id),
            format!("unsupported preview mode: {}", preview.mode),
        );
        return blocked(report);
    }
    let policy = preview.policy.clone().unwrap_or_default();
    render_preview(&preview.bundle, &policy)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Converts the bundle's raw message list into tagged messages.
///
/// A bundle without a usable `messages` array yields an empty list; the
/// structural validator has already reported that defect.
fn collect_messages(bundle: &Value) -> Vec<Message> {
    bundle
        .get("messages")
        .and_then(Value::as_array)
        .map(|messages| messages.iter().map(Message::from_value).collect())
        .unwrap_or_default()
}

/// Builds a blocked outcome with the guaranteed fallback.
fn blocked(report: ValidationReport) -> RenderOutcome {
    RenderOutcome::Blocked {
        issues: report.issues,
        fallback: RenderFallback::placeholder(),
    }
}
