// crates/surface-gate-core/examples/preview.rs
// ============================================================================
// Module: Surface Gate Preview Example
// Description: Minimal end-to-end preview render and live session run.
// Purpose: Demonstrate render_preview, the session engine, and the gate.
// Dependencies: surface-gate-core
// ============================================================================

//! ## Overview
//! Renders an inline preview bundle under the default policy, then starts a
//! live session for the same widget and pushes one admitted update batch.

use serde_json::json;
use surface_gate_core::AdmissionGate;
use surface_gate_core::GateLimits;
use surface_gate_core::PolicyConfig;
use surface_gate_core::SessionEngine;
use surface_gate_core::SessionKey;
use surface_gate_core::StartOptions;
use surface_gate_core::SurfaceId;
use surface_gate_core::WidgetContract;
use surface_gate_core::render_preview;

/// Error type for example preconditions.
#[derive(Debug)]
struct ExampleError(&'static str);

impl std::fmt::Display for ExampleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for ExampleError {}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let bundle = json!({
        "messages": [
            {
                "surfaceUpdate": {
                    "surfaceId": "preview",
                    "components": [
                        { "id": "root", "component": { "Text": { "literalString": "hi" } } }
                    ]
                }
            },
            { "beginRendering": { "surfaceId": "preview", "root": "root" } }
        ]
    });

    let outcome = render_preview(&bundle, &PolicyConfig::default());
    let plan = outcome.plan().ok_or(ExampleError("preview bundle should render"))?;

    let engine = SessionEngine::new();
    let gate = AdmissionGate::new(GateLimits::default());
    let key = SessionKey::new("agent-7:w-1");
    let contract = WidgetContract {
        surface_ids: [SurfaceId::new("main")].into_iter().collect(),
        event_types: ["userAction".to_string()].into_iter().collect(),
    };

    engine.start(
        &key,
        contract,
        StartOptions {
            user_initiated: true,
        },
        0,
    )?;

    let batch = json!([
        {
            "surfaceUpdate": {
                "surfaceId": "main",
                "components": [ { "id": "root", "component": { "Text": { "literalString": "live" } } } ]
            }
        },
        { "beginRendering": { "surfaceId": "main", "root": "root" } }
    ]);
    gate.admit_at(&key, &batch, 1)?;
    let updates = batch.as_array().ok_or(ExampleError("batch must be an array"))?;
    engine.apply_batch(&key, updates, 1)?;

    let snapshot = engine
        .get_surface(&key, &SurfaceId::new("main"))
        .ok_or(ExampleError("live surface missing"))?;
    let _ = (plan, snapshot);
    Ok(())
}
