// crates/surface-gate-core/src/core/message.rs
// ============================================================================
// Module: Surface Gate Messages
// Description: Tagged message model for surface updates and render starts.
// Purpose: Replace wire shape-probing with an explicit sum type at the boundary.
// Dependencies: crate::core::identifiers, serde, serde_json
// ============================================================================

//! ## Overview
//! Update messages arrive as JSON objects discriminated by the presence of a
//! `surfaceUpdate` or `beginRendering` key. This module converts that wire
//! shape into an explicit tagged sum exactly once, so downstream code matches
//! exhaustively instead of probing optional fields. A value carrying neither
//! key, or a discriminating key with an unusable inner shape, becomes
//! [`Message::Unknown`] and stays inert until a consumer decides how strictly
//! to treat it.
//!
//! Security posture: messages are authored by untrusted remote agents; the
//! conversion here never faults on malformed input.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;

use crate::core::identifiers::ComponentId;
use crate::core::identifiers::SurfaceId;

// ============================================================================
// SECTION: Wire Keys
// ============================================================================

/// Wire key discriminating a surface update message.
pub const KEY_SURFACE_UPDATE: &str = "surfaceUpdate";

/// Wire key discriminating a begin-rendering message.
pub const KEY_BEGIN_RENDERING: &str = "beginRendering";

// ============================================================================
// SECTION: Message Model
// ============================================================================

/// One component entry carried by a surface update.
///
/// # Invariants
/// - `component` is an opaque value until the sandbox scan inspects it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentEntry {
    /// Component identifier used for upserts.
    pub id: ComponentId,
    /// Component payload.
    pub component: Value,
}

/// Surface update message body.
///
/// # Invariants
/// - `components` preserves wire order; upsert semantics are applied by
///   consumers, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceUpdate {
    /// Target surface.
    pub surface_id: SurfaceId,
    /// Ordered component entries.
    pub components: Vec<ComponentEntry>,
}

/// Begin-rendering message body.
///
/// # Invariants
/// - `root` names a component id expected to exist in the target surface's
///   folded component table; existence is checked by consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeginRendering {
    /// Target surface.
    pub surface_id: SurfaceId,
    /// Declared root component id.
    pub root: ComponentId,
}

/// Tagged update message.
///
/// # Invariants
/// - Exactly one conversion site ([`Message::from_value`]) produces this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Surface update carrying component entries.
    SurfaceUpdate(SurfaceUpdate),
    /// Begin-rendering marker declaring a surface root.
    BeginRendering(BeginRendering),
    /// Message with no recognized shape; inert unless a consumer rejects it.
    Unknown(Value),
}

impl Message {
    /// Converts an untrusted wire value into a tagged message.
    ///
    /// A malformed body under a discriminating key (wrong types, missing
    /// fields) yields [`Message::Unknown`]; the structural validator reports
    /// those defects separately so this conversion never needs to fault.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            return Self::Unknown(value.clone());
        };
        if let Some(body) = map.get(KEY_SURFACE_UPDATE) {
            if let Some(update) = parse_surface_update(body) {
                return Self::SurfaceUpdate(update);
            }
            return Self::Unknown(value.clone());
        }
        if let Some(body) = map.get(KEY_BEGIN_RENDERING) {
            if let Some(begin) = parse_begin_rendering(body) {
                return Self::BeginRendering(begin);
            }
            return Self::Unknown(value.clone());
        }
        Self::Unknown(value.clone())
    }

    /// Returns the target surface for surface-bound messages.
    #[must_use]
    pub const fn surface_id(&self) -> Option<&SurfaceId> {
        match self {
            Self::SurfaceUpdate(update) => Some(&update.surface_id),
            Self::BeginRendering(begin) => Some(&begin.surface_id),
            Self::Unknown(_) => None,
        }
    }
}

// ============================================================================
// SECTION: Body Parsers
// ============================================================================

/// Parses a `surfaceUpdate` body, returning `None` on any shape defect.
fn parse_surface_update(body: &Value) -> Option<SurfaceUpdate> {
    let map = body.as_object()?;
    let surface_id = map.get("surfaceId")?.as_str()?;
    let components = map.get("components")?.as_array()?;
    let mut entries = Vec::with_capacity(components.len());
    for entry in components {
        let entry_map = entry.as_object()?;
        let id = entry_map.get("id")?.as_str()?;
        let component = entry_map.get("component").cloned().unwrap_or(Value::Null);
        entries.push(ComponentEntry {
            id: ComponentId::new(id),
            component,
        });
    }
    Some(SurfaceUpdate {
        surface_id: SurfaceId::new(surface_id),
        components: entries,
    })
}

/// Parses a `beginRendering` body, returning `None` on any shape defect.
fn parse_begin_rendering(body: &Value) -> Option<BeginRendering> {
    let map = body.as_object()?;
    let surface_id = map.get("surfaceId")?.as_str()?;
    let root = map.get("root")?.as_str()?;
    Some(BeginRendering {
        surface_id: SurfaceId::new(surface_id),
        root: ComponentId::new(root),
    })
}
