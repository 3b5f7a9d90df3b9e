// crates/surface-gate-core/src/runtime/session.rs
// ============================================================================
// Module: Surface Gate Live Session Engine
// Description: Per-session state machine for live agent UI updates.
// Purpose: Admit a widget's declared contract, then confine updates and events to it.
// Dependencies: crate::core, thiserror, serde_json
// ============================================================================

//! ## Overview
//! Each live session is a state machine with two states: not-started and
//! live. A session only starts on an explicit user gesture, and once live it
//! accepts update messages and inbound events strictly within the widget's
//! declared surface/event contract. Out-of-contract traffic is rejected
//! without mutating any surface state.
//!
//! State ownership: the engine exclusively owns all session state. A single
//! registry lock guards only map lookup and insertion; each session carries
//! its own lock, so unrelated sessions are processed fully in parallel while
//! updates within one session key are serialized. Callers receive cloned
//! snapshots, never references into engine state.
//!
//! The engine never reads wall-clock time; hosts supply timestamps on every
//! mutating call, which keeps idle-session eviction testable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use serde_json::Value;
use thiserror::Error;

use crate::core::identifiers::ComponentId;
use crate::core::identifiers::SessionKey;
use crate::core::identifiers::SurfaceId;
use crate::core::manifest::Widget;
use crate::core::message::BeginRendering;
use crate::core::message::Message;
use crate::core::message::SurfaceUpdate;

// ============================================================================
// SECTION: Widget Contract
// ============================================================================

/// Surface and event contract governing one live session.
///
/// # Invariants
/// - Sets are fixed at session start; the engine never widens them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WidgetContract {
    /// Surfaces the widget may update.
    pub surface_ids: BTreeSet<SurfaceId>,
    /// Event type names the widget may receive.
    pub event_types: BTreeSet<String>,
}

impl WidgetContract {
    /// Derives the contract from a manifest widget.
    #[must_use]
    pub fn from_widget(widget: &Widget) -> Self {
        Self {
            surface_ids: widget.surface_contract.surface_ids.iter().cloned().collect(),
            event_types: widget.events.iter().cloned().collect(),
        }
    }
}

/// Options supplied to [`SessionEngine::start`].
///
/// # Invariants
/// - `user_initiated` reflects an actual user gesture observed by the
///   transport; the engine trusts the transport on this point only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StartOptions {
    /// Whether the start request was user-initiated.
    pub user_initiated: bool,
}

// ============================================================================
// SECTION: Session Errors
// ============================================================================

/// Session protocol errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling; `code()` values match the
///   wire taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// A live session must never begin without a user gesture.
    #[error("live session requires a user gesture")]
    UserGestureRequired,
    /// No live session exists for the key.
    #[error("session not started")]
    SessionNotStarted,
    /// The message targets a surface outside the widget's contract.
    #[error("surface not allowed: {surface_id}")]
    SurfaceNotAllowed {
        /// Offending surface identifier.
        surface_id: SurfaceId,
    },
    /// The message has no recognized shape.
    #[error("message type unsupported")]
    MessageTypeUnsupported,
    /// The event is not a well-formed event object.
    #[error("invalid event")]
    InvalidEvent,
    /// The event type is outside the widget's declared event set.
    #[error("event not allowed: {event_type}")]
    EventNotAllowed {
        /// Offending event type name.
        event_type: String,
    },
}

impl SessionError {
    /// Returns the stable snake_case error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::UserGestureRequired => "user_gesture_required",
            Self::SessionNotStarted => "session_not_started",
            Self::SurfaceNotAllowed {
                ..
            } => "surface_not_allowed",
            Self::MessageTypeUnsupported => "message_type_unsupported",
            Self::InvalidEvent => "invalid_event",
            Self::EventNotAllowed {
                ..
            } => "event_not_allowed",
        }
    }
}

// ============================================================================
// SECTION: Session State
// ============================================================================

/// Cloned snapshot of one surface's state.
///
/// # Invariants
/// - Detached from engine state; mutating a snapshot has no effect on the
///   session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurfaceSnapshot {
    /// Flat id-to-component table for the surface.
    pub components: BTreeMap<ComponentId, Value>,
    /// Root component id, when declared.
    pub root_id: Option<ComponentId>,
}

/// Mutable per-surface state owned by a session.
#[derive(Debug, Clone, Default)]
struct SurfaceState {
    /// Flat id-to-component table.
    components: BTreeMap<ComponentId, Value>,
    /// Root component id, when declared.
    root_id: Option<ComponentId>,
}

/// One session's state and contract.
#[derive(Debug)]
struct SessionEntry {
    /// Contract admitted at start.
    contract: WidgetContract,
    /// Whether the session is live.
    live: bool,
    /// Display hint for the live badge (not a protocol state).
    live_badge_visible: bool,
    /// Per-surface state tables.
    surfaces: BTreeMap<SurfaceId, SurfaceState>,
    /// Last-touched timestamp in unix milliseconds.
    last_touched_ms: i64,
}

// ============================================================================
// SECTION: Session Engine
// ============================================================================

/// Live session engine owning all per-session state.
///
/// # Invariants
/// - The registry lock guards only map lookup/insert; message application
///   holds the per-session lock only.
/// - Session state never leaves the engine by reference.
#[derive(Debug, Default)]
pub struct SessionEngine {
    /// Session registry keyed by session key.
    sessions: Mutex<HashMap<SessionKey, Arc<Mutex<SessionEntry>>>>,
}

impl SessionEngine {
    /// Creates an empty engine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a live session for the key under the given contract.
    ///
    /// Restarting an already-live session is idempotent: the session stays
    /// live and its state is kept.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UserGestureRequired`] unless the start request
    /// was user-initiated.
    pub fn start(
        &self,
        key: &SessionKey,
        contract: WidgetContract,
        options: StartOptions,
        now_ms: i64,
    ) -> Result<(), SessionError> {
        if !options.user_initiated {
            return Err(SessionError::UserGestureRequired);
        }
        let entry = self.entry_or_insert(key, contract, now_ms);
        let mut session = lock_unpoisoned(&entry);
        session.live = true;
        session.live_badge_visible = true;
        session.last_touched_ms = now_ms;
        Ok(())
    }

    /// Applies one update message to a live session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::SessionNotStarted`] when the key has no live
    /// session, [`SessionError::SurfaceNotAllowed`] for out-of-contract
    /// surfaces (without mutating state), and
    /// [`SessionError::MessageTypeUnsupported`] for unrecognized shapes.
    pub fn apply_message(
        &self,
        key: &SessionKey,
        message: &Value,
        now_ms: i64,
    ) -> Result<(), SessionError> {
        let entry = self.live_entry(key)?;
        let mut session = lock_unpoisoned(&entry);
        let tagged = Message::from_value(message);
        check_contract(&session.contract, &tagged)?;
        apply_tagged(&mut session, &tagged);
        session.last_touched_ms = now_ms;
        Ok(())
    }

    /// Applies a batch of update messages atomically.
    ///
    /// Every message is validated against the contract before any is applied,
    /// so a violating batch is rejected without partial application.
    ///
    /// # Errors
    ///
    /// Returns the first [`SessionError`] found during the validation pass.
    pub fn apply_batch(
        &self,
        key: &SessionKey,
        messages: &[Value],
        now_ms: i64,
    ) -> Result<(), SessionError> {
        let entry = self.live_entry(key)?;
        let mut session = lock_unpoisoned(&entry);
        let tagged: Vec<Message> = messages.iter().map(Message::from_value).collect();
        for message in &tagged {
            check_contract(&session.contract, message)?;
        }
        for message in &tagged {
            apply_tagged(&mut session, message);
        }
        session.last_touched_ms = now_ms;
        Ok(())
    }

    /// Dispatches one inbound user event against a live session.
    ///
    /// A successfully dispatched event does not mutate surface state; the
    /// effect flows back as ordinary update messages from the agent.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::SessionNotStarted`] when the key has no live
    /// session, [`SessionError::InvalidEvent`] for non-object events or a
    /// missing string `type`, and [`SessionError::EventNotAllowed`] for types
    /// outside the contract.
    pub fn dispatch_event(
        &self,
        key: &SessionKey,
        event: &Value,
        now_ms: i64,
    ) -> Result<(), SessionError> {
        let entry = self.live_entry(key)?;
        let mut session = lock_unpoisoned(&entry);
        let Some(map) = event.as_object() else {
            return Err(SessionError::InvalidEvent);
        };
        let Some(event_type) = map.get("type").and_then(Value::as_str) else {
            return Err(SessionError::InvalidEvent);
        };
        if !session.contract.event_types.contains(event_type) {
            return Err(SessionError::EventNotAllowed {
                event_type: event_type.to_string(),
            });
        }
        session.last_touched_ms = now_ms;
        Ok(())
    }

    /// Returns a cloned snapshot of one surface, or `None` when the key or
    /// surface is unknown.
    #[must_use]
    pub fn get_surface(&self, key: &SessionKey, surface_id: &SurfaceId) -> Option<SurfaceSnapshot> {
        let entry = self.lookup(key)?;
        let session = lock_unpoisoned(&entry);
        session.surfaces.get(surface_id).map(|surface| SurfaceSnapshot {
            components: surface.components.clone(),
            root_id: surface.root_id.clone(),
        })
    }

    /// Returns true when the key has a live session.
    #[must_use]
    pub fn is_live(&self, key: &SessionKey) -> bool {
        self.lookup(key).is_some_and(|entry| lock_unpoisoned(&entry).live)
    }

    /// Returns the live-badge display hint for the key.
    #[must_use]
    pub fn live_badge_visible(&self, key: &SessionKey) -> bool {
        self.lookup(key).is_some_and(|entry| lock_unpoisoned(&entry).live_badge_visible)
    }

    /// Evicts sessions idle for longer than `max_idle_ms`, returning the
    /// number of sessions removed.
    pub fn evict_idle(&self, now_ms: i64, max_idle_ms: i64) -> usize {
        let mut sessions = lock_unpoisoned(&self.sessions);
        let before = sessions.len();
        sessions.retain(|_, entry| {
            let session = lock_unpoisoned(entry);
            now_ms.saturating_sub(session.last_touched_ms) <= max_idle_ms
        });
        before.saturating_sub(sessions.len())
    }

    /// Looks up a session entry without creating one.
    fn lookup(&self, key: &SessionKey) -> Option<Arc<Mutex<SessionEntry>>> {
        lock_unpoisoned(&self.sessions).get(key).cloned()
    }

    /// Looks up a session entry, requiring it to be live.
    fn live_entry(&self, key: &SessionKey) -> Result<Arc<Mutex<SessionEntry>>, SessionError> {
        let entry = self.lookup(key).ok_or(SessionError::SessionNotStarted)?;
        if !lock_unpoisoned(&entry).live {
            return Err(SessionError::SessionNotStarted);
        }
        Ok(entry)
    }

    /// Returns the existing entry for the key or inserts a fresh one.
    fn entry_or_insert(
        &self,
        key: &SessionKey,
        contract: WidgetContract,
        now_ms: i64,
    ) -> Arc<Mutex<SessionEntry>> {
        let mut sessions = lock_unpoisoned(&self.sessions);
        sessions
            .entry(key.clone())
            .or_insert_with(|| {
                Arc::new(Mutex::new(SessionEntry {
                    contract,
                    live: false,
                    live_badge_visible: false,
                    surfaces: BTreeMap::new(),
                    last_touched_ms: now_ms,
                }))
            })
            .clone()
    }
}

// ============================================================================
// SECTION: Message Application
// ============================================================================

/// Checks one tagged message against the session's contract.
fn check_contract(contract: &WidgetContract, message: &Message) -> Result<(), SessionError> {
    match message {
        Message::SurfaceUpdate(SurfaceUpdate {
            surface_id, ..
        })
        | Message::BeginRendering(BeginRendering {
            surface_id, ..
        }) => {
            if contract.surface_ids.contains(surface_id) {
                Ok(())
            } else {
                Err(SessionError::SurfaceNotAllowed {
                    surface_id: surface_id.clone(),
                })
            }
        }
        Message::Unknown(_) => Err(SessionError::MessageTypeUnsupported),
    }
}

/// Applies one contract-checked message to session state.
///
/// Upserts are idempotent per component id: re-applying the same id
/// overwrites, never duplicates.
fn apply_tagged(session: &mut SessionEntry, message: &Message) {
    match message {
        Message::SurfaceUpdate(update) => {
            let surface = session.surfaces.entry(update.surface_id.clone()).or_default();
            for entry in &update.components {
                surface.components.insert(entry.id.clone(), entry.component.clone());
            }
        }
        Message::BeginRendering(begin) => {
            let surface = session.surfaces.entry(begin.surface_id.clone()).or_default();
            surface.root_id = Some(begin.root.clone());
        }
        // Unreachable after contract checks; kept total for safety.
        Message::Unknown(_) => {}
    }
}

// ============================================================================
// SECTION: Lock Helpers
// ============================================================================

/// Locks a mutex, recovering the guard from a poisoned lock.
///
/// Session state stays internally consistent under poisoning because every
/// mutation is applied only after its contract checks pass.
fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
