//! The audit sink seam.
//!
//! Auditing is fire-and-forget from the engine's point of view: sinks
//! absorb their own failures and never escalate into the attendance
//! operation's error path.

use std::fmt;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What happened to the audited entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// The entity was created.
    Create,
    /// The entity was mutated.
    Update,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "create",
            Self::Update => "update",
        })
    }
}

/// One data-modification event emitted after a successful operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Who performed the operation.
    pub actor_id: String,
    /// The kind of entity that changed (e.g. "attendance_record").
    pub entity_name: String,
    /// The id of the entity that changed.
    pub entity_id: String,
    /// What happened.
    pub action: AuditAction,
    /// JSON snapshot before the change, when one existed.
    pub old_value: Option<Value>,
    /// JSON snapshot after the change.
    pub new_value: Option<Value>,
    /// When the change happened.
    pub at: DateTime<Utc>,
}

/// Receives data-modification events.
///
/// Implementations must not fail the caller; anything that can go wrong
/// while recording stays inside the sink.
pub trait AuditSink: Send + Sync {
    /// Records one event, best effort.
    fn record(&self, event: AuditEvent);
}

/// A sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAuditSink;

impl AuditSink for NullAuditSink {
    fn record(&self, _event: AuditEvent) {}
}

/// A sink that emits events through `tracing` at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: AuditEvent) {
        tracing::info!(
            actor = %event.actor_id,
            entity = %event.entity_name,
            entity_id = %event.entity_id,
            action = %event.action,
            "data modification"
        );
    }
}

/// A sink that keeps every event in memory, for assertions in tests.
#[derive(Debug, Default)]
pub struct CollectingAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl CollectingAuditSink {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the events recorded so far.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl AuditSink for CollectingAuditSink {
    fn record(&self, event: AuditEvent) {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).push(event);
    }
}
