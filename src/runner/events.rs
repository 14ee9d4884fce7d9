//! Structured progress events.
//!
//! The core emits events; rendering and persistence belong to whoever
//! consumes them. Emission is best-effort and must never block the
//! worker. A slow or absent consumer costs events, not correctness.

use crate::ops::Outcome;
use crate::repair::plan::RepairPlan;
use crate::repair::RepairState;
use crate::verify::OverallStatus;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::mpsc::{Receiver, SyncSender, TrySendError};
use std::sync::Mutex;

/// One progress event with its emission time.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgressEvent {
    StepStarted {
        step: String,
        tool: String,
        timestamp: DateTime<Utc>,
    },
    StepCompleted {
        step: String,
        outcome: Outcome,
        timestamp: DateTime<Utc>,
    },
    StepFailed {
        step: String,
        error: String,
        timestamp: DateTime<Utc>,
    },
    VerificationCompleted {
        tool: String,
        status: OverallStatus,
        version: Option<String>,
        hint: Option<String>,
        timestamp: DateTime<Utc>,
    },
    RepairProposed {
        tool: String,
        plan: RepairPlan,
        timestamp: DateTime<Utc>,
    },
    RepairCompleted {
        tool: String,
        state: RepairState,
        hint: Option<String>,
        timestamp: DateTime<Utc>,
    },
}

/// Best-effort event consumer.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: ProgressEvent);
}

/// Sink that discards everything.
#[derive(Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: ProgressEvent) {}
}

/// Sink forwarding events over a bounded channel without ever blocking.
///
/// A full channel drops the event; the worker's progress must not
/// depend on how fast the foreground drains.
pub struct ChannelSink {
    tx: SyncSender<ProgressEvent>,
}

impl ChannelSink {
    /// Create a sink and its receiving end.
    pub fn bounded(capacity: usize) -> (Self, Receiver<ProgressEvent>) {
        let (tx, rx) = std::sync::mpsc::sync_channel(capacity);
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: ProgressEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                tracing::debug!("event sink full, dropping progress event");
            }
            Err(TrySendError::Disconnected(_)) => {}
        }
    }
}

/// Sink collecting events in memory. Test double.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<ProgressEvent>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for CollectingSink {
    fn emit(&self, event: ProgressEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event() -> ProgressEvent {
        ProgressEvent::StepCompleted {
            step: "claude".to_string(),
            outcome: Outcome::Added,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn channel_sink_delivers_events() {
        let (sink, rx) = ChannelSink::bounded(4);
        sink.emit(sample_event());

        let received = rx.try_recv().unwrap();
        assert!(matches!(received, ProgressEvent::StepCompleted { .. }));
    }

    #[test]
    fn full_channel_drops_instead_of_blocking() {
        let (sink, rx) = ChannelSink::bounded(1);
        sink.emit(sample_event());
        // Channel is full now; this emit must return immediately
        sink.emit(sample_event());

        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn disconnected_receiver_is_silent() {
        let (sink, rx) = ChannelSink::bounded(1);
        drop(rx);
        sink.emit(sample_event());
    }

    #[test]
    fn events_serialize_with_tag() {
        let json = serde_json::to_string(&sample_event()).unwrap();
        assert!(json.contains("\"event\":\"step_completed\""));
        assert!(json.contains("\"outcome\":\"added\""));
    }

    #[test]
    fn collecting_sink_keeps_order() {
        let sink = CollectingSink::new();
        sink.emit(ProgressEvent::StepStarted {
            step: "a".to_string(),
            tool: "A".to_string(),
            timestamp: Utc::now(),
        });
        sink.emit(sample_event());

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], ProgressEvent::StepStarted { .. }));
    }
}
