//! # Runtime events emitted by the model and its schedulers.
//!
//! [`RuntimeEventKind`] classifies event types across three categories:
//! - **Model lifecycle**: the model started or stopped.
//! - **Scheduler activity**: squelch transitions, flushes, rejected offers.
//! - **Failure reporting**: handler panics, subscriber overflow/panic.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically, so events can be ordered correctly even when delivered
//! out-of-order through async channels.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEventKind {
    // === Model lifecycle ===
    /// The wiring model validated its graph and started its workers.
    ModelStarted,
    /// The wiring model was stopped; queued tasks were discarded.
    ModelStopped,

    // === Scheduler activity ===
    /// A scheduler entered squelch mode: future inputs are discarded.
    SquelchStarted,
    /// A scheduler left squelch mode.
    SquelchStopped,
    /// A scheduler's flush completed (its counter reached zero).
    FlushCompleted,
    /// An OFFER solder was refused because the target was at capacity.
    OfferRejected,

    // === Failure reporting ===
    /// A handler panicked; the task was retired and the pipeline continues.
    HandlerPanicked,
    /// A subscriber dropped an event (queue full or worker closed).
    SubscriberOverflow,
    /// A subscriber panicked during event processing.
    SubscriberPanicked,
}

/// Runtime event with optional metadata.
#[derive(Clone)]
pub struct RuntimeEvent {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp (may go backwards, use for logging only).
    pub at: SystemTime,
    /// The kind of event.
    pub kind: RuntimeEventKind,
    /// Name of the scheduler involved, if applicable.
    pub scheduler: Option<String>,
    /// Free-form detail: panic message, wire name, drop reason.
    pub detail: Option<String>,
}

impl RuntimeEvent {
    /// Creates a new event of the given kind with the next sequence number.
    pub fn now(kind: RuntimeEventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, Ordering::Relaxed),
            at: SystemTime::now(),
            kind,
            scheduler: None,
            detail: None,
        }
    }

    /// Attaches a scheduler name.
    pub fn with_scheduler(mut self, name: impl Into<String>) -> Self {
        self.scheduler = Some(name.into());
        self
    }

    /// Attaches a detail message.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Creates a subscriber overflow event.
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        RuntimeEvent::now(RuntimeEventKind::SubscriberOverflow)
            .with_detail(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        RuntimeEvent::now(RuntimeEventKind::SubscriberPanicked)
            .with_scheduler(subscriber)
            .with_detail(info)
    }

    /// Whether this event was produced by the subscriber machinery itself.
    ///
    /// Such events must not trigger further overflow diagnostics, or a
    /// saturated subscriber would generate an event storm.
    pub(crate) fn is_subscriber_internal(&self) -> bool {
        matches!(
            self.kind,
            RuntimeEventKind::SubscriberOverflow | RuntimeEventKind::SubscriberPanicked
        )
    }
}
