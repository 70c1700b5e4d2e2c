//! # Error types used by the wiring framework.
//!
//! This module defines two main error enums:
//!
//! - [`BuildError`] defects in the wiring graph itself, fatal at startup.
//! - [`WireError`] errors raised while the model is running.
//!
//! Both types provide a `as_label` helper for logs and metrics.
//!
//! [`FatalError`] is not a returned error but a panic payload: a handler
//! that detects an invariant breach panics with it, and the scheduler's
//! panic isolation lets it take the process down instead of retiring the
//! task.

use thiserror::Error;

/// # Defects detected while assembling or validating the wiring graph.
///
/// All of these are fatal: a model with build defects refuses to start.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum BuildError {
    /// Two schedulers were registered under the same name.
    #[error("scheduler '{name}' is already registered in the model")]
    DuplicateScheduler {
        /// The duplicate scheduler name.
        name: String,
    },
    /// A component scheduler was wired but never bound to an instance.
    #[error("component '{name}' was never bound to an instance")]
    UnboundComponent {
        /// The unbound component's scheduler name.
        name: String,
    },
    /// A component was bound twice; the second instance was rejected.
    #[error("component '{name}' was bound twice")]
    DoubleBind {
        /// The component's scheduler name.
        name: String,
    },
    /// A cycle exists in which every edge applies backpressure, which can
    /// deadlock once queues fill up.
    #[error("backpressure cycle through default-soldered schedulers: {}", cycle.join(" -> "))]
    CyclicBackpressure {
        /// The scheduler names on the offending cycle, in traversal order.
        cycle: Vec<String>,
    },
    /// `start()` was called twice on the same model.
    #[error("wiring model was already started")]
    AlreadyStarted,
}

impl BuildError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            BuildError::DuplicateScheduler { .. } => "build_duplicate_scheduler",
            BuildError::UnboundComponent { .. } => "build_unbound_component",
            BuildError::DoubleBind { .. } => "build_double_bind",
            BuildError::CyclicBackpressure { .. } => "build_cyclic_backpressure",
            BuildError::AlreadyStarted => "build_already_started",
        }
    }
}

/// # Errors raised while the model is running.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum WireError {
    /// A parked on-ramp observed cancellation; the task was not submitted.
    #[error("submission canceled while parked on backpressure")]
    Canceled,

    /// `flush()` was called on a scheduler built without flushing enabled.
    #[error("scheduler '{scheduler}' does not support flushing")]
    NotFlushable {
        /// The scheduler name.
        scheduler: String,
    },

    /// A squelch operation was attempted on a scheduler built without
    /// squelching enabled.
    #[error("scheduler '{scheduler}' does not support squelching")]
    NotSquelchable {
        /// The scheduler name.
        scheduler: String,
    },
}

impl WireError {
    /// Returns a short stable label.
    pub fn as_label(&self) -> &'static str {
        match self {
            WireError::Canceled => "wire_canceled",
            WireError::NotFlushable { .. } => "wire_not_flushable",
            WireError::NotSquelchable { .. } => "wire_not_squelchable",
        }
    }
}

/// Panic payload for invariant breaches that must not be survived.
///
/// Ordinary handler panics are caught, logged, and the pipeline keeps
/// running. A panic carrying this payload (via [`std::panic::panic_any`])
/// is recognized by the scheduler and aborts the process after logging:
/// the durability check in the consensus round handler is the canonical
/// producer.
#[derive(Error, Debug)]
#[error("fatal invariant breach: {reason}")]
pub struct FatalError {
    reason: String,
}

impl FatalError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Renders a caught panic payload for logs and events.
pub(crate) fn describe_panic(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(fatal) = payload.downcast_ref::<FatalError>() {
        fatal.to_string()
    } else if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unidentified panic payload".to_string()
    }
}
