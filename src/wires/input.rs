//! # Typed entry points into schedulers.
//!
//! An input wire owns the composed task body for its handler: squelch check,
//! handler invocation, fan-out to the owning scheduler's output, panic
//! isolation, and the off-ramp. Submitting a value picks the entry mode:
//!
//! - [`put`](InputWire::put) takes the on-ramp, parking at capacity.
//! - [`inject`](InputWire::inject) forces the on-ramp (INJECT solders).
//! - [`offer`](InputWire::offer) refuses instead of parking (OFFER solders).
//!
//! For DIRECT-family schedulers all three run the task inline on the caller.

use std::sync::Arc;

use crate::events::{RuntimeEvent, RuntimeEventKind};
use crate::schedulers::{RawHandler, SchedulerCore, SchedulerKind};

/// Typed entry point into a scheduler, bound to one handler.
pub struct InputWire<In> {
    name: String,
    core: Arc<SchedulerCore>,
    handler: RawHandler<In>,
}

impl<In> Clone for InputWire<In> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            core: Arc::clone(&self.core),
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<In: Send + 'static> InputWire<In> {
    pub(crate) fn new(name: String, core: Arc<SchedulerCore>, handler: RawHandler<In>) -> Self {
        Self {
            name,
            core,
            handler,
        }
    }

    /// Returns the wire name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the name of the owning scheduler.
    pub fn scheduler_name(&self) -> &str {
        self.core.name()
    }

    /// Submits a value, parking while the scheduler is at capacity.
    ///
    /// Returns without submitting if the model is stopped while parked.
    pub async fn put(&self, value: In) {
        match self.core.kind {
            SchedulerKind::NoOp => {}
            kind if kind.is_direct() => (self.handler)(value).await,
            _ => {
                if self
                    .core
                    .on_ramp
                    .interruptable_on_ramp(&self.core.token)
                    .await
                    .is_err()
                {
                    return;
                }
                self.core.dispatch((self.handler)(value));
            }
        }
    }

    /// Submits a value regardless of capacity.
    pub async fn inject(&self, value: In) {
        match self.core.kind {
            SchedulerKind::NoOp => {}
            kind if kind.is_direct() => (self.handler)(value).await,
            _ => {
                self.core.on_ramp.force_on_ramp();
                self.core.dispatch((self.handler)(value));
            }
        }
    }

    /// Submits a value only if the scheduler has capacity; returns whether
    /// the value was accepted.
    pub async fn offer(&self, value: In) -> bool {
        match self.core.kind {
            SchedulerKind::NoOp => true,
            kind if kind.is_direct() => {
                (self.handler)(value).await;
                true
            }
            _ => {
                if self.core.on_ramp.attempt_on_ramp() {
                    self.core.dispatch((self.handler)(value));
                    true
                } else {
                    self.core.bus().publish(
                        RuntimeEvent::now(RuntimeEventKind::OfferRejected)
                            .with_scheduler(self.core.name())
                            .with_detail(self.name.clone()),
                    );
                    false
                }
            }
        }
    }
}
