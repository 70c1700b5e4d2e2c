//! # Event subscriber trait.
//!
//! Each subscriber gets:
//! - **Dedicated worker task** (runs independently)
//! - **Bounded queue** (configurable capacity via [`Subscribe::queue_capacity`])
//! - **Panic isolation** (panics caught, reported as `SubscriberPanicked`)
//!
//! ## Rules
//! - Slow subscribers only affect themselves (queue overflow drops the event)
//! - Panics are isolated: they do not crash the model or other subscribers
//! - Subscribers never block publishers

use async_trait::async_trait;

use crate::events::RuntimeEvent;

/// Consumer of runtime events, running in its own worker task.
///
/// Implementations should handle errors internally and avoid blocking
/// operations; a panicking subscriber is isolated and reported but keeps its
/// worker alive.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single event.
    ///
    /// Called from the subscriber's dedicated worker, in FIFO order.
    async fn on_event(&self, event: &RuntimeEvent);

    /// Returns the subscriber name for logs and overflow reports.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Returns the preferred queue capacity for this subscriber.
    ///
    /// When the queue is full the event is dropped for this subscriber only
    /// and a `SubscriberOverflow` event is published.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
