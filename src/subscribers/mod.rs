//! # Pluggable consumers of runtime events.
//!
//! [`Subscribe`] is the extension point for hooking custom reporting into the
//! model: metrics exporters, uncaught-error reporters, audit sinks. Each
//! subscriber gets a dedicated worker task and a bounded queue, so a slow
//! subscriber only ever affects itself.
//!
//! [`TracingSubscriber`] is the built-in bridge that forwards runtime events
//! into `tracing` at an appropriate level.

mod log;
mod set;
mod subscribe;

pub use log::TracingSubscriber;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
