//! # Task counters: in-flight work accounting and backpressure.
//!
//! Every scheduler owns a pair of counters: an **on-ramp** incremented when a
//! task is accepted and an **off-ramp** decremented when the task retires.
//! Normally both are the same counter; tightly coupled scheduler pairs (the
//! event hasher and the post-hash collector) deliberately split them so that
//! one shared counter spans the pair and a single `wait_until_empty` flushes
//! both.
//!
//! ## Variants
//! - [`StandardCounter`] plain counting, never parks.
//! - [`BackpressureCounter`] parks `on_ramp` callers while the count sits at
//!   capacity; `attempt_on_ramp` refuses instead of parking and
//!   `force_on_ramp` bypasses the capacity check entirely (INJECT solders).
//! - [`NoOpCounter`] counts nothing; used by DIRECT and NO_OP schedulers.
//!
//! ## Rules
//! - The count never goes negative; every off-ramp matches one on-ramp.
//! - `wait_until_empty` returns only after the count has reached zero at
//!   least once since the call.
//! - Shared counters serialize the capacity check across their schedulers
//!   (compare-and-swap on one atomic).

mod backpressure;
mod counter;
mod noop;
mod standard;

pub use backpressure::BackpressureCounter;
pub use counter::Counter;
pub use noop::NoOpCounter;
pub use standard::StandardCounter;
