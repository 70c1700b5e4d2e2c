//! # Task schedulers: the execution policies of the wiring graph.
//!
//! A scheduler is the unit of execution behind one or more input wires. Its
//! [`SchedulerKind`] decides everything about how tasks run:
//!
//! | Kind | Concurrency | Order | Suspends |
//! |---|---|---|---|
//! | `Sequential` | one task at a time | FIFO across the scheduler's wires | on backpressure |
//! | `Concurrent` | parallel on the shared pool | none | on backpressure |
//! | `Direct` | caller's task | caller order | never |
//! | `DirectThreadsafe` | caller's task, concurrent callers allowed | caller order | never |
//! | `NoOp` | none | — | never |
//!
//! ## Task lifecycle
//! ```text
//! wire.put(value)
//!   ├─ on-ramp counter (parks at capacity; inject forces; offer refuses)
//!   ├─ dispatch per kind (queue / spawn / inline / drop)
//!   └─ task executes:
//!        squelched? ── yes ──► skip handler
//!           │ no
//!        handler(value) ──► Some(out) ──► fan out to soldered sinks
//!           │ panic? caught, published, logged
//!        off-ramp counter
//! ```
//!
//! The off-ramp always runs after the fan-out, so backpressure from a slow
//! downstream reaches the upstream counter before the task retires.

mod builder;
mod core;
mod kind;
mod scheduler;

pub use builder::SchedulerBuilder;
pub use kind::SchedulerKind;
pub use scheduler::TaskScheduler;

pub(crate) use self::core::{RawHandler, SchedulerCore};
