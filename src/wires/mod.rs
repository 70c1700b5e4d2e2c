//! # Typed wires: the edges of the dataflow graph.
//!
//! An [`InputWire`] is a typed entry point into a scheduler, bound to one
//! handler. An [`OutputWire`] is a typed exit point; **soldering** connects an
//! output to an input. Every solder carries a [`SolderKind`] that decides how
//! emissions interact with the target's backpressure:
//!
//! - `Default` blocks the emitter while the target is at capacity.
//! - `Inject` forces past capacity; required to break structural cycles.
//! - `Offer` drops the value when the target is full; for heartbeats where
//!   missing a tick is acceptable.
//!
//! Delivery is per-item sequential across a wire's sinks in solder order,
//! which is what `ordered_solder_to` builds its guarantee on.

mod input;
mod output;
mod solder;

pub use input::InputWire;
pub use output::{OutputWire, StandardOutputWire};
pub use solder::SolderKind;
