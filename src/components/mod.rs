//! # Component binding surface.
//!
//! Components plug into the graph as typed handlers behind a scheduler:
//! [`ComponentWiring`] pairs a scheduler with a late-bound component cell and
//! turns component methods into input wires. The rules:
//!
//! - Components never reference each other directly; only wires connect them.
//! - Construction order is irrelevant: wires are created (and soldered)
//!   before the component instance exists; `bind` supplies it later, and a
//!   model refuses to start with an unbound component.
//! - There are no process-wide singletons; everything hangs off the model
//!   instance passed in explicitly.

mod pass_through;
mod wiring;

pub use pass_through::PassThroughWiring;
pub use wiring::ComponentWiring;
