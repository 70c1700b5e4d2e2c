//! # Runtime events emitted by the wiring model.
//!
//! The model and its schedulers publish structured [`RuntimeEvent`]s on a
//! broadcast [`Bus`]: lifecycle transitions (model started/stopped), squelch
//! and flush activity, handler panics, and rejected offers. Subscribers
//! consume them for logging, metrics, or custom error reporting; see
//! [`crate::subscribers`].

mod bus;
mod event;

pub use bus::Bus;
pub use event::{RuntimeEvent, RuntimeEventKind};
