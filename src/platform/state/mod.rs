//! # State side of the pipeline.
//!
//! Signed states come out of the round handler, get hashed, accumulate
//! signatures in the collector, and once complete reach the nexuses and
//! the saver. States are reservable: every stage that holds one holds a
//! [`Reserved`](crate::reservation::Reserved) handle, and fan-out stages take
//! additional reservations through the [`StateReserver`] advanced
//! transformer.

mod collector;
mod hasher;
mod nexus;
mod reserver;
mod saver;

pub use collector::StateSignatureCollector;
pub use hasher::StateHasher;
pub use nexus::{LatestCompleteStateNexus, LatestImmutableStateNexus};
pub use reserver::StateReserver;
pub use saver::StateSaver;
