//! # Preconsensus event stream (PCES).
//!
//! Events that survive intake are assigned stream sequence numbers by the
//! [`PcesSequencer`], appended to the durable log by the [`PcesWriter`], and
//! consensus rounds are held in the [`RoundDurabilityBuffer`] until their
//! keystone event is durable.
//!
//! ## The keystone-flush protocol
//! The round handler must only receive rounds whose keystone event the
//! writer has flushed. The graph enforces this with three edges:
//!
//! 1. The engine's round output is **ordered-soldered** to the keystone
//!    sequence transformer (which submits a flush request to the writer)
//!    *before* the durability buffer's round input. The flush request
//!    therefore always reaches the writer even when the round handler's
//!    queue is full, which is the deadlock this protocol exists to prevent.
//! 2. The writer's latest-durable output reaches the durability buffer on an
//!    INJECT edge, breaking the writer → buffer → handler → … cycle.
//! 3. A heartbeat drives `check_for_stale_rounds` so a wedged round is
//!    reported even when no new events arrive.

mod durability;
mod replayer;
mod sequencer;
mod writer;

pub use durability::{DurableSequence, RoundDurabilityBuffer};
pub use replayer::PcesReplayerWiring;
pub use sequencer::PcesSequencer;
pub use writer::PcesWriter;
