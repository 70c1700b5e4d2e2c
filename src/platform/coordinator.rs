//! # Platform coordinator.
//!
//! Drives the reconnect lifecycle over the wired pipeline. The live graph
//! contains cycles (consensus engine → event creation → validators →
//! consensus engine; event window feedback; durability feedback), so neither
//! squelching nor flushing alone is safe:
//!
//! - Squelching alone loses work already sitting in queues.
//! - Flushing alone livelocks, because upstream keeps emitting new work
//!   around the cycles.
//! - Clearing before flushing races in-flight mutations.
//!
//! Hence the four phases of [`clear`](PlatformCoordinator::clear): squelch
//! the cycle participants (and drain what was already in flight), flush
//! everything with the cycles broken, stop squelching, then inject `clear`
//! into the stateful components.
//!
//! The order of operations inside each phase matters. Do not reorder
//! without consulting the wiring diagram.

use std::sync::Arc;

use crate::components::ComponentWiring;
use crate::counters::Counter;
use crate::error::WireError;
use crate::reservation::Reserved;
use crate::wires::InputWire;

use crate::platform::consensus::{ConsensusEngine, ConsensusRoundHandler};
use crate::platform::creation::EventCreationManager;
use crate::platform::event::{ConsensusRound, Event, SignedState, StateAndRound};
use crate::platform::gossip::GossipWiring;
use crate::platform::intake::{
    EventDeduplicator, EventSignatureValidator, InternalEventValidator, OrphanBuffer,
};
use crate::platform::pces::RoundDurabilityBuffer;
use crate::platform::prehandler::TransactionPrehandler;
use crate::platform::state::{StateHasher, StateSignatureCollector};

/// Clear-command wires the coordinator injects in phase 4.
pub(crate) struct ClearWires {
    pub(crate) deduplicator: InputWire<()>,
    pub(crate) orphan_buffer: InputWire<()>,
    pub(crate) gossip: InputWire<()>,
    pub(crate) state_signature_collector: InputWire<()>,
    pub(crate) event_creation_manager: InputWire<()>,
    pub(crate) round_durability_buffer: InputWire<()>,
}

/// Coordinates flushing and clearing of the platform wiring.
pub struct PlatformCoordinator {
    /// Counter spanning the event hasher and the post-hash collector; the
    /// pair cannot be flushed independently, so the coordinator waits on
    /// the shared counter instead.
    pub(crate) hashing_counter: Arc<dyn Counter>,
    pub(crate) internal_event_validator: ComponentWiring<InternalEventValidator, Event>,
    pub(crate) event_deduplicator: ComponentWiring<EventDeduplicator, Event>,
    pub(crate) event_signature_validator: ComponentWiring<EventSignatureValidator, Event>,
    pub(crate) orphan_buffer: ComponentWiring<OrphanBuffer, Vec<Event>>,
    pub(crate) gossip: GossipWiring,
    pub(crate) consensus_engine: ComponentWiring<ConsensusEngine, Vec<ConsensusRound>>,
    pub(crate) event_creation_manager: ComponentWiring<EventCreationManager, Event>,
    pub(crate) transaction_prehandler: ComponentWiring<TransactionPrehandler, ()>,
    pub(crate) state_signature_collector:
        ComponentWiring<StateSignatureCollector, Vec<Reserved<SignedState>>>,
    pub(crate) consensus_round_handler: ComponentWiring<ConsensusRoundHandler, StateAndRound>,
    pub(crate) round_durability_buffer:
        ComponentWiring<RoundDurabilityBuffer, Vec<ConsensusRound>>,
    pub(crate) state_hasher: ComponentWiring<StateHasher, StateAndRound>,
    pub(crate) clear_wires: ClearWires,
}

impl PlatformCoordinator {
    /// Flushes the intake pipeline. Afterwards no work remains ahead of the
    /// consensus engine, provided nothing new is injected and the orphan
    /// buffer has released everything it is going to release.
    pub async fn flush_intake_pipeline(&self) -> Result<(), WireError> {
        // The hasher and the post-hash collector share one counter and
        // cannot be flushed independently; waiting until the shared counter
        // is empty flushes both.
        self.hashing_counter.wait_until_empty().await;

        self.internal_event_validator.flush().await?;
        self.event_deduplicator.flush().await?;
        self.event_signature_validator.flush().await?;
        self.orphan_buffer.flush().await?;
        self.gossip.flush().await?;
        self.consensus_engine.flush().await?;
        self.transaction_prehandler.flush().await?;
        self.event_creation_manager.flush().await?;
        Ok(())
    }

    /// Safely clears the system in preparation for reconnect. When this
    /// returns, no task sits in any queue and the stateful components have
    /// reset their internal state.
    pub async fn clear(&self) -> Result<(), WireError> {
        // Phase 1: squelch.
        // Break the cycles. Flush each squelched component in case a task
        // was already executing when squelch was activated.
        self.consensus_engine.start_squelching()?;
        self.consensus_engine.flush().await?;
        self.event_creation_manager.start_squelching()?;
        self.event_creation_manager.flush().await?;

        // Squelching the round handler is not needed to stop dataflow, but
        // it keeps the handler from wasting time on rounds that are about
        // to be discarded anyway.
        self.consensus_round_handler.start_squelching()?;
        self.consensus_round_handler.flush().await?;

        // Phase 2: flush.
        // The cycles are broken, so everything drains.
        self.flush_intake_pipeline().await?;
        self.state_hasher.flush().await?;
        self.state_signature_collector.flush().await?;
        self.round_durability_buffer.flush().await?;
        self.consensus_round_handler.flush().await?;

        // Phase 3: stop squelching.
        self.consensus_engine.stop_squelching()?;
        self.event_creation_manager.stop_squelching()?;
        self.consensus_round_handler.stop_squelching()?;

        // Phase 4: clear.
        // Data is no longer moving; reset the stateful components. The
        // trailing flushes make the resets synchronous with this call.
        self.clear_wires.deduplicator.inject(()).await;
        self.clear_wires.orphan_buffer.inject(()).await;
        self.clear_wires.gossip.inject(()).await;
        self.clear_wires.state_signature_collector.inject(()).await;
        self.clear_wires.event_creation_manager.inject(()).await;
        self.clear_wires.round_durability_buffer.inject(()).await;

        self.event_deduplicator.flush().await?;
        self.orphan_buffer.flush().await?;
        self.gossip.flush().await?;
        self.state_signature_collector.flush().await?;
        self.event_creation_manager.flush().await?;
        self.round_durability_buffer.flush().await?;
        Ok(())
    }
}
