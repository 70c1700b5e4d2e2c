//! # Platform wiring.
//!
//! Assembles the whole pipeline graph. Construction happens in three steps,
//! mirroring the component binding rules: build schedulers and wires (no
//! instances yet), solder the graph, then [`bind`](PlatformWiring::bind) the
//! component instances. `start()` validates and runs the model.
//!
//! ```text
//! gossip ──► hasher ═╗ shared counter ╔═ postHashCollector ──► internalValidator
//!                    ╚════════════════╝
//!   ──► deduplicator ──► signatureValidator ──► orphanBuffer ──┬─► pcesSequencer ─┬─► pcesWriter
//!                                                              │                  └─► consensusEngine
//!                                                              ├─► eventCreation (register)
//!                                                              ├─► gossip (INJECT, redistribute)
//!                                                              ├─► prehandler, publisher
//!                                                              └─► preconsensus sigs ──► collector
//!
//! consensusEngine ══ ordered ══► [keystoneSequence ──► writer.flushRequest, durabilityBuffer]
//! writer.latestDurable ─(INJECT)─► durabilityBuffer ──► roundHandler ──► nexus / stateHasher
//! stateHasher ──► consensus sigs / state ──► collector ──► reserver ──► saver + complete ──► nexus
//! eventWindowManager ─(INJECT)─► dedup, sigVal, orphan, gossip, writer, eventCreation
//! ```

use std::sync::Arc;

use tracing::info;

use crate::components::{ComponentWiring, PassThroughWiring};
use crate::config::SchedulersConfig;
use crate::counters::{BackpressureCounter, Counter};
use crate::error::{BuildError, WireError};
use crate::model::WiringModel;
use crate::reservation::Reserved;
use crate::schedulers::SchedulerKind;
use crate::transformers::WireTransformer;
use crate::wires::{InputWire, SolderKind};

use crate::platform::consensus::{ConsensusEngine, ConsensusRoundHandler};
use crate::platform::coordinator::{ClearWires, PlatformCoordinator};
use crate::platform::creation::{EventCreationManager, SelfEventSigner};
use crate::platform::event::{
    ConsensusRound, ConsensusSnapshot, Event, EventWindow, NodeId, SignedState, StateAndRound,
    StateSignature,
};
use crate::platform::gossip::{Gossip, GossipWiring, InMemoryGossip};
use crate::platform::intake::{
    DigestSigner, EventDeduplicator, EventHasher, EventSignatureValidator, InternalEventValidator,
    OrphanBuffer,
};
use crate::platform::pces::{
    DurableSequence, PcesReplayerWiring, PcesSequencer, PcesWriter, RoundDurabilityBuffer,
};
use crate::platform::prehandler::TransactionPrehandler;
use crate::platform::publisher::PlatformPublisher;
use crate::platform::state::{
    LatestCompleteStateNexus, LatestImmutableStateNexus, StateHasher, StateReserver, StateSaver,
    StateSignatureCollector,
};
use crate::platform::window::EventWindowManager;

/// The component instances bound into the wiring.
pub struct PlatformComponents {
    pub event_hasher: EventHasher,
    pub internal_event_validator: InternalEventValidator,
    pub event_deduplicator: EventDeduplicator,
    pub event_signature_validator: EventSignatureValidator,
    pub orphan_buffer: OrphanBuffer,
    pub pces_sequencer: PcesSequencer,
    pub pces_writer: PcesWriter,
    pub round_durability_buffer: RoundDurabilityBuffer,
    pub consensus_engine: ConsensusEngine,
    pub event_creation_manager: EventCreationManager,
    pub self_event_signer: SelfEventSigner,
    pub transaction_prehandler: TransactionPrehandler,
    pub state_signature_collector: StateSignatureCollector,
    pub state_hasher: StateHasher,
    pub state_saver: StateSaver,
    pub consensus_round_handler: ConsensusRoundHandler,
    pub event_window_manager: EventWindowManager,
    pub latest_immutable_state_nexus: LatestImmutableStateNexus,
    pub latest_complete_state_nexus: LatestCompleteStateNexus,
    pub platform_publisher: PlatformPublisher,
    pub gossip: Box<dyn Gossip>,
    /// Watermark shared by the PCES writer and the round handler.
    pub durable_sequence: Arc<DurableSequence>,
}

impl PlatformComponents {
    /// A coherent default set for the given node, wiring the writer and the
    /// round handler to one shared durable-sequence watermark.
    pub fn defaults(self_id: NodeId, config: &SchedulersConfig) -> Self {
        let durable_sequence = Arc::new(DurableSequence::new());
        Self {
            event_hasher: EventHasher,
            internal_event_validator: InternalEventValidator,
            event_deduplicator: EventDeduplicator::new(config.ancient_mode),
            event_signature_validator: EventSignatureValidator::new(
                Arc::new(DigestSigner),
                config.ancient_mode,
                config.force_ignore_pces_signatures,
            ),
            orphan_buffer: OrphanBuffer::new(config.ancient_mode),
            pces_sequencer: PcesSequencer::new(),
            pces_writer: PcesWriter::new(Arc::clone(&durable_sequence)),
            round_durability_buffer: RoundDurabilityBuffer::new(
                config.suspicious_round_durability_duration,
            ),
            consensus_engine: ConsensusEngine::new(
                config.ancient_mode,
                config.consensus_round_batch,
                config.ancient_round_depth,
            ),
            event_creation_manager: EventCreationManager::new(self_id, config.ancient_mode),
            self_event_signer: SelfEventSigner::new(Arc::new(DigestSigner)),
            transaction_prehandler: TransactionPrehandler::new(),
            state_signature_collector: StateSignatureCollector::new(),
            state_hasher: StateHasher,
            state_saver: StateSaver::new(),
            consensus_round_handler: ConsensusRoundHandler::new(
                Arc::clone(&durable_sequence),
                config.state_signature_threshold,
            ),
            event_window_manager: EventWindowManager,
            latest_immutable_state_nexus: LatestImmutableStateNexus::new(
                config.validate_initial_state,
            ),
            latest_complete_state_nexus: LatestCompleteStateNexus::new(),
            platform_publisher: PlatformPublisher,
            gossip: Box::new(InMemoryGossip::new()),
            durable_sequence,
        }
    }
}

/// Encapsulates the wiring of the whole platform.
pub struct PlatformWiring {
    model: WiringModel,
    coordinator: PlatformCoordinator,

    event_hasher: ComponentWiring<EventHasher, Event>,
    internal_event_validator: ComponentWiring<InternalEventValidator, Event>,
    event_deduplicator: ComponentWiring<EventDeduplicator, Event>,
    event_signature_validator: ComponentWiring<EventSignatureValidator, Event>,
    orphan_buffer: ComponentWiring<OrphanBuffer, Vec<Event>>,
    pces_sequencer: ComponentWiring<PcesSequencer, Event>,
    pces_writer: ComponentWiring<PcesWriter, u64>,
    round_durability_buffer: ComponentWiring<RoundDurabilityBuffer, Vec<ConsensusRound>>,
    consensus_engine: ComponentWiring<ConsensusEngine, Vec<ConsensusRound>>,
    event_creation_manager: ComponentWiring<EventCreationManager, Event>,
    self_event_signer: ComponentWiring<SelfEventSigner, Event>,
    transaction_prehandler: ComponentWiring<TransactionPrehandler, ()>,
    state_signature_collector: ComponentWiring<StateSignatureCollector, Vec<Reserved<SignedState>>>,
    state_hasher: ComponentWiring<StateHasher, StateAndRound>,
    state_saver: ComponentWiring<StateSaver, ()>,
    consensus_round_handler: ComponentWiring<ConsensusRoundHandler, StateAndRound>,
    event_window_manager: ComponentWiring<EventWindowManager, EventWindow>,
    latest_immutable_state_nexus: ComponentWiring<LatestImmutableStateNexus, ()>,
    latest_complete_state_nexus: ComponentWiring<LatestCompleteStateNexus, ()>,
    platform_publisher: ComponentWiring<PlatformPublisher, ()>,
    gossip: GossipWiring,
    pces_replayer: PcesReplayerWiring,

    // Wires used after construction; identity is stable because they are
    // created once, here.
    window_update_input: InputWire<EventWindow>,
    snapshot_input: InputWire<ConsensusSnapshot>,
    minimum_ancient_input: InputWire<u64>,
    immutable_override_input: InputWire<Reserved<SignedState>>,
    replay_input: InputWire<Vec<Event>>,
    hashing_counter: Arc<dyn Counter>,
}

impl PlatformWiring {
    /// Builds every scheduler and solders the full graph. Components are
    /// supplied later via [`bind`](PlatformWiring::bind).
    pub fn new(model: WiringModel, config: &SchedulersConfig) -> Self {
        // This counter spans the event hasher and the post-hash collector:
        // the hasher on-ramps it, the collector off-ramps it. That is what
        // lets the coordinator flush the pair as one unit, and it applies
        // the intake backpressure at the pipeline's mouth.
        let hashing_counter: Arc<dyn Counter> = Arc::new(BackpressureCounter::new(
            "hashingCounter",
            config.event_hasher_unhandled_capacity,
            config.backpressure_park_interval,
        ));

        let event_hasher = ComponentWiring::with_scheduler(
            model
                .scheduler_builder("eventHasher")
                .with_kind(SchedulerKind::Concurrent)
                .with_on_ramp(Arc::clone(&hashing_counter))
                .with_hyperlink("docs/components/event-hasher.md")
                .build::<Event>(),
        );
        let post_hash_collector = PassThroughWiring::new(
            model
                .scheduler_builder("postHashCollector")
                .with_kind(SchedulerKind::Sequential)
                .with_off_ramp(Arc::clone(&hashing_counter))
                .build::<Event>(),
        );

        let internal_event_validator: ComponentWiring<InternalEventValidator, Event> =
            ComponentWiring::new(&model, "internalEventValidator", &config.internal_event_validator);
        let event_deduplicator: ComponentWiring<EventDeduplicator, Event> =
            ComponentWiring::new(&model, "eventDeduplicator", &config.event_deduplicator);
        let event_signature_validator: ComponentWiring<EventSignatureValidator, Event> =
            ComponentWiring::new(&model, "eventSignatureValidator", &config.event_signature_validator);
        let orphan_buffer: ComponentWiring<OrphanBuffer, Vec<Event>> =
            ComponentWiring::new(&model, "orphanBuffer", &config.orphan_buffer);
        let pces_sequencer: ComponentWiring<PcesSequencer, Event> =
            ComponentWiring::new(&model, "pcesSequencer", &config.pces_sequencer);
        let pces_writer: ComponentWiring<PcesWriter, u64> =
            ComponentWiring::new(&model, "pcesWriter", &config.pces_writer);
        let round_durability_buffer: ComponentWiring<RoundDurabilityBuffer, Vec<ConsensusRound>> =
            ComponentWiring::new(&model, "roundDurabilityBuffer", &config.round_durability_buffer);
        let consensus_engine: ComponentWiring<ConsensusEngine, Vec<ConsensusRound>> =
            ComponentWiring::new(&model, "consensusEngine", &config.consensus_engine);
        let event_creation_manager: ComponentWiring<EventCreationManager, Event> =
            ComponentWiring::new(&model, "eventCreationManager", &config.event_creation_manager);
        let self_event_signer: ComponentWiring<SelfEventSigner, Event> =
            ComponentWiring::new(&model, "selfEventSigner", &config.self_event_signer);
        let transaction_prehandler: ComponentWiring<TransactionPrehandler, ()> =
            ComponentWiring::new(&model, "transactionPrehandler", &config.transaction_prehandler);
        let state_signature_collector: ComponentWiring<
            StateSignatureCollector,
            Vec<Reserved<SignedState>>,
        > = ComponentWiring::new(&model, "stateSignatureCollector", &config.state_signature_collector);
        let state_hasher: ComponentWiring<StateHasher, StateAndRound> =
            ComponentWiring::new(&model, "stateHasher", &config.state_hasher);
        let state_saver: ComponentWiring<StateSaver, ()> =
            ComponentWiring::new(&model, "stateSaver", &config.state_saver);
        let consensus_round_handler: ComponentWiring<ConsensusRoundHandler, StateAndRound> =
            ComponentWiring::new(&model, "consensusRoundHandler", &config.consensus_round_handler);

        let direct_threadsafe = crate::config::SchedulerConfig::direct_threadsafe();
        let event_window_manager: ComponentWiring<EventWindowManager, EventWindow> =
            ComponentWiring::new(&model, "eventWindowManager", &direct_threadsafe);
        let latest_immutable_state_nexus: ComponentWiring<LatestImmutableStateNexus, ()> =
            ComponentWiring::new(&model, "latestImmutableStateNexus", &direct_threadsafe);
        let latest_complete_state_nexus: ComponentWiring<LatestCompleteStateNexus, ()> =
            ComponentWiring::new(&model, "latestCompleteStateNexus", &direct_threadsafe);

        let platform_publisher: ComponentWiring<PlatformPublisher, ()> =
            ComponentWiring::new(&model, "platformPublisher", &config.platform_publisher);

        let gossip = GossipWiring::new(&model, &config.gossip);
        let pces_replayer = PcesReplayerWiring::new(&model, &config.pces_replayer);

        // --- input wires ---

        let hasher_input =
            event_hasher.shared_input_wire("hashEvent", |hasher: &EventHasher, event| {
                hasher.hash_event(event)
            });
        let validate_input =
            internal_event_validator.input_wire("validateEvent", InternalEventValidator::validate_event);
        let dedup_input =
            event_deduplicator.input_wire("handleEvent", EventDeduplicator::handle_event);
        let dedup_window_input = event_deduplicator.input_wire("setEventWindow", |d, window| {
            d.set_event_window(window);
            None
        });
        let dedup_clear_input = event_deduplicator.input_wire("clear", |d, _: ()| {
            d.clear();
            None
        });
        let signature_input = event_signature_validator
            .input_wire("validateSignature", EventSignatureValidator::validate_signature);
        let signature_window_input =
            event_signature_validator.input_wire("setEventWindow", |v, window| {
                v.set_event_window(window);
                None
            });
        let orphan_input = orphan_buffer.input_wire("handleEvent", OrphanBuffer::handle_event);
        let orphan_window_input =
            orphan_buffer.input_wire("setEventWindow", OrphanBuffer::set_event_window);
        let orphan_clear_input = orphan_buffer.input_wire("clear", |b, _: ()| {
            b.clear();
            None
        });
        let sequencer_input = pces_sequencer
            .input_wire("assignStreamSequenceNumber", PcesSequencer::assign_stream_sequence_number);
        let writer_event_input = pces_writer.input_wire("writeEvent", PcesWriter::write_event);
        let writer_flush_input =
            pces_writer.input_wire("submitFlushRequest", PcesWriter::submit_flush_request);
        let writer_begin_streaming_input =
            pces_writer.input_wire("beginStreamingNewEvents", |w, _: ()| {
                w.begin_streaming_new_events()
            });
        let minimum_ancient_input = pces_writer.input_wire(
            "setMinimumAncientIdentifierToStore",
            PcesWriter::set_minimum_ancient_identifier_to_store,
        );
        let writer_boundary_input = pces_writer
            .input_wire("updateNonAncientEventBoundary", PcesWriter::update_non_ancient_event_boundary);
        let durability_round_input =
            round_durability_buffer.input_wire("addRound", RoundDurabilityBuffer::add_round);
        let durability_sequence_input = round_durability_buffer.input_wire(
            "setLatestDurableSequenceNumber",
            RoundDurabilityBuffer::set_latest_durable_sequence_number,
        );
        let durability_stale_input = round_durability_buffer
            .input_wire("checkForStaleRounds", RoundDurabilityBuffer::check_for_stale_rounds);
        let durability_clear_input = round_durability_buffer.input_wire("clear", |b, _: ()| {
            b.clear();
            None
        });
        let engine_event_input = consensus_engine.input_wire("addEvent", ConsensusEngine::add_event);
        let snapshot_input = consensus_engine
            .input_wire("outOfBandSnapshotUpdate", ConsensusEngine::out_of_band_snapshot_update);
        let creation_register_input =
            event_creation_manager.input_wire("registerEvent", EventCreationManager::register_event);
        let creation_attempt_input = event_creation_manager
            .input_wire("maybeCreateEvent", EventCreationManager::maybe_create_event);
        let creation_window_input = event_creation_manager
            .input_wire("setEventWindow", EventCreationManager::set_event_window);
        let creation_clear_input = event_creation_manager.input_wire("clear", |m, _: ()| {
            m.clear();
            None
        });
        let signer_input = self_event_signer.input_wire("signEvent", SelfEventSigner::sign_event);
        let prehandler_input = transaction_prehandler.shared_input_wire(
            "prehandleApplicationTransactions",
            |p: &TransactionPrehandler, event| p.prehandle_application_transactions(event),
        );
        let collector_pre_input = state_signature_collector.input_wire(
            "handlePreconsensusSignatures",
            StateSignatureCollector::handle_preconsensus_signatures,
        );
        let collector_post_input = state_signature_collector.input_wire(
            "handlePostconsensusSignatures",
            StateSignatureCollector::handle_postconsensus_signatures,
        );
        let collector_state_input = state_signature_collector
            .input_wire("addReservedState", StateSignatureCollector::add_reserved_state);
        let collector_clear_input = state_signature_collector.input_wire("clear", |c, _: ()| {
            c.clear();
            None
        });
        let state_hasher_input = state_hasher.input_wire("hashState", StateHasher::hash_state);
        let saver_input = state_saver.input_wire("saveState", StateSaver::save_state);
        let round_handler_input =
            consensus_round_handler.input_wire("handleRound", ConsensusRoundHandler::handle_round);
        let window_extract_input = event_window_manager
            .input_wire("extractEventWindow", EventWindowManager::extract_event_window);
        let window_update_input = event_window_manager
            .input_wire("updateEventWindow", EventWindowManager::update_event_window);
        let immutable_state_input = latest_immutable_state_nexus
            .input_wire("setState", LatestImmutableStateNexus::set_state);
        let immutable_override_input = latest_immutable_state_nexus
            .input_wire("overrideState", LatestImmutableStateNexus::override_state);
        let complete_state_input = latest_complete_state_nexus
            .input_wire("setStateIfNewer", LatestCompleteStateNexus::set_state_if_newer);
        let complete_window_input = latest_complete_state_nexus
            .input_wire("updateEventWindow", LatestCompleteStateNexus::update_event_window);
        let publisher_input = platform_publisher
            .input_wire("publishPreconsensusEvent", PlatformPublisher::publish_preconsensus_event);

        // --- solder the graph ---

        gossip.event_output().solder_to(&hasher_input, SolderKind::Default);
        pces_replayer
            .event_output()
            .solder_to(&hasher_input, SolderKind::Default);
        event_hasher
            .output_wire()
            .solder_to(&post_hash_collector.input_wire(), SolderKind::Default);
        post_hash_collector
            .output_wire()
            .solder_to(&validate_input, SolderKind::Default);
        internal_event_validator
            .output_wire()
            .solder_to(&dedup_input, SolderKind::Default);
        event_deduplicator
            .output_wire()
            .solder_to(&signature_input, SolderKind::Default);
        event_signature_validator
            .output_wire()
            .solder_to(&orphan_input, SolderKind::Default);

        let orphan_events = orphan_buffer.output_wire().build_splitter("orphanBufferSplitter");
        orphan_events.solder_to(&sequencer_input, SolderKind::Default);
        pces_sequencer
            .output_wire()
            .solder_to(&writer_event_input, SolderKind::Default);
        pces_sequencer
            .output_wire()
            .solder_to(&engine_event_input, SolderKind::Default);
        orphan_events.solder_to(&creation_register_input, SolderKind::Default);
        // Must inject to avoid cyclical backpressure through gossip.
        orphan_events.solder_to(&gossip.event_input(), SolderKind::Inject);
        orphan_events.solder_to(&prehandler_input, SolderKind::Default);
        orphan_events.solder_to(&publisher_input, SolderKind::Default);

        let preconsensus_signatures = orphan_events.build_transformer(
            "extractPreconsensusSignatures",
            |event: Event| {
                let signatures: Vec<StateSignature> = event.system_signatures().to_vec();
                if signatures.is_empty() {
                    None
                } else {
                    Some(signatures)
                }
            },
        );
        preconsensus_signatures.solder_to(&collector_pre_input, SolderKind::Default);

        // Event creation loop. Self events re-enter validation on an INJECT
        // edge: the creation cycle must not apply backpressure to itself.
        model
            .heartbeat(config.event_creation_heartbeat_period)
            .solder_to(&creation_attempt_input, SolderKind::Default);
        event_creation_manager
            .output_wire()
            .solder_to(&signer_input, SolderKind::Default);
        self_event_signer
            .output_wire()
            .solder_to(&validate_input, SolderKind::Inject);

        // The keystone flush request must be soldered ahead of the round
        // durability buffer: with the round handler's queue full, the buffer
        // blocks, and if the flush request were behind it the writer would
        // never learn it has to flush, and the keystone would *never* become
        // durable. The ordered solder is the deadlock break.
        let keystone_sequence = WireTransformer::new(
            &model,
            "keystoneEventSequence",
            |round: ConsensusRound| round.keystone_sequence(),
        );
        keystone_sequence
            .output_wire()
            .solder_to(&writer_flush_input, SolderKind::Default);

        let consensus_rounds = consensus_engine
            .output_wire()
            .build_splitter("consensusEngineSplitter");
        consensus_rounds
            .ordered_solder_to(&[&keystone_sequence.input_wire(), &durability_round_input]);
        consensus_rounds.solder_to(&window_extract_input, SolderKind::Default);

        let released_rounds = round_durability_buffer
            .output_wire()
            .build_splitter("roundDurabilitySplitter");
        released_rounds.solder_to(&round_handler_input, SolderKind::Default);

        // Durability notices feed back against the dataflow direction.
        pces_writer
            .output_wire()
            .solder_to(&durability_sequence_input, SolderKind::Inject);
        model
            .heartbeat(config.round_durability_heartbeat_period)
            .solder_to(&durability_stale_input, SolderKind::Default);

        // Event window fan-out; all INJECT, the window feedback is cyclic.
        let windows = event_window_manager.output_wire();
        windows.solder_to(&dedup_window_input, SolderKind::Inject);
        windows.solder_to(&signature_window_input, SolderKind::Inject);
        windows.solder_to(&orphan_window_input, SolderKind::Inject);
        windows.solder_to(&gossip.window_input(), SolderKind::Inject);
        windows.solder_to(&writer_boundary_input, SolderKind::Inject);
        windows.solder_to(&creation_window_input, SolderKind::Inject);
        windows.solder_to(&complete_window_input, SolderKind::Default);

        // State side.
        consensus_round_handler
            .output_wire()
            .solder_to(&immutable_state_input, SolderKind::Default);
        consensus_round_handler
            .output_wire()
            .solder_to(&state_hasher_input, SolderKind::Default);

        let hashed_states = state_hasher.output_wire();
        let postconsensus_signatures = hashed_states.build_transformer(
            "extractConsensusSignatures",
            |state_and_round: StateAndRound| {
                let signatures: Vec<StateSignature> = state_and_round
                    .round
                    .events
                    .iter()
                    .flat_map(|event| event.system_signatures().iter().cloned())
                    .collect();
                if signatures.is_empty() {
                    None
                } else {
                    Some(signatures)
                }
            },
        );
        postconsensus_signatures.solder_to(&collector_post_input, SolderKind::Default);
        let hashed_state_only = hashed_states.build_transformer(
            "stateFromStateAndRound",
            |state_and_round: StateAndRound| Some(state_and_round.state),
        );
        hashed_state_only.solder_to(&collector_state_input, SolderKind::Default);

        let collected_states = state_signature_collector
            .output_wire()
            .build_splitter("reservedStateSplitter");
        let all_states = collected_states
            .build_advanced_transformer("allStatesReserver", StateReserver::new("allStatesReserver"));
        all_states.solder_to(&saver_input, SolderKind::Default);
        let complete_states = all_states
            .build_filter("completeStateFilter", |state: &Reserved<SignedState>| {
                state.is_complete()
            })
            .build_advanced_transformer(
                "completeStatesReserver",
                StateReserver::new("completeStatesReserver"),
            );
        complete_states.solder_to(&complete_state_input, SolderKind::Default);

        // Replay handoff: when the recorded stream ends, the writer starts
        // treating writes as live.
        pces_replayer
            .done_output()
            .solder_to(&writer_begin_streaming_input, SolderKind::Default);

        let replay_input = pces_replayer.replay_input();

        let coordinator = PlatformCoordinator {
            hashing_counter: Arc::clone(&hashing_counter),
            internal_event_validator: internal_event_validator.clone(),
            event_deduplicator: event_deduplicator.clone(),
            event_signature_validator: event_signature_validator.clone(),
            orphan_buffer: orphan_buffer.clone(),
            gossip: gossip.clone(),
            consensus_engine: consensus_engine.clone(),
            event_creation_manager: event_creation_manager.clone(),
            transaction_prehandler: transaction_prehandler.clone(),
            state_signature_collector: state_signature_collector.clone(),
            consensus_round_handler: consensus_round_handler.clone(),
            round_durability_buffer: round_durability_buffer.clone(),
            state_hasher: state_hasher.clone(),
            clear_wires: ClearWires {
                deduplicator: dedup_clear_input,
                orphan_buffer: orphan_clear_input,
                gossip: gossip.clear_input(),
                state_signature_collector: collector_clear_input,
                event_creation_manager: creation_clear_input,
                round_durability_buffer: durability_clear_input,
            },
        };

        Self {
            model,
            coordinator,
            event_hasher,
            internal_event_validator,
            event_deduplicator,
            event_signature_validator,
            orphan_buffer,
            pces_sequencer,
            pces_writer,
            round_durability_buffer,
            consensus_engine,
            event_creation_manager,
            self_event_signer,
            transaction_prehandler,
            state_signature_collector,
            state_hasher,
            state_saver,
            consensus_round_handler,
            event_window_manager,
            latest_immutable_state_nexus,
            latest_complete_state_nexus,
            platform_publisher,
            gossip,
            pces_replayer,
            window_update_input,
            snapshot_input,
            minimum_ancient_input,
            immutable_override_input,
            replay_input,
            hashing_counter,
        }
    }

    /// Binds the component instances to the wiring.
    pub fn bind(&self, components: PlatformComponents) {
        self.event_hasher.bind(components.event_hasher);
        self.internal_event_validator
            .bind(components.internal_event_validator);
        self.event_deduplicator.bind(components.event_deduplicator);
        self.event_signature_validator
            .bind(components.event_signature_validator);
        self.orphan_buffer.bind(components.orphan_buffer);
        self.pces_sequencer.bind(components.pces_sequencer);
        self.pces_writer.bind(components.pces_writer);
        self.round_durability_buffer
            .bind(components.round_durability_buffer);
        self.consensus_engine.bind(components.consensus_engine);
        self.event_creation_manager
            .bind(components.event_creation_manager);
        self.self_event_signer.bind(components.self_event_signer);
        self.transaction_prehandler
            .bind(components.transaction_prehandler);
        self.state_signature_collector
            .bind(components.state_signature_collector);
        self.state_hasher.bind(components.state_hasher);
        self.state_saver.bind(components.state_saver);
        self.consensus_round_handler
            .bind(components.consensus_round_handler);
        self.event_window_manager
            .bind(components.event_window_manager);
        self.latest_immutable_state_nexus
            .bind(components.latest_immutable_state_nexus);
        self.latest_complete_state_nexus
            .bind(components.latest_complete_state_nexus);
        self.platform_publisher.bind(components.platform_publisher);
        self.gossip.bind(components.gossip);
    }

    /// Validates the graph and starts the model, logging the diagram.
    pub fn start(&self) -> Result<(), BuildError> {
        self.model.start()?;
        info!("wiring diagram:\n{}", self.model.diagram());
        Ok(())
    }

    /// Stops the model.
    pub fn stop(&self) {
        self.model.stop();
    }

    /// The wiring model.
    pub fn model(&self) -> &WiringModel {
        &self.model
    }

    /// Submits an event received from the network into the pipeline.
    pub async fn submit_event(&self, event: Event) {
        self.gossip.emitter().forward(event).await;
    }

    /// Replays a recorded preconsensus stream into the pipeline.
    pub async fn replay_pces(&self, events: Vec<Event>) {
        self.replay_input.put(events).await;
    }

    /// Starts gossiping.
    pub async fn start_gossip(&self) {
        self.gossip.start_input().inject(()).await;
    }

    /// Stops gossiping, permanently.
    pub async fn stop_gossip(&self) {
        self.gossip.stop_input().inject(()).await;
    }

    /// Injects a new event window into every component that needs it.
    pub async fn update_event_window(&self, window: EventWindow) {
        self.window_update_input.inject(window).await;
        // Gossip accesses shared structures asynchronously; make sure it has
        // fully ingested the new window before continuing.
        let _ = self.gossip.flush().await;
    }

    /// Injects a consensus snapshot at restart/reconnect boundaries.
    pub async fn consensus_snapshot_override(&self, snapshot: ConsensusSnapshot) {
        self.snapshot_input.inject(snapshot).await;
    }

    /// Raises the floor of events the PCES writer keeps on disk.
    pub async fn set_minimum_ancient_identifier_to_store(&self, identifier: u64) {
        self.minimum_ancient_input.inject(identifier).await;
    }

    /// Installs a state loaded from outside (startup or reconnect).
    pub async fn load_initial_state(&self, state: Reserved<SignedState>) {
        self.immutable_override_input.inject(state).await;
    }

    /// Number of unprocessed tasks at the mouth of the intake pipeline, for
    /// backpressure-aware callers.
    pub fn intake_queue_size(&self) -> u64 {
        self.hashing_counter.count()
    }

    /// Flushes the intake pipeline.
    pub async fn flush_intake_pipeline(&self) -> Result<(), WireError> {
        self.coordinator.flush_intake_pipeline().await
    }

    /// Clears the pipeline in preparation for reconnect.
    pub async fn clear(&self) -> Result<(), WireError> {
        self.coordinator.clear().await
    }
}
