//! # Domain types flowing through the pipeline.
//!
//! [`Event`] is immutable except for three fields filled in by specific
//! pipeline stages: the hash (event hasher), the signature (self-event
//! signer, for self events), and the stream sequence number (PCES
//! sequencer). Events clone cheaply; the payload and metadata live behind
//! one `Arc`.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, OnceLock};

use bytes::Bytes;
use parking_lot::Mutex;

use crate::config::AncientMode;
use crate::reservation::Reserved;

/// Identifier of a node in the network.
pub type NodeId = u64;

/// A 32-byte hash identifying an event or a state.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventHash([u8; 32]);

impl EventHash {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Debug for EventHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for byte in &self.0[..4] {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Compact reference to another event: enough to locate it and to classify
/// it as ancient without holding the event itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EventDescriptor {
    pub hash: EventHash,
    pub creator: NodeId,
    pub generation: u64,
    pub birth_round: u64,
}

impl EventDescriptor {
    /// The value compared against ancient thresholds under the given mode.
    pub fn ancient_indicator(&self, mode: AncientMode) -> u64 {
        match mode {
            AncientMode::GenerationThreshold => self.generation,
            AncientMode::BirthRoundThreshold => self.birth_round,
        }
    }
}

/// A state signature carried inside an event's system transactions.
#[derive(Clone, Debug)]
pub struct StateSignature {
    pub round: u64,
    pub signer: NodeId,
    pub signature: Bytes,
}

const NO_STREAM_SEQUENCE: i64 = -1;

struct EventInner {
    creator: NodeId,
    generation: u64,
    birth_round: u64,
    self_parent: Option<EventDescriptor>,
    other_parents: Vec<EventDescriptor>,
    payload: Bytes,
    system_signatures: Vec<StateSignature>,
    hash: OnceLock<EventHash>,
    signature: OnceLock<Bytes>,
    stream_sequence: AtomicI64,
}

/// An event moving through the intake pipeline. Cheap to clone.
#[derive(Clone)]
pub struct Event {
    inner: Arc<EventInner>,
}

/// Fluent construction of an [`Event`].
pub struct EventBuilder {
    creator: NodeId,
    generation: u64,
    birth_round: u64,
    self_parent: Option<EventDescriptor>,
    other_parents: Vec<EventDescriptor>,
    payload: Bytes,
    system_signatures: Vec<StateSignature>,
}

impl EventBuilder {
    pub fn with_generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }

    pub fn with_birth_round(mut self, birth_round: u64) -> Self {
        self.birth_round = birth_round;
        self
    }

    pub fn with_self_parent(mut self, parent: EventDescriptor) -> Self {
        self.self_parent = Some(parent);
        self
    }

    pub fn with_other_parent(mut self, parent: EventDescriptor) -> Self {
        self.other_parents.push(parent);
        self
    }

    pub fn with_payload(mut self, payload: Bytes) -> Self {
        self.payload = payload;
        self
    }

    pub fn with_state_signature(mut self, signature: StateSignature) -> Self {
        self.system_signatures.push(signature);
        self
    }

    pub fn build(self) -> Event {
        Event {
            inner: Arc::new(EventInner {
                creator: self.creator,
                generation: self.generation,
                birth_round: self.birth_round,
                self_parent: self.self_parent,
                other_parents: self.other_parents,
                payload: self.payload,
                system_signatures: self.system_signatures,
                hash: OnceLock::new(),
                signature: OnceLock::new(),
                stream_sequence: AtomicI64::new(NO_STREAM_SEQUENCE),
            }),
        }
    }
}

impl Event {
    /// Starts building an event created by the given node.
    pub fn builder(creator: NodeId) -> EventBuilder {
        EventBuilder {
            creator,
            generation: 0,
            birth_round: 0,
            self_parent: None,
            other_parents: Vec::new(),
            payload: Bytes::new(),
            system_signatures: Vec::new(),
        }
    }

    pub fn creator(&self) -> NodeId {
        self.inner.creator
    }

    pub fn generation(&self) -> u64 {
        self.inner.generation
    }

    pub fn birth_round(&self) -> u64 {
        self.inner.birth_round
    }

    pub fn self_parent(&self) -> Option<&EventDescriptor> {
        self.inner.self_parent.as_ref()
    }

    pub fn other_parents(&self) -> &[EventDescriptor] {
        &self.inner.other_parents
    }

    /// All parent descriptors, self parent first.
    pub fn parents(&self) -> impl Iterator<Item = &EventDescriptor> {
        self.inner
            .self_parent
            .iter()
            .chain(self.inner.other_parents.iter())
    }

    pub fn payload(&self) -> &Bytes {
        &self.inner.payload
    }

    pub fn system_signatures(&self) -> &[StateSignature] {
        &self.inner.system_signatures
    }

    /// The hash, once the event hasher has run.
    pub fn hash(&self) -> Option<EventHash> {
        self.inner.hash.get().copied()
    }

    /// Records the hash. A second set with the same value is a no-op.
    pub fn set_hash(&self, hash: EventHash) {
        let _ = self.inner.hash.set(hash);
    }

    /// The signature, once signed.
    pub fn signature(&self) -> Option<&Bytes> {
        self.inner.signature.get()
    }

    /// Records the signature. A second set is a no-op.
    pub fn set_signature(&self, signature: Bytes) {
        let _ = self.inner.signature.set(signature);
    }

    /// The PCES stream sequence number, once the sequencer has run.
    pub fn stream_sequence(&self) -> Option<u64> {
        match self.inner.stream_sequence.load(Ordering::Acquire) {
            NO_STREAM_SEQUENCE => None,
            sequence => Some(sequence as u64),
        }
    }

    pub fn set_stream_sequence(&self, sequence: u64) {
        self.inner
            .stream_sequence
            .store(sequence as i64, Ordering::Release);
    }

    /// The value compared against ancient thresholds under the given mode.
    pub fn ancient_indicator(&self, mode: AncientMode) -> u64 {
        match mode {
            AncientMode::GenerationThreshold => self.inner.generation,
            AncientMode::BirthRoundThreshold => self.inner.birth_round,
        }
    }

    /// Descriptor of this event; available once hashed.
    pub fn descriptor(&self) -> Option<EventDescriptor> {
        self.hash().map(|hash| EventDescriptor {
            hash,
            creator: self.inner.creator,
            generation: self.inner.generation,
            birth_round: self.inner.birth_round,
        })
    }
}

impl std::fmt::Debug for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Event")
            .field("creator", &self.inner.creator)
            .field("generation", &self.inner.generation)
            .field("birth_round", &self.inner.birth_round)
            .field("hash", &self.inner.hash.get())
            .finish()
    }
}

/// Snapshot of the ancient/non-ancient boundaries distributed to intake
/// components after each consensus round.
#[derive(Clone, Copy, Debug)]
pub struct EventWindow {
    pub latest_consensus_round: u64,
    pub ancient_threshold: u64,
    pub expired_threshold: u64,
    pub mode: AncientMode,
}

impl EventWindow {
    /// The window before any round has reached consensus.
    pub fn genesis(mode: AncientMode) -> Self {
        Self {
            latest_consensus_round: 0,
            ancient_threshold: 0,
            expired_threshold: 0,
            mode,
        }
    }

    pub fn is_ancient(&self, event: &Event) -> bool {
        event.ancient_indicator(self.mode) < self.ancient_threshold
    }

    pub fn is_ancient_indicator(&self, indicator: u64) -> bool {
        indicator < self.ancient_threshold
    }
}

/// A round that reached consensus, with its keystone event and the event
/// window it derives.
#[derive(Clone, Debug)]
pub struct ConsensusRound {
    pub round: u64,
    pub events: Vec<Event>,
    pub keystone: Event,
    pub window: EventWindow,
}

impl ConsensusRound {
    /// Stream sequence number of the keystone event, once sequenced.
    pub fn keystone_sequence(&self) -> Option<u64> {
        self.keystone.stream_sequence()
    }
}

/// Out-of-band consensus position, applied at restart and reconnect.
#[derive(Clone, Copy, Debug)]
pub struct ConsensusSnapshot {
    pub round: u64,
}

/// A state produced by handling a consensus round, accumulating signatures
/// until complete. Flows through the pipeline as [`Reserved<SignedState>`].
pub struct SignedState {
    round: u64,
    threshold: usize,
    hash: OnceLock<EventHash>,
    signatures: Mutex<BTreeMap<NodeId, Bytes>>,
}

impl SignedState {
    pub fn new(round: u64, threshold: usize) -> Self {
        Self {
            round,
            threshold: threshold.max(1),
            hash: OnceLock::new(),
            signatures: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn round(&self) -> u64 {
        self.round
    }

    pub fn set_hash(&self, hash: EventHash) {
        let _ = self.hash.set(hash);
    }

    pub fn hash(&self) -> Option<EventHash> {
        self.hash.get().copied()
    }

    /// Records a signature; returns whether the state is complete afterwards.
    pub fn add_signature(&self, signer: NodeId, signature: Bytes) -> bool {
        let mut signatures = self.signatures.lock();
        signatures.insert(signer, signature);
        signatures.len() >= self.threshold
    }

    pub fn signature_count(&self) -> usize {
        self.signatures.lock().len()
    }

    pub fn is_complete(&self) -> bool {
        self.signature_count() >= self.threshold
    }
}

impl std::fmt::Debug for SignedState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedState")
            .field("round", &self.round)
            .field("signatures", &self.signature_count())
            .field("complete", &self.is_complete())
            .finish()
    }
}

/// The round handler's single output shape: the state it produced together
/// with the round that produced it.
#[derive(Clone)]
pub struct StateAndRound {
    pub state: Reserved<SignedState>,
    pub round: ConsensusRound,
}
