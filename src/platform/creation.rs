//! # Event creation.
//!
//! A heartbeat drives [`EventCreationManager::maybe_create_event`]; created
//! events are signed by the [`SelfEventSigner`] and re-enter the intake
//! pipeline on an INJECT back-edge (the creation loop is one of the graph's
//! structural cycles). Creation is gated on fresh material from other
//! creators, so the loop cannot feed on its own output.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use tracing::debug;

use crate::config::AncientMode;
use crate::platform::event::{Event, EventDescriptor, EventWindow, NodeId};
use crate::platform::intake::{EventHasher, Signer};

pub struct EventCreationManager {
    self_id: NodeId,
    window: EventWindow,
    last_self_parent: Option<EventDescriptor>,
    /// Most recent non-ancient event per other creator, freshest last.
    other_parent_candidates: Vec<EventDescriptor>,
    next_generation: u64,
    next_birth_round: u64,
    fresh_material: bool,
    created_genesis: bool,
}

impl EventCreationManager {
    pub fn new(self_id: NodeId, mode: AncientMode) -> Self {
        Self {
            self_id,
            window: EventWindow::genesis(mode),
            last_self_parent: None,
            other_parent_candidates: Vec::new(),
            next_generation: 1,
            next_birth_round: 1,
            fresh_material: false,
            created_genesis: false,
        }
    }

    /// Registers a pipeline event as potential parent material.
    pub fn register_event(&mut self, event: Event) -> Option<Event> {
        if event.creator() == self.self_id {
            // Own events come back through the intake loop; track them as the
            // self parent but not as creation triggers.
            if let Some(descriptor) = event.descriptor() {
                self.last_self_parent = Some(descriptor);
            }
            return None;
        }
        if self.window.is_ancient(&event) {
            return None;
        }
        if let Some(descriptor) = event.descriptor() {
            self.other_parent_candidates
                .retain(|candidate| candidate.creator != descriptor.creator);
            self.other_parent_candidates.push(descriptor);
            self.next_generation = self.next_generation.max(descriptor.generation + 1);
            self.fresh_material = true;
        }
        None
    }

    /// Heartbeat-driven creation attempt. Creates at most one event per
    /// fresh batch of other-creator material (plus a single genesis event).
    pub fn maybe_create_event(&mut self, _now: Instant) -> Option<Event> {
        if self.created_genesis && !self.fresh_material {
            return None;
        }
        self.fresh_material = false;
        self.created_genesis = true;

        let mut builder = Event::builder(self.self_id)
            .with_generation(self.next_generation)
            .with_birth_round(self.next_birth_round)
            .with_payload(Bytes::new());
        if let Some(parent) = self.last_self_parent {
            builder = builder.with_self_parent(parent);
        }
        if let Some(parent) = self.other_parent_candidates.last() {
            builder = builder.with_other_parent(*parent);
        }
        let event = builder.build();
        self.next_generation += 1;
        debug!(creator = self.self_id, generation = event.generation(), "event created");
        Some(event)
    }

    pub fn set_event_window(&mut self, window: EventWindow) -> Option<Event> {
        self.window = window;
        self.next_birth_round = window.latest_consensus_round + 1;
        self.other_parent_candidates
            .retain(|candidate| !window.is_ancient_indicator(candidate.ancient_indicator(window.mode)));
        None
    }

    pub fn clear(&mut self) {
        self.last_self_parent = None;
        self.other_parent_candidates.clear();
        self.fresh_material = false;
    }

    /// Number of other-creator parent candidates currently tracked.
    pub fn candidate_count(&self) -> usize {
        self.other_parent_candidates.len()
    }
}

/// Hashes and signs self-created events before they enter intake.
pub struct SelfEventSigner {
    signer: Arc<dyn Signer>,
}

impl SelfEventSigner {
    pub fn new(signer: Arc<dyn Signer>) -> Self {
        Self { signer }
    }

    pub fn sign_event(&mut self, event: Event) -> Option<Event> {
        let hash = match event.hash() {
            Some(hash) => hash,
            None => {
                let hash = EventHasher::compute(&event);
                event.set_hash(hash);
                hash
            }
        };
        event.set_signature(self.signer.sign(&hash, event.creator()));
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::intake::DigestSigner;

    fn registered(manager: &mut EventCreationManager, creator: NodeId, generation: u64) {
        let event = Event::builder(creator).with_generation(generation).build();
        event.set_hash(EventHasher::compute(&event));
        manager.register_event(event);
    }

    #[test]
    fn genesis_event_is_created_once_without_material() {
        let mut manager = EventCreationManager::new(7, AncientMode::GenerationThreshold);
        assert!(manager.maybe_create_event(Instant::now()).is_some());
        assert!(manager.maybe_create_event(Instant::now()).is_none());
    }

    #[test]
    fn creation_waits_for_fresh_material() {
        let mut manager = EventCreationManager::new(7, AncientMode::GenerationThreshold);
        manager.maybe_create_event(Instant::now());

        registered(&mut manager, 2, 5);
        let event = manager.maybe_create_event(Instant::now()).expect("event");
        assert!(event.generation() > 5);
        assert_eq!(event.other_parents().len(), 1);
        assert!(manager.maybe_create_event(Instant::now()).is_none());
    }

    #[test]
    fn own_events_do_not_trigger_creation() {
        let mut manager = EventCreationManager::new(7, AncientMode::GenerationThreshold);
        manager.maybe_create_event(Instant::now());

        let own = Event::builder(7).with_generation(9).build();
        own.set_hash(EventHasher::compute(&own));
        manager.register_event(own);
        assert!(manager.maybe_create_event(Instant::now()).is_none());
    }

    #[test]
    fn signer_hashes_and_signs() {
        let mut signer = SelfEventSigner::new(Arc::new(DigestSigner));
        let event = signer
            .sign_event(Event::builder(7).build())
            .expect("signed");
        assert!(event.hash().is_some());
        assert!(event.signature().is_some());
    }
}
