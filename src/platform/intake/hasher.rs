use sha2::{Digest, Sha256};

use crate::platform::event::{Event, EventHash};

/// Computes event hashes. Stateless, so it runs on a CONCURRENT scheduler
/// through a shared input wire.
pub struct EventHasher;

impl EventHasher {
    /// Canonical hash over creator, coordinates, parents, and payload.
    pub fn compute(event: &Event) -> EventHash {
        let mut digest = Sha256::new();
        digest.update(event.creator().to_be_bytes());
        digest.update(event.generation().to_be_bytes());
        digest.update(event.birth_round().to_be_bytes());
        for parent in event.parents() {
            digest.update(parent.hash.as_bytes());
        }
        digest.update(event.payload());
        EventHash::new(digest.finalize().into())
    }

    /// Hashes one event and forwards it.
    pub fn hash_event(&self, event: Event) -> Option<Event> {
        event.set_hash(Self::compute(&event));
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashing_is_deterministic() {
        let a = Event::builder(1).with_generation(3).build();
        let b = Event::builder(1).with_generation(3).build();
        assert_eq!(EventHasher::compute(&a), EventHasher::compute(&b));

        let c = Event::builder(2).with_generation(3).build();
        assert_ne!(EventHasher::compute(&a), EventHasher::compute(&c));
    }

    #[test]
    fn hash_event_sets_the_hash() {
        let hasher = EventHasher;
        let event = Event::builder(1).build();
        assert!(event.hash().is_none());
        let event = hasher.hash_event(event).unwrap();
        assert!(event.hash().is_some());
    }
}
