use tracing::warn;

use crate::platform::event::Event;

/// Maximum accepted payload, matching the transaction size ceiling.
const MAX_PAYLOAD_BYTES: usize = 1024 * 1024;
/// More parents than this is malformed, not just unusual.
const MAX_PARENT_COUNT: usize = 64;

/// Checks the internal integrity of an event before any stateful stage
/// sees it: hash present, payload bounded, parent list sane, generation
/// consistent with the parents.
pub struct InternalEventValidator;

impl InternalEventValidator {
    pub fn validate_event(&mut self, event: Event) -> Option<Event> {
        if event.hash().is_none() {
            warn!(?event, "event reached validation without a hash");
            return None;
        }
        if event.payload().len() > MAX_PAYLOAD_BYTES {
            warn!(?event, size = event.payload().len(), "oversized payload");
            return None;
        }
        if event.other_parents().len() > MAX_PARENT_COUNT {
            warn!(?event, parents = event.other_parents().len(), "too many parents");
            return None;
        }
        let max_parent_generation = event.parents().map(|p| p.generation).max();
        if let Some(max) = max_parent_generation {
            if event.generation() <= max {
                warn!(
                    ?event,
                    max_parent_generation = max,
                    "generation not greater than parents"
                );
                return None;
            }
        }
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::event::EventDescriptor;
    use crate::platform::intake::EventHasher;

    fn hashed(event: Event) -> Event {
        event.set_hash(EventHasher::compute(&event));
        event
    }

    #[test]
    fn accepts_well_formed_event() {
        let mut validator = InternalEventValidator;
        let event = hashed(Event::builder(1).with_generation(5).build());
        assert!(validator.validate_event(event).is_some());
    }

    #[test]
    fn rejects_unhashed_event() {
        let mut validator = InternalEventValidator;
        let event = Event::builder(1).build();
        assert!(validator.validate_event(event).is_none());
    }

    #[test]
    fn rejects_generation_behind_parent() {
        let mut validator = InternalEventValidator;
        let parent = EventDescriptor {
            hash: crate::platform::event::EventHash::new([0; 32]),
            creator: 2,
            generation: 9,
            birth_round: 1,
        };
        let event = hashed(
            Event::builder(1)
                .with_generation(9)
                .with_other_parent(parent)
                .build(),
        );
        assert!(validator.validate_event(event).is_none());
    }
}
