//! # Orphan buffer.
//!
//! Events can arrive before their parents. The buffer holds such orphans and
//! releases them (plus any children waiting on them, transitively) once every
//! missing parent has either arrived or become ancient. Output is a batch:
//! one ingested event can unblock a chain.

use std::collections::HashMap;

use crate::config::AncientMode;
use crate::platform::event::{Event, EventHash, EventWindow};

/// Holds events whose parents have not been seen yet.
pub struct OrphanBuffer {
    window: EventWindow,
    /// Hashes of non-ancient events that passed through.
    known: HashMap<EventHash, u64>,
    /// Orphans keyed by one of their missing parents.
    waiting: HashMap<EventHash, Vec<Event>>,
}

impl OrphanBuffer {
    pub fn new(mode: AncientMode) -> Self {
        Self {
            window: EventWindow::genesis(mode),
            known: HashMap::new(),
            waiting: HashMap::new(),
        }
    }

    fn missing_parent(&self, event: &Event) -> Option<EventHash> {
        event
            .parents()
            .find(|parent| {
                !self.known.contains_key(&parent.hash)
                    && !self
                        .window
                        .is_ancient_indicator(parent.ancient_indicator(self.window.mode))
            })
            .map(|parent| parent.hash)
    }

    /// Ingests one event; returns every event released by it, in parent-first
    /// order.
    pub fn handle_event(&mut self, event: Event) -> Option<Vec<Event>> {
        if self.window.is_ancient(&event) {
            return None;
        }
        let hash = event.hash()?;

        if let Some(parent) = self.missing_parent(&event) {
            self.waiting.entry(parent).or_default().push(event);
            return None;
        }

        let mut released = Vec::new();
        let mut frontier = vec![(hash, event)];
        while let Some((hash, event)) = frontier.pop() {
            self.known
                .insert(hash, event.ancient_indicator(self.window.mode));
            released.push(event);

            for child in self.waiting.remove(&hash).unwrap_or_default() {
                match self.missing_parent(&child) {
                    Some(parent) => self.waiting.entry(parent).or_default().push(child),
                    None => {
                        if let Some(child_hash) = child.hash() {
                            frontier.push((child_hash, child));
                        }
                    }
                }
            }
        }
        Some(released)
    }

    /// Updates the window: ancient orphans are discarded, orphans whose
    /// missing parents became ancient are released.
    pub fn set_event_window(&mut self, window: EventWindow) -> Option<Vec<Event>> {
        self.window = window;
        self.known
            .retain(|_, indicator| !window.is_ancient_indicator(*indicator));

        let stale: Vec<EventHash> = self
            .waiting
            .keys()
            .filter(|parent_hash| !self.waiting_still_blocked(parent_hash))
            .copied()
            .collect();

        let mut released = Vec::new();
        for parent in stale {
            for orphan in self.waiting.remove(&parent).unwrap_or_default() {
                if self.window.is_ancient(&orphan) {
                    continue;
                }
                if let Some(mut batch) = self.handle_event(orphan) {
                    released.append(&mut batch);
                }
            }
        }
        if released.is_empty() {
            None
        } else {
            Some(released)
        }
    }

    fn waiting_still_blocked(&self, parent_hash: &EventHash) -> bool {
        // The keyed parent is still blocking only if some waiter still
        // misses it under the current window.
        self.waiting
            .get(parent_hash)
            .map(|orphans| {
                orphans
                    .iter()
                    .any(|orphan| self.missing_parent(orphan) == Some(*parent_hash))
            })
            .unwrap_or(false)
    }

    pub fn clear(&mut self) {
        self.known.clear();
        self.waiting.clear();
    }

    /// Number of events currently held as orphans.
    pub fn orphan_count(&self) -> usize {
        self.waiting.values().map(Vec::len).sum()
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

    fn descriptor(event: &Event) -> EventDescriptor {
        event.descriptor().expect("hashed")
    }

    #[test]
    fn event_without_parents_passes_through() {
        let mut buffer = OrphanBuffer::new(AncientMode::GenerationThreshold);
        let event = hashed(Event::builder(1).with_generation(1).build());
        let released = buffer.handle_event(event).expect("released");
        assert_eq!(released.len(), 1);
    }

    #[test]
    fn orphan_released_when_parent_arrives() {
        let mut buffer = OrphanBuffer::new(AncientMode::GenerationThreshold);
        let parent = hashed(Event::builder(1).with_generation(1).build());
        let child = hashed(
            Event::builder(2)
                .with_generation(2)
                .with_other_parent(descriptor(&parent))
                .build(),
        );

        assert!(buffer.handle_event(child).is_none());
        assert_eq!(buffer.orphan_count(), 1);

        let released = buffer.handle_event(parent).expect("released");
        assert_eq!(released.len(), 2);
        assert_eq!(buffer.orphan_count(), 0);
    }

    #[test]
    fn ancient_parent_does_not_block() {
        let mut buffer = OrphanBuffer::new(AncientMode::GenerationThreshold);
        let mut window = EventWindow::genesis(AncientMode::GenerationThreshold);
        window.ancient_threshold = 5;
        buffer.set_event_window(window);

        let ghost = EventDescriptor {
            hash: EventHash::new([7; 32]),
            creator: 9,
            generation: 2,
            birth_round: 0,
        };
        let child = hashed(
            Event::builder(2)
                .with_generation(8)
                .with_other_parent(ghost)
                .build(),
        );
        let released = buffer.handle_event(child).expect("released");
        assert_eq!(released.len(), 1);
    }

    #[test]
    fn window_update_releases_blocked_orphans() {
        let mut buffer = OrphanBuffer::new(AncientMode::GenerationThreshold);
        let ghost = EventDescriptor {
            hash: EventHash::new([9; 32]),
            creator: 9,
            generation: 2,
            birth_round: 0,
        };
        let child = hashed(
            Event::builder(2)
                .with_generation(8)
                .with_other_parent(ghost)
                .build(),
        );
        assert!(buffer.handle_event(child).is_none());

        let mut window = EventWindow::genesis(AncientMode::GenerationThreshold);
        window.ancient_threshold = 5;
        let released = buffer.set_event_window(window).expect("released");
        assert_eq!(released.len(), 1);
        assert_eq!(buffer.orphan_count(), 0);
    }
}
