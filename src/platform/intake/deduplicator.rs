use std::collections::HashMap;

use crate::config::AncientMode;
use crate::platform::event::{Event, EventHash, EventWindow};

/// Drops events already seen in the current window.
///
/// Ancient events are dropped outright; the seen-set is pruned on each
/// window update so it tracks only non-ancient history.
pub struct EventDeduplicator {
    window: EventWindow,
    seen: HashMap<EventHash, u64>,
}

impl EventDeduplicator {
    pub fn new(mode: AncientMode) -> Self {
        Self {
            window: EventWindow::genesis(mode),
            seen: HashMap::new(),
        }
    }

    pub fn handle_event(&mut self, event: Event) -> Option<Event> {
        if self.window.is_ancient(&event) {
            return None;
        }
        let hash = event.hash()?;
        let indicator = event.ancient_indicator(self.window.mode);
        if self.seen.insert(hash, indicator).is_some() {
            return None;
        }
        Some(event)
    }

    pub fn set_event_window(&mut self, window: EventWindow) {
        self.window = window;
        self.seen
            .retain(|_, indicator| !window.is_ancient_indicator(*indicator));
    }

    pub fn clear(&mut self) {
        self.seen.clear();
    }

    #[cfg(test)]
    pub(crate) fn tracked(&self) -> usize {
        self.seen.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::intake::EventHasher;

    fn event(creator: u64, generation: u64) -> Event {
        let event = Event::builder(creator).with_generation(generation).build();
        event.set_hash(EventHasher::compute(&event));
        event
    }

    #[test]
    fn duplicate_is_dropped() {
        let mut dedup = EventDeduplicator::new(AncientMode::GenerationThreshold);
        let e = event(1, 5);
        assert!(dedup.handle_event(e.clone()).is_some());
        assert!(dedup.handle_event(e).is_none());
    }

    #[test]
    fn window_update_prunes_and_rejects_ancient() {
        let mut dedup = EventDeduplicator::new(AncientMode::GenerationThreshold);
        assert!(dedup.handle_event(event(1, 2)).is_some());
        assert!(dedup.handle_event(event(1, 9)).is_some());
        assert_eq!(dedup.tracked(), 2);

        let mut window = EventWindow::genesis(AncientMode::GenerationThreshold);
        window.ancient_threshold = 5;
        dedup.set_event_window(window);
        assert_eq!(dedup.tracked(), 1);
        assert!(dedup.handle_event(event(2, 3)).is_none());
    }

    #[test]
    fn clear_forgets_history() {
        let mut dedup = EventDeduplicator::new(AncientMode::GenerationThreshold);
        let e = event(1, 5);
        assert!(dedup.handle_event(e.clone()).is_some());
        dedup.clear();
        assert!(dedup.handle_event(e).is_some());
    }
}
