use crate::platform::event::Event;

/// Assigns monotonically increasing stream sequence numbers to events
/// entering the preconsensus stream.
pub struct PcesSequencer {
    next: u64,
}

impl PcesSequencer {
    pub fn new() -> Self {
        Self { next: 0 }
    }

    pub fn assign_stream_sequence_number(&mut self, event: Event) -> Option<Event> {
        event.set_stream_sequence(self.next);
        self.next += 1;
        Some(event)
    }
}

impl Default for PcesSequencer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequences_are_dense_and_increasing() {
        let mut sequencer = PcesSequencer::new();
        for expected in 0..5u64 {
            let event = sequencer
                .assign_stream_sequence_number(Event::builder(1).build())
                .unwrap();
            assert_eq!(event.stream_sequence(), Some(expected));
        }
    }
}
