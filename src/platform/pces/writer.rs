//! # PCES writer.
//!
//! Append-only log of sequenced events. Writes are buffered; a flush request
//! for sequence `s` makes every write up to and including `s` durable once
//! `s` has been written. The latest durable sequence number is the writer's
//! output, and it is monotonically non-decreasing.
//!
//! This default implementation keeps the log in memory; durability here
//! means "survived the flush discipline", which is what the durability
//! buffer's gating contract consumes. A production writer binds the same
//! method set over real files.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use crate::platform::event::{Event, EventWindow};
use crate::platform::pces::DurableSequence;

pub struct PcesWriter {
    durable: Arc<DurableSequence>,
    log: Vec<Event>,
    last_written: Option<u64>,
    pending_flushes: BTreeSet<u64>,
    minimum_ancient_to_store: u64,
    streaming: bool,
}

impl PcesWriter {
    pub fn new(durable: Arc<DurableSequence>) -> Self {
        Self {
            durable,
            log: Vec::new(),
            last_written: None,
            pending_flushes: BTreeSet::new(),
            minimum_ancient_to_store: 0,
            streaming: false,
        }
    }

    /// Appends one sequenced event; returns the new latest durable sequence
    /// when a pending flush request is satisfied by this write.
    pub fn write_event(&mut self, event: Event) -> Option<u64> {
        let sequence = match event.stream_sequence() {
            Some(sequence) => sequence,
            None => {
                tracing::error!(?event, "unsequenced event reached the writer");
                return None;
            }
        };
        self.log.push(event);
        self.last_written = Some(sequence);

        let satisfied: Vec<u64> = self
            .pending_flushes
            .range(..=sequence)
            .copied()
            .collect();
        if satisfied.is_empty() {
            return None;
        }
        for request in satisfied {
            self.pending_flushes.remove(&request);
        }
        Some(self.flush_through(sequence))
    }

    /// Requests that everything up to `sequence` be made durable. Returns the
    /// new latest durable sequence if the flush could run immediately.
    pub fn submit_flush_request(&mut self, sequence: u64) -> Option<u64> {
        match self.last_written {
            Some(written) if written >= sequence => Some(self.flush_through(written)),
            _ => {
                self.pending_flushes.insert(sequence);
                None
            }
        }
    }

    fn flush_through(&mut self, sequence: u64) -> u64 {
        self.durable.advance(sequence);
        debug!(sequence, "pces flush");
        sequence
    }

    /// Replay is over; subsequent writes belong to the live stream.
    pub fn begin_streaming_new_events(&mut self) -> Option<u64> {
        self.streaming = true;
        None
    }

    /// Whether the writer has moved past replay into the live stream.
    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    /// Raises the floor below which events need not be kept; buffered events
    /// under the floor are dropped.
    pub fn set_minimum_ancient_identifier_to_store(&mut self, identifier: u64) -> Option<u64> {
        self.minimum_ancient_to_store = self.minimum_ancient_to_store.max(identifier);
        let floor = self.minimum_ancient_to_store;
        self.log.retain(|event| event.generation() >= floor);
        None
    }

    /// Drops buffered events that fell out of the non-ancient window.
    pub fn update_non_ancient_event_boundary(&mut self, window: EventWindow) -> Option<u64> {
        self.log.retain(|event| !window.is_ancient(event));
        None
    }

    /// Number of events currently buffered.
    pub fn written_count(&self) -> usize {
        self.log.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequenced(sequence: u64) -> Event {
        let event = Event::builder(1).build();
        event.set_stream_sequence(sequence);
        event
    }

    #[test]
    fn flush_request_after_write_is_immediate() {
        let durable = Arc::new(DurableSequence::new());
        let mut writer = PcesWriter::new(Arc::clone(&durable));
        writer.write_event(sequenced(0));
        writer.write_event(sequenced(1));
        assert_eq!(writer.submit_flush_request(1), Some(1));
        assert_eq!(durable.get(), Some(1));
    }

    #[test]
    fn flush_request_before_write_waits_for_the_write() {
        let durable = Arc::new(DurableSequence::new());
        let mut writer = PcesWriter::new(Arc::clone(&durable));
        assert_eq!(writer.submit_flush_request(1), None);
        assert_eq!(durable.get(), None);

        assert_eq!(writer.write_event(sequenced(0)), None);
        assert_eq!(writer.write_event(sequenced(1)), Some(1));
        assert_eq!(durable.get(), Some(1));
    }

    #[test]
    fn durable_sequence_never_regresses() {
        let durable = Arc::new(DurableSequence::new());
        let mut writer = PcesWriter::new(Arc::clone(&durable));
        writer.write_event(sequenced(0));
        writer.write_event(sequenced(1));
        writer.write_event(sequenced(2));
        assert_eq!(writer.submit_flush_request(2), Some(2));
        assert_eq!(writer.submit_flush_request(1), Some(2));
        assert_eq!(durable.get(), Some(2));
    }
}
