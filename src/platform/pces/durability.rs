//! # Round durability gating.
//!
//! [`DurableSequence`] is the shared watermark the writer advances and the
//! round handler checks; [`RoundDurabilityBuffer`] holds each consensus round
//! until its keystone's sequence number is covered by the watermark, then
//! releases rounds in arrival order.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Instant;

use tracing::error;

use crate::platform::event::ConsensusRound;

const NOTHING_DURABLE: i64 = -1;

/// Monotonically non-decreasing latest-durable sequence number, shared
/// between the PCES writer and the consensus round handler.
pub struct DurableSequence {
    value: AtomicI64,
}

impl DurableSequence {
    pub fn new() -> Self {
        Self {
            value: AtomicI64::new(NOTHING_DURABLE),
        }
    }

    /// Raises the watermark; a lower value is a no-op.
    pub fn advance(&self, sequence: u64) {
        self.value.fetch_max(sequence as i64, Ordering::AcqRel);
    }

    /// The latest durable sequence, or `None` before the first flush.
    pub fn get(&self) -> Option<u64> {
        match self.value.load(Ordering::Acquire) {
            NOTHING_DURABLE => None,
            sequence => Some(sequence as u64),
        }
    }

    /// Whether the given sequence has been made durable.
    pub fn covers(&self, sequence: u64) -> bool {
        self.value.load(Ordering::Acquire) >= sequence as i64
    }
}

impl Default for DurableSequence {
    fn default() -> Self {
        Self::new()
    }
}

/// Holds consensus rounds until their keystone event is durable.
pub struct RoundDurabilityBuffer {
    latest_durable: Option<u64>,
    waiting: VecDeque<(ConsensusRound, Instant)>,
    suspicious_duration: std::time::Duration,
}

impl RoundDurabilityBuffer {
    pub fn new(suspicious_duration: std::time::Duration) -> Self {
        Self {
            latest_durable: None,
            waiting: VecDeque::new(),
            suspicious_duration,
        }
    }

    fn is_durable(&self, round: &ConsensusRound) -> Option<bool> {
        let sequence = match round.keystone_sequence() {
            Some(sequence) => sequence,
            None => {
                error!(round = round.round, "round keystone was never sequenced");
                return None;
            }
        };
        Some(self.latest_durable.is_some_and(|durable| durable >= sequence))
    }

    /// Drains the front of the queue while keystones are durable, preserving
    /// arrival order.
    fn drain_durable(&mut self) -> Option<Vec<ConsensusRound>> {
        let mut released = Vec::new();
        loop {
            let Some((round, _)) = self.waiting.front() else {
                break;
            };
            match self.is_durable(round) {
                Some(true) => {
                    if let Some((round, _)) = self.waiting.pop_front() {
                        released.push(round);
                    }
                }
                Some(false) => break,
                None => {
                    // Unsequenced keystone: drop the poisoned round.
                    self.waiting.pop_front();
                }
            }
        }
        if released.is_empty() {
            None
        } else {
            Some(released)
        }
    }

    /// Ingests one round; releases it immediately if already durable and
    /// nothing older is still waiting.
    pub fn add_round(&mut self, round: ConsensusRound) -> Option<Vec<ConsensusRound>> {
        self.waiting.push_back((round, Instant::now()));
        self.drain_durable()
    }

    /// Raises the durable watermark and releases newly eligible rounds.
    pub fn set_latest_durable_sequence_number(
        &mut self,
        sequence: u64,
    ) -> Option<Vec<ConsensusRound>> {
        self.latest_durable = Some(self.latest_durable.map_or(sequence, |d| d.max(sequence)));
        self.drain_durable()
    }

    /// Heartbeat-driven liveness alarm: rounds waiting longer than the
    /// suspicious duration are reported. Releases nothing.
    pub fn check_for_stale_rounds(&mut self, now: Instant) -> Option<Vec<ConsensusRound>> {
        for (round, since) in &self.waiting {
            if now.duration_since(*since) >= self.suspicious_duration {
                error!(
                    round = round.round,
                    waiting_for = ?now.duration_since(*since),
                    keystone_sequence = ?round.keystone_sequence(),
                    latest_durable = ?self.latest_durable,
                    "round has been waiting on durability for a suspiciously long time"
                );
            }
        }
        None
    }

    pub fn clear(&mut self) {
        self.waiting.clear();
        self.latest_durable = None;
    }

    /// Number of rounds currently held.
    pub fn waiting_count(&self) -> usize {
        self.waiting.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AncientMode;
    use crate::platform::event::{Event, EventWindow};
    use std::time::Duration;

    fn round(number: u64, keystone_sequence: u64) -> ConsensusRound {
        let keystone = Event::builder(1).build();
        keystone.set_stream_sequence(keystone_sequence);
        ConsensusRound {
            round: number,
            events: vec![keystone.clone()],
            keystone,
            window: EventWindow::genesis(AncientMode::GenerationThreshold),
        }
    }

    fn buffer() -> RoundDurabilityBuffer {
        RoundDurabilityBuffer::new(Duration::from_secs(10))
    }

    #[test]
    fn round_waits_for_durability() {
        let mut buffer = buffer();
        assert!(buffer.add_round(round(1, 5)).is_none());
        assert_eq!(buffer.waiting_count(), 1);

        assert!(buffer.set_latest_durable_sequence_number(4).is_none());
        let released = buffer.set_latest_durable_sequence_number(5).expect("released");
        assert_eq!(released.len(), 1);
        assert_eq!(buffer.waiting_count(), 0);
    }

    #[test]
    fn already_durable_round_releases_immediately() {
        let mut buffer = buffer();
        buffer.set_latest_durable_sequence_number(10);
        let released = buffer.add_round(round(1, 5)).expect("released");
        assert_eq!(released[0].round, 1);
    }

    #[test]
    fn release_preserves_arrival_order() {
        let mut buffer = buffer();
        assert!(buffer.add_round(round(1, 3)).is_none());
        assert!(buffer.add_round(round(2, 7)).is_none());

        let first = buffer.set_latest_durable_sequence_number(3).expect("released");
        assert_eq!(first.iter().map(|r| r.round).collect::<Vec<_>>(), vec![1]);

        let second = buffer.set_latest_durable_sequence_number(7).expect("released");
        assert_eq!(second.iter().map(|r| r.round).collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn clear_forgets_everything() {
        let mut buffer = buffer();
        buffer.add_round(round(1, 3));
        buffer.set_latest_durable_sequence_number(1);
        buffer.clear();
        assert_eq!(buffer.waiting_count(), 0);
        assert!(buffer.add_round(round(2, 0)).is_none());
    }
}
