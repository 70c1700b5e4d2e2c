use tracing::debug;

use crate::config::AncientMode;
use crate::platform::event::{ConsensusRound, ConsensusSnapshot, Event, EventWindow};

/// Deterministic round batcher standing in for the consensus algorithm.
///
/// Every `batch` added events become one round whose keystone is the last
/// event of the batch, with an event window derived from the round number.
/// The interface, not the batching, is the contract: `add_event` emits
/// zero or more rounds, `out_of_band_snapshot_update` repositions the engine
/// at reconnect boundaries.
pub struct ConsensusEngine {
    mode: AncientMode,
    batch: usize,
    ancient_round_depth: u64,
    round: u64,
    pending: Vec<Event>,
}

impl ConsensusEngine {
    pub fn new(mode: AncientMode, batch: usize, ancient_round_depth: u64) -> Self {
        Self {
            mode,
            batch: batch.max(1),
            ancient_round_depth,
            round: 0,
            pending: Vec::new(),
        }
    }

    fn window_for(&self, round: u64) -> EventWindow {
        let ancient_threshold = round.saturating_sub(self.ancient_round_depth);
        EventWindow {
            latest_consensus_round: round,
            ancient_threshold,
            expired_threshold: ancient_threshold.saturating_sub(self.ancient_round_depth),
            mode: self.mode,
        }
    }

    pub fn add_event(&mut self, event: Event) -> Option<Vec<ConsensusRound>> {
        self.pending.push(event);
        if self.pending.len() < self.batch {
            return None;
        }
        self.round += 1;
        let events = std::mem::take(&mut self.pending);
        let keystone = events.last()?.clone();
        debug!(round = self.round, events = events.len(), "round reached consensus");
        Some(vec![ConsensusRound {
            round: self.round,
            events,
            keystone,
            window: self.window_for(self.round),
        }])
    }

    /// Repositions the engine after a reconnect; pending events are stale.
    pub fn out_of_band_snapshot_update(
        &mut self,
        snapshot: ConsensusSnapshot,
    ) -> Option<Vec<ConsensusRound>> {
        self.round = snapshot.round;
        self.pending.clear();
        None
    }
}
