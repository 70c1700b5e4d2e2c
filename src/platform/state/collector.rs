//! # State signature collector.
//!
//! States and their signatures race each other through the pipeline:
//! preconsensus signatures can arrive before the state they sign exists.
//! The collector buffers both sides, joins them by round, and emits a state
//! once it is complete. Output is a batch, since one signature delivery can
//! complete several retained states.

use std::collections::BTreeMap;

use tracing::debug;

use crate::platform::event::{SignedState, StateSignature};
use crate::reservation::Reserved;

pub struct StateSignatureCollector {
    states: BTreeMap<u64, Reserved<SignedState>>,
    pending_signatures: BTreeMap<u64, Vec<StateSignature>>,
}

impl StateSignatureCollector {
    pub fn new() -> Self {
        Self {
            states: BTreeMap::new(),
            pending_signatures: BTreeMap::new(),
        }
    }

    /// Takes custody of a freshly hashed state; emits it immediately if the
    /// buffered signatures already complete it.
    pub fn add_reserved_state(
        &mut self,
        state: Reserved<SignedState>,
    ) -> Option<Vec<Reserved<SignedState>>> {
        let round = state.round();
        let mut complete = state.is_complete();
        if let Some(signatures) = self.pending_signatures.remove(&round) {
            for signature in signatures {
                complete = state.add_signature(signature.signer, signature.signature);
            }
        }
        if complete {
            debug!(round, "state complete on arrival");
            return Some(vec![state]);
        }
        self.states.insert(round, state);
        None
    }

    /// Signatures extracted from preconsensus events.
    pub fn handle_preconsensus_signatures(
        &mut self,
        signatures: Vec<StateSignature>,
    ) -> Option<Vec<Reserved<SignedState>>> {
        self.apply(signatures)
    }

    /// Signatures extracted from events that reached consensus.
    pub fn handle_postconsensus_signatures(
        &mut self,
        signatures: Vec<StateSignature>,
    ) -> Option<Vec<Reserved<SignedState>>> {
        self.apply(signatures)
    }

    fn apply(&mut self, signatures: Vec<StateSignature>) -> Option<Vec<Reserved<SignedState>>> {
        let mut completed_rounds = Vec::new();
        for signature in signatures {
            match self.states.get(&signature.round) {
                Some(state) => {
                    if state.add_signature(signature.signer, signature.signature) {
                        completed_rounds.push(signature.round);
                    }
                }
                None => {
                    self.pending_signatures
                        .entry(signature.round)
                        .or_default()
                        .push(signature);
                }
            }
        }
        let completed: Vec<Reserved<SignedState>> = completed_rounds
            .into_iter()
            .filter_map(|round| self.states.remove(&round))
            .collect();
        if completed.is_empty() {
            None
        } else {
            Some(completed)
        }
    }

    /// Drops every retained state and buffered signature. Dropping the
    /// handles releases their reservations.
    pub fn clear(&mut self) {
        self.states.clear();
        self.pending_signatures.clear();
    }

    /// Number of states waiting for signatures.
    pub fn retained_count(&self) -> usize {
        self.states.len()
    }
}

impl Default for StateSignatureCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn state(round: u64) -> Reserved<SignedState> {
        Reserved::new(SignedState::new(round, 2))
    }

    fn signature(round: u64, signer: u64) -> StateSignature {
        StateSignature {
            round,
            signer,
            signature: Bytes::from_static(b"sig"),
        }
    }

    #[test]
    fn state_completes_when_signatures_arrive() {
        let mut collector = StateSignatureCollector::new();
        assert!(collector.add_reserved_state(state(1)).is_none());
        assert!(collector
            .handle_preconsensus_signatures(vec![signature(1, 10)])
            .is_none());
        let completed = collector
            .handle_postconsensus_signatures(vec![signature(1, 11)])
            .expect("completed");
        assert_eq!(completed.len(), 1);
        assert!(completed[0].is_complete());
        assert_eq!(collector.retained_count(), 0);
    }

    #[test]
    fn early_signatures_wait_for_their_state() {
        let mut collector = StateSignatureCollector::new();
        assert!(collector
            .handle_preconsensus_signatures(vec![signature(1, 10), signature(1, 11)])
            .is_none());
        let completed = collector.add_reserved_state(state(1)).expect("completed");
        assert_eq!(completed.len(), 1);
    }

    #[test]
    fn clear_releases_retained_states() {
        let mut collector = StateSignatureCollector::new();
        let retained = state(1);
        let probe = retained.reserve();
        collector.add_reserved_state(retained);
        assert_eq!(probe.reservation_count(), 2);
        collector.clear();
        assert_eq!(probe.reservation_count(), 1);
        assert_eq!(collector.retained_count(), 0);
    }
}
