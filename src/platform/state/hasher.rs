use sha2::{Digest, Sha256};

use crate::platform::event::{EventHash, StateAndRound};

/// Computes the hash of each newly produced state.
pub struct StateHasher;

impl StateHasher {
    pub fn hash_state(&mut self, state_and_round: StateAndRound) -> Option<StateAndRound> {
        let mut digest = Sha256::new();
        digest.update(state_and_round.round.round.to_be_bytes());
        for event in &state_and_round.round.events {
            if let Some(hash) = event.hash() {
                digest.update(hash.as_bytes());
            }
        }
        state_and_round
            .state
            .set_hash(EventHash::new(digest.finalize().into()));
        Some(state_and_round)
    }
}
