use std::panic::panic_any;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::error;

use crate::error::FatalError;
use crate::platform::event::{ConsensusRound, SignedState, StateAndRound};
use crate::platform::pces::DurableSequence;
use crate::reservation::Reserved;

/// Applies durable consensus rounds, producing one signed state per round.
///
/// The durability invariant is enforced here as a hard check: the
/// round-durability buffer must never hand over a round whose keystone the
/// PCES writer has not flushed. A violation panics with a [`FatalError`]
/// payload, which the scheduler turns into a process abort rather than
/// committing an unrecoverable round.
pub struct ConsensusRoundHandler {
    durable: Arc<DurableSequence>,
    signature_threshold: usize,
    handled: Arc<Mutex<Vec<u64>>>,
}

impl ConsensusRoundHandler {
    pub fn new(durable: Arc<DurableSequence>, signature_threshold: usize) -> Self {
        Self {
            durable,
            signature_threshold,
            handled: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Round numbers handled so far, in handling order.
    pub fn handled_rounds(&self) -> Arc<Mutex<Vec<u64>>> {
        Arc::clone(&self.handled)
    }

    pub fn handle_round(&mut self, round: ConsensusRound) -> Option<StateAndRound> {
        let keystone_sequence = match round.keystone_sequence() {
            Some(sequence) => sequence,
            None => {
                error!(round = round.round, "round reached the handler unsequenced");
                return None;
            }
        };
        if !self.durable.covers(keystone_sequence) {
            error!(
                round = round.round,
                keystone_sequence,
                latest_durable = ?self.durable.get(),
                "round reached the handler before its keystone was durable"
            );
            panic_any(FatalError::new(format!(
                "round {} delivered with keystone sequence {} not durable",
                round.round, keystone_sequence
            )));
        }

        self.handled.lock().push(round.round);
        let state = Reserved::new(SignedState::new(round.round, self.signature_threshold));
        Some(StateAndRound { state, round })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AncientMode;
    use crate::platform::event::{Event, EventWindow};

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

    #[test]
    fn durable_round_is_handled() {
        let durable = Arc::new(DurableSequence::new());
        durable.advance(5);
        let mut handler = ConsensusRoundHandler::new(Arc::clone(&durable), 2);
        let out = handler.handle_round(round(1, 5)).expect("state");
        assert_eq!(out.state.round(), 1);
        assert_eq!(handler.handled_rounds().lock().as_slice(), &[1]);
    }

    #[test]
    fn non_durable_round_panics_with_a_fatal_payload() {
        let durable = Arc::new(DurableSequence::new());
        let mut handler = ConsensusRoundHandler::new(durable, 2);
        let payload = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = handler.handle_round(round(1, 5));
        }))
        .expect_err("non-durable round must panic");
        // The payload type is what the scheduler keys on to abort the
        // process instead of isolating the panic to the task.
        assert!(payload.is::<FatalError>());
    }
}
