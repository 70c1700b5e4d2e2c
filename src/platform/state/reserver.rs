use tracing::trace;

use crate::platform::event::SignedState;
use crate::reservation::Reserved;
use crate::transformers::AdvancedTransformation;

/// Reservation-taking fan-out stage for signed states.
///
/// Each downstream sink receives its own freshly taken reservation; the
/// original handle is released after the fan-out. Net effect for `k` sinks:
/// `k - 1` additional reservations, each released by exactly one holder.
pub struct StateReserver {
    name: &'static str,
}

impl StateReserver {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl AdvancedTransformation<Reserved<SignedState>, Reserved<SignedState>> for StateReserver {
    fn transform(&self, input: &Reserved<SignedState>) -> Option<Reserved<SignedState>> {
        trace!(reserver = self.name, round = input.round(), "state reserved");
        Some(input.reserve())
    }
}
