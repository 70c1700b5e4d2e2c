use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::platform::event::SignedState;
use crate::reservation::Reserved;

/// Persists states. The default records saved rounds in memory; the real
/// file-system manager is a collaborator bound through the same wiring.
pub struct StateSaver {
    saved: Arc<Mutex<Vec<u64>>>,
}

impl StateSaver {
    pub fn new() -> Self {
        Self {
            saved: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Rounds saved so far, in save order.
    pub fn saved_rounds(&self) -> Arc<Mutex<Vec<u64>>> {
        Arc::clone(&self.saved)
    }

    pub fn save_state(&mut self, state: Reserved<SignedState>) -> Option<()> {
        debug!(round = state.round(), "state saved");
        self.saved.lock().push(state.round());
        None
    }
}

impl Default for StateSaver {
    fn default() -> Self {
        Self::new()
    }
}
