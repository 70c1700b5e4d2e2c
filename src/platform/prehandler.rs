use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::platform::event::Event;

/// Prehandles application transactions off the critical path.
///
/// Runs CONCURRENT: prehandling is stateless per event, so handlers take
/// `&self` and execute in parallel on the shared pool.
pub struct TransactionPrehandler {
    prehandled: Arc<AtomicU64>,
}

impl TransactionPrehandler {
    pub fn new() -> Self {
        Self {
            prehandled: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Count of events prehandled so far.
    pub fn prehandled_count(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.prehandled)
    }

    pub fn prehandle_application_transactions(&self, event: Event) -> Option<()> {
        // Payload decoding and future cache warming live behind this seam.
        let _ = event.payload();
        self.prehandled.fetch_add(1, Ordering::Relaxed);
        None
    }
}

impl Default for TransactionPrehandler {
    fn default() -> Self {
        Self::new()
    }
}
