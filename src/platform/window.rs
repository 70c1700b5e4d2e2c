use crate::platform::event::{ConsensusRound, EventWindow};

/// Extracts and redistributes event windows.
///
/// Runs DIRECT_THREADSAFE: window updates fan out on INJECT edges to every
/// intake component, and injection must not queue behind the very pipeline
/// the window unblocks.
pub struct EventWindowManager;

impl EventWindowManager {
    /// Derives the window from a freshly decided round.
    pub fn extract_event_window(&mut self, round: ConsensusRound) -> Option<EventWindow> {
        Some(round.window)
    }

    /// Accepts an out-of-band window (reconnect boundaries).
    pub fn update_event_window(&mut self, window: EventWindow) -> Option<EventWindow> {
        Some(window)
    }
}
