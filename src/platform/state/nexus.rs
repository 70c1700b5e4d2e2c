//! # State nexuses.
//!
//! Shared registries of the most recent states, living on
//! DIRECT_THREADSAFE schedulers so any task can query them without queueing.
//! A nexus holds one reservation on whatever state it currently exposes and
//! releases it when replaced.

use tracing::warn;

use crate::platform::event::{EventWindow, SignedState, StateAndRound};
use crate::reservation::Reserved;

/// Latest immutable state produced by the round handler.
pub struct LatestImmutableStateNexus {
    state: Option<Reserved<SignedState>>,
    validate_loaded_state: bool,
}

impl LatestImmutableStateNexus {
    pub fn new(validate_loaded_state: bool) -> Self {
        Self {
            state: None,
            validate_loaded_state,
        }
    }

    pub fn set_state(&mut self, state_and_round: StateAndRound) -> Option<()> {
        self.state = Some(state_and_round.state);
        None
    }

    /// Installs a state loaded at startup or reconnect, optionally
    /// validating that it was hashed before acceptance.
    pub fn override_state(&mut self, state: Reserved<SignedState>) -> Option<()> {
        if self.validate_loaded_state && state.hash().is_none() {
            warn!(round = state.round(), "rejecting unhashed loaded state");
            return None;
        }
        self.state = Some(state);
        None
    }

    pub fn current_round(&self) -> Option<u64> {
        self.state.as_ref().map(|state| state.round())
    }
}

/// Latest state known to have collected a complete signature set.
pub struct LatestCompleteStateNexus {
    state: Option<Reserved<SignedState>>,
}

impl LatestCompleteStateNexus {
    pub fn new() -> Self {
        Self { state: None }
    }

    /// Keeps the newest complete state, releasing the replaced one.
    pub fn set_state_if_newer(&mut self, state: Reserved<SignedState>) -> Option<()> {
        let newer = self
            .state
            .as_ref()
            .map_or(true, |current| state.round() > current.round());
        if newer {
            self.state = Some(state);
        }
        None
    }

    /// Drops a retained state that fell out of the window.
    pub fn update_event_window(&mut self, window: EventWindow) -> Option<()> {
        if let Some(state) = &self.state {
            if state.round() < window.ancient_threshold {
                self.state = None;
            }
        }
        None
    }

    pub fn current_round(&self) -> Option<u64> {
        self.state.as_ref().map(|state| state.round())
    }
}

impl Default for LatestCompleteStateNexus {
    fn default() -> Self {
        Self::new()
    }
}
