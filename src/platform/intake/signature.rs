//! # Event signing and signature validation.
//!
//! The cryptographic scheme is a collaborator, not part of the core: the
//! [`Signer`] and [`SignatureVerifier`] traits are the seam, and
//! [`DigestSigner`] is the matching test-grade default (a keyed digest over
//! the event hash). Production deployments bind real implementations.

use std::sync::Arc;

use bytes::Bytes;
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::config::AncientMode;
use crate::platform::event::{Event, EventHash, EventWindow, NodeId};

/// Produces the signature for a self event.
pub trait Signer: Send + Sync + 'static {
    fn sign(&self, hash: &EventHash, creator: NodeId) -> Bytes;
}

/// Verifies the signature of an event against its creator.
pub trait SignatureVerifier: Send + Sync + 'static {
    fn verify(&self, event: &Event) -> bool;
}

/// Deterministic digest-based scheme: sign and verify agree by recomputing
/// the same keyed digest. Not cryptography; a stand-in with the right shape.
pub struct DigestSigner;

impl DigestSigner {
    fn digest(hash: &EventHash, creator: NodeId) -> Bytes {
        let mut digest = Sha256::new();
        digest.update(hash.as_bytes());
        digest.update(creator.to_be_bytes());
        digest.update(b"event-signature");
        Bytes::copy_from_slice(&digest.finalize())
    }
}

impl Signer for DigestSigner {
    fn sign(&self, hash: &EventHash, creator: NodeId) -> Bytes {
        Self::digest(hash, creator)
    }
}

impl SignatureVerifier for DigestSigner {
    fn verify(&self, event: &Event) -> bool {
        let (Some(hash), Some(signature)) = (event.hash(), event.signature()) else {
            return false;
        };
        *signature == Self::digest(&hash, event.creator())
    }
}

/// Drops events whose signature does not verify, and ancient events.
pub struct EventSignatureValidator {
    verifier: Arc<dyn SignatureVerifier>,
    window: EventWindow,
    force_ignore_signatures: bool,
}

impl EventSignatureValidator {
    pub fn new(
        verifier: Arc<dyn SignatureVerifier>,
        mode: AncientMode,
        force_ignore_signatures: bool,
    ) -> Self {
        Self {
            verifier,
            window: EventWindow::genesis(mode),
            force_ignore_signatures,
        }
    }

    pub fn validate_signature(&mut self, event: Event) -> Option<Event> {
        if self.window.is_ancient(&event) {
            return None;
        }
        if self.force_ignore_signatures || self.verifier.verify(&event) {
            Some(event)
        } else {
            warn!(?event, "invalid event signature");
            None
        }
    }

    pub fn set_event_window(&mut self, window: EventWindow) {
        self.window = window;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::intake::EventHasher;

    fn signed_event(creator: NodeId) -> Event {
        let event = Event::builder(creator).with_generation(1).build();
        let hash = EventHasher::compute(&event);
        event.set_hash(hash);
        event.set_signature(DigestSigner.sign(&hash, creator));
        event
    }

    #[test]
    fn valid_signature_passes() {
        let mut validator = EventSignatureValidator::new(
            Arc::new(DigestSigner),
            AncientMode::GenerationThreshold,
            false,
        );
        assert!(validator.validate_signature(signed_event(3)).is_some());
    }

    #[test]
    fn missing_signature_fails_unless_ignored() {
        let event = Event::builder(3).build();
        event.set_hash(EventHasher::compute(&event));

        let mut strict = EventSignatureValidator::new(
            Arc::new(DigestSigner),
            AncientMode::GenerationThreshold,
            false,
        );
        assert!(strict.validate_signature(event.clone()).is_none());

        let mut lenient = EventSignatureValidator::new(
            Arc::new(DigestSigner),
            AncientMode::GenerationThreshold,
            true,
        );
        assert!(lenient.validate_signature(event).is_some());
    }
}
