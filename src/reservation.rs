//! # Reservation counting for shared values.
//!
//! A [`Reserved<T>`] handle represents one reservation on a shared value.
//! Taking another reservation ([`reserve`](Reserved::reserve), or equivalently
//! `clone`) increments the count; dropping a handle releases it. Because
//! release rides on `Drop`, the discipline "a filter that drops a value must
//! release its reservation" holds by construction: dropping the handle *is*
//! the release. Double releases are unrepresentable through the API, and the
//! disposal of the underlying value audits the count: anything other than
//! zero at that point means the release discipline was broken somewhere,
//! and the imbalance is logged as a reservation leak. The report does not
//! tear down the pipeline.
//!
//! Fan-out interacts with reservations in two ways:
//! - Plain soldering clones the handle per sink, taking one reservation each.
//! - An advanced transformer takes its reservations explicitly via
//!   [`AdvancedTransformation::transform`](crate::transformers::AdvancedTransformation),
//!   which lets the stage observe or rename each handle as it fans out.

use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::error;

struct ReservationInner<T> {
    value: T,
    reservations: AtomicU64,
}

impl<T> Drop for ReservationInner<T> {
    fn drop(&mut self) {
        // Disposal audit: every handle has released by now, so a nonzero
        // count means an unmatched reservation somewhere.
        let remaining = *self.reservations.get_mut();
        if remaining != 0 {
            error!(remaining, "reservations outstanding at value disposal");
        }
    }
}

/// One reservation on a shared value.
pub struct Reserved<T> {
    inner: Arc<ReservationInner<T>>,
}

impl<T> Reserved<T> {
    /// Wraps a value with an initial reservation held by the caller.
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(ReservationInner {
                value,
                reservations: AtomicU64::new(1),
            }),
        }
    }

    /// Takes an additional reservation.
    pub fn reserve(&self) -> Self {
        self.inner.reservations.fetch_add(1, Ordering::AcqRel);
        Self {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Number of outstanding reservations.
    pub fn reservation_count(&self) -> u64 {
        self.inner.reservations.load(Ordering::Acquire)
    }

    /// Borrows the underlying value.
    pub fn get(&self) -> &T {
        &self.inner.value
    }
}

impl<T> Deref for Reserved<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner.value
    }
}

impl<T> Clone for Reserved<T> {
    /// Cloning takes a reservation.
    fn clone(&self) -> Self {
        self.reserve()
    }
}

impl<T> Drop for Reserved<T> {
    fn drop(&mut self) {
        let previous = self.inner.reservations.fetch_sub(1, Ordering::AcqRel);
        if previous == 0 {
            error!("reservation released more times than taken");
            debug_assert!(false, "reservation count underflow");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserve_and_drop_balance() {
        let original = Reserved::new(17u64);
        assert_eq!(original.reservation_count(), 1);

        let extra = original.reserve();
        let cloned = original.clone();
        assert_eq!(original.reservation_count(), 3);
        assert_eq!(*extra, 17);

        drop(extra);
        drop(cloned);
        assert_eq!(original.reservation_count(), 1);
    }
}
