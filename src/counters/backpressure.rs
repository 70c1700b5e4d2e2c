use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::counters::Counter;
use crate::error::WireError;

/// A counter with a capacity: on-ramps park while the count is at capacity.
///
/// Parked callers wake on the next off-ramp or after the park interval,
/// whichever comes first. A small random jitter is added to the park so that
/// a crowd of parked submitters does not retry in lockstep.
pub struct BackpressureCounter {
    name: String,
    count: AtomicU64,
    capacity: u64,
    park: Duration,
    empty: Notify,
    freed: Notify,
}

impl BackpressureCounter {
    /// Creates a named counter with the given capacity and park interval.
    pub fn new(name: impl Into<String>, capacity: usize, park: Duration) -> Self {
        Self {
            name: name.into(),
            count: AtomicU64::new(0),
            capacity: capacity.max(1) as u64,
            park,
            empty: Notify::new(),
            freed: Notify::new(),
        }
    }

    /// Returns the configured capacity.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    fn park_with_jitter(&self) -> Duration {
        let jitter = rand::thread_rng().gen_range(0.0..0.25);
        self.park + self.park.mul_f64(jitter)
    }

    /// One park cycle: sleeps for the park interval unless an off-ramp frees
    /// capacity sooner.
    async fn park(&self) {
        let _ = tokio::time::timeout(self.park_with_jitter(), self.freed.notified()).await;
    }
}

#[async_trait]
impl Counter for BackpressureCounter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn on_ramp(&self) {
        loop {
            if self.attempt_on_ramp() {
                return;
            }
            self.park().await;
        }
    }

    async fn interruptable_on_ramp(&self, token: &CancellationToken) -> Result<(), WireError> {
        loop {
            if self.attempt_on_ramp() {
                return Ok(());
            }
            tokio::select! {
                _ = token.cancelled() => return Err(WireError::Canceled),
                _ = self.park() => {}
            }
        }
    }

    fn attempt_on_ramp(&self) -> bool {
        let mut current = self.count.load(Ordering::Acquire);
        loop {
            if current >= self.capacity {
                return false;
            }
            match self.count.compare_exchange(
                current,
                current + 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(actual) => current = actual,
            }
        }
    }

    fn force_on_ramp(&self) {
        self.count.fetch_add(1, Ordering::AcqRel);
    }

    fn off_ramp(&self) {
        let previous = self.count.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(previous > 0, "counter '{}' off-ramped below zero", self.name);
        if previous == 1 {
            self.empty.notify_waiters();
        }
        self.freed.notify_one();
    }

    fn count(&self) -> u64 {
        self.count.load(Ordering::Acquire)
    }

    async fn wait_until_empty(&self) {
        loop {
            let mut notified = std::pin::pin!(self.empty.notified());
            notified.as_mut().enable();
            if self.count.load(Ordering::Acquire) == 0 {
                return;
            }
            notified.await;
        }
    }
}
