use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::counters::Counter;
use crate::error::WireError;

/// A counter without a capacity: on-ramps never park.
///
/// Still supports `wait_until_empty`, which is what `flush()` builds on.
pub struct StandardCounter {
    name: String,
    count: AtomicU64,
    empty: Notify,
}

impl StandardCounter {
    /// Creates a named counter starting at zero.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            count: AtomicU64::new(0),
            empty: Notify::new(),
        }
    }
}

#[async_trait]
impl Counter for StandardCounter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn on_ramp(&self) {
        self.count.fetch_add(1, Ordering::AcqRel);
    }

    async fn interruptable_on_ramp(&self, _token: &CancellationToken) -> Result<(), WireError> {
        self.count.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    fn attempt_on_ramp(&self) -> bool {
        self.count.fetch_add(1, Ordering::AcqRel);
        true
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn counts_ramps() {
        let counter = StandardCounter::new("test");
        counter.on_ramp().await;
        counter.on_ramp().await;
        assert_eq!(counter.count(), 2);
        counter.off_ramp();
        assert_eq!(counter.count(), 1);
    }

    #[tokio::test]
    async fn wait_until_empty_returns_after_last_off_ramp() {
        let counter = Arc::new(StandardCounter::new("test"));
        counter.on_ramp().await;

        let waiter = {
            let counter = Arc::clone(&counter);
            tokio::spawn(async move { counter.wait_until_empty().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        counter.off_ramp();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should finish")
            .expect("waiter should not panic");
    }

    #[tokio::test]
    async fn wait_until_empty_returns_immediately_when_empty() {
        let counter = StandardCounter::new("test");
        counter.wait_until_empty().await;
    }
}
