use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::counters::Counter;
use crate::error::WireError;

/// A counter that counts nothing.
///
/// Used by DIRECT, DIRECT_THREADSAFE, and NO_OP schedulers, which never hold
/// a queue and therefore have nothing to count or flush.
pub struct NoOpCounter;

#[async_trait]
impl Counter for NoOpCounter {
    fn name(&self) -> &str {
        "no-op"
    }

    async fn on_ramp(&self) {}

    async fn interruptable_on_ramp(&self, _token: &CancellationToken) -> Result<(), WireError> {
        Ok(())
    }

    fn attempt_on_ramp(&self) -> bool {
        true
    }

    fn force_on_ramp(&self) {}

    fn off_ramp(&self) {}

    fn count(&self) -> u64 {
        0
    }

    async fn wait_until_empty(&self) {}
}
