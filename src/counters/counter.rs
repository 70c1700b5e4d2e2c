use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::WireError;

/// Non-negative count of in-flight tasks, with optional backpressure.
///
/// Implementations are shared behind `Arc<dyn Counter>`; a single counter may
/// serve as the on-ramp of one scheduler and the off-ramp of another.
#[async_trait]
pub trait Counter: Send + Sync + 'static {
    /// Returns the counter's name, used in logs and the model diagram.
    fn name(&self) -> &str;

    /// Increments the count. Parks for the configured interval and retries
    /// while the counter is at capacity.
    async fn on_ramp(&self);

    /// Same as [`on_ramp`](Counter::on_ramp), but aborts the park when the
    /// token fires.
    async fn interruptable_on_ramp(&self, token: &CancellationToken) -> Result<(), WireError>;

    /// Best-effort increment: returns whether the increment happened, without
    /// ever parking.
    fn attempt_on_ramp(&self) -> bool;

    /// Increments regardless of capacity. Used by INJECT solders.
    fn force_on_ramp(&self);

    /// Decrements the count. Must be matched 1:1 with an on-ramp.
    fn off_ramp(&self);

    /// Snapshot of the current count.
    fn count(&self) -> u64;

    /// Blocks until the count reaches zero.
    async fn wait_until_empty(&self);
}
