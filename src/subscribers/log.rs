use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::events::{RuntimeEvent, RuntimeEventKind};
use crate::subscribers::Subscribe;

/// Built-in subscriber that forwards runtime events into `tracing`.
///
/// Failure events land at `error`, squelch/flush activity at `debug`, model
/// lifecycle at `info`. Attach it when the embedder has no custom reporter.
pub struct TracingSubscriber;

#[async_trait]
impl Subscribe for TracingSubscriber {
    async fn on_event(&self, event: &RuntimeEvent) {
        let scheduler = event.scheduler.as_deref().unwrap_or("-");
        let detail = event.detail.as_deref().unwrap_or("");
        match event.kind {
            RuntimeEventKind::ModelStarted => info!(seq = event.seq, "wiring model started"),
            RuntimeEventKind::ModelStopped => info!(seq = event.seq, "wiring model stopped"),
            RuntimeEventKind::HandlerPanicked => {
                error!(scheduler, detail, "handler panicked; task retired")
            }
            RuntimeEventKind::SubscriberPanicked => {
                error!(scheduler, detail, "subscriber panicked")
            }
            RuntimeEventKind::SubscriberOverflow => warn!(detail, "subscriber dropped an event"),
            RuntimeEventKind::OfferRejected => {
                debug!(scheduler, detail, "offer rejected at capacity")
            }
            RuntimeEventKind::SquelchStarted => debug!(scheduler, "squelching started"),
            RuntimeEventKind::SquelchStopped => debug!(scheduler, "squelching stopped"),
            RuntimeEventKind::FlushCompleted => debug!(scheduler, "flush completed"),
        }
    }

    fn name(&self) -> &'static str {
        "tracing"
    }
}
