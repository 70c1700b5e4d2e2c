//! # Fan-out of runtime events to subscribers.
//!
//! One bounded queue and one worker per subscriber: a slow or panicking
//! subscriber only ever affects itself, and [`SubscriberSet::emit`] never
//! blocks the publisher. When a queue is full the event is dropped for that
//! subscriber and a `SubscriberOverflow` is published; events that are
//! themselves subscriber diagnostics are exempt, since reporting their loss
//! would feed the overflow forever.

use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::describe_panic;
use crate::events::{Bus, RuntimeEvent};
use crate::subscribers::Subscribe;

/// The delivery side of one subscriber: its queue plus the worker draining
/// it.
struct Outlet {
    name: &'static str,
    queue: mpsc::Sender<Arc<RuntimeEvent>>,
    worker: JoinHandle<()>,
}

/// Owns the per-subscriber queues and workers.
pub struct SubscriberSet {
    outlets: Vec<Outlet>,
    bus: Bus,
}

impl SubscriberSet {
    /// Spawns one worker per subscriber. Workers run until the set is shut
    /// down or dropped.
    #[must_use]
    pub fn new(subscribers: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let outlets = subscribers
            .into_iter()
            .map(|subscriber| Self::spawn_worker(subscriber, bus.clone()))
            .collect();
        Self { outlets, bus }
    }

    fn spawn_worker(subscriber: Arc<dyn Subscribe>, bus: Bus) -> Outlet {
        let name = subscriber.name();
        let (queue, mut incoming) =
            mpsc::channel::<Arc<RuntimeEvent>>(subscriber.queue_capacity().max(1));
        let worker = tokio::spawn(async move {
            while let Some(event) = incoming.recv().await {
                let delivery = subscriber.on_event(event.as_ref());
                if let Err(payload) = std::panic::AssertUnwindSafe(delivery).catch_unwind().await
                {
                    bus.publish(RuntimeEvent::subscriber_panicked(
                        subscriber.name(),
                        describe_panic(&payload),
                    ));
                }
            }
        });
        Outlet {
            name,
            queue,
            worker,
        }
    }

    /// Delivers an event to every subscriber queue without blocking.
    pub fn emit(&self, event: Arc<RuntimeEvent>) {
        for outlet in &self.outlets {
            let Err(refused) = outlet.queue.try_send(Arc::clone(&event)) else {
                continue;
            };
            if event.is_subscriber_internal() {
                continue;
            }
            let reason = match refused {
                mpsc::error::TrySendError::Full(_) => "full",
                mpsc::error::TrySendError::Closed(_) => "closed",
            };
            self.bus
                .publish(RuntimeEvent::subscriber_overflow(outlet.name, reason));
        }
    }

    /// Closes every queue and waits for the workers to drain.
    pub async fn shutdown(self) {
        for Outlet { queue, worker, .. } in self.outlets {
            drop(queue);
            let _ = worker.await;
        }
    }
}
