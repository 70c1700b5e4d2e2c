use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::BuildError;
use crate::events::{Bus, RuntimeEvent, RuntimeEventKind};
use crate::model::diagram;
use crate::model::graph::{VertexKind, WiringGraph};
use crate::model::heartbeat::Heartbeat;
use crate::schedulers::{SchedulerBuilder, SchedulerCore};
use crate::subscribers::{Subscribe, SubscriberSet};
use crate::wires::{OutputWire, StandardOutputWire};

/// Everything the model shares with the schedulers and wires it creates.
pub(crate) struct ModelShared {
    pub(crate) graph: WiringGraph,
    pub(crate) bus: Bus,
    pub(crate) token: CancellationToken,
    /// Sequential schedulers whose workers start with the model.
    pub(crate) workers: Mutex<Vec<Arc<SchedulerCore>>>,
    heartbeats: Mutex<Vec<Heartbeat>>,
    heartbeat_counter: AtomicUsize,
    started: AtomicBool,
}

/// Builder for [`WiringModel`].
pub struct WiringModelBuilder {
    bus_capacity: usize,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl Default for WiringModelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl WiringModelBuilder {
    /// Creates a builder with a 1024-event bus and no subscribers.
    pub fn new() -> Self {
        Self {
            bus_capacity: 1024,
            subscribers: Vec::new(),
        }
    }

    /// Sets the runtime event bus capacity.
    pub fn with_bus_capacity(mut self, capacity: usize) -> Self {
        self.bus_capacity = capacity;
        self
    }

    /// Attaches a runtime event subscriber.
    pub fn with_subscriber(mut self, subscriber: impl Subscribe) -> Self {
        self.subscribers.push(Arc::new(subscriber));
        self
    }

    /// Builds the model. Must run inside a tokio runtime: subscriber workers
    /// spawn immediately.
    pub fn build(self) -> WiringModel {
        let bus = Bus::new(self.bus_capacity);
        let subscriber_set = Arc::new(SubscriberSet::new(self.subscribers, bus.clone()));
        WiringModel {
            shared: Arc::new(ModelShared {
                graph: WiringGraph::new(),
                bus,
                token: CancellationToken::new(),
                workers: Mutex::new(Vec::new()),
                heartbeats: Mutex::new(Vec::new()),
                heartbeat_counter: AtomicUsize::new(0),
                started: AtomicBool::new(false),
            }),
            subscriber_set,
        }
    }
}

/// Registry and lifecycle owner of the whole wiring graph.
///
/// There is no global instance: the model is passed explicitly to everything
/// that wires into it.
pub struct WiringModel {
    shared: Arc<ModelShared>,
    subscriber_set: Arc<SubscriberSet>,
}

impl WiringModel {
    /// Starts building a scheduler registered in this model.
    pub fn scheduler_builder(&self, name: &str) -> SchedulerBuilder {
        SchedulerBuilder::internal(Arc::clone(&self.shared), name)
    }

    /// Builds a heartbeat: a periodic source emitting the tick instant.
    pub fn heartbeat(&self, period: Duration) -> OutputWire<Instant> {
        let n = self.shared.heartbeat_counter.fetch_add(1, Ordering::Relaxed);
        let name = format!("heartbeat-{}ms-{n}", period.as_millis());
        self.shared
            .graph
            .register_vertex(&name, VertexKind::Heartbeat, None);
        let output = OutputWire::new(name, Arc::clone(&self.shared));
        self.shared.heartbeats.lock().push(Heartbeat {
            period,
            output: output.clone(),
        });
        output
    }

    /// Builds an output wire fed by the embedder rather than a scheduler.
    pub fn standard_output_wire<T: Clone + Send + 'static>(
        &self,
        name: &str,
    ) -> StandardOutputWire<T> {
        StandardOutputWire::new(name, Arc::clone(&self.shared))
    }

    /// Validates the graph and starts workers, heartbeats, and the
    /// subscriber listener.
    pub fn start(&self) -> Result<(), BuildError> {
        if self.shared.started.swap(true, Ordering::AcqRel) {
            return Err(BuildError::AlreadyStarted);
        }
        self.shared.graph.validate()?;

        for core in self.shared.workers.lock().iter() {
            core.start_worker();
        }
        for heartbeat in self.shared.heartbeats.lock().iter() {
            heartbeat.spawn(self.shared.token.clone());
        }
        self.spawn_subscriber_listener();

        let vertices = self.shared.graph.vertices.len();
        let edges = self.shared.graph.edges.lock().len();
        info!(vertices, edges, "wiring model started");
        self.shared
            .bus
            .publish(RuntimeEvent::now(RuntimeEventKind::ModelStarted));
        Ok(())
    }

    /// Stops the model: in-flight tasks finish, queued tasks are discarded,
    /// parked on-ramps abort.
    pub fn stop(&self) {
        self.shared
            .bus
            .publish(RuntimeEvent::now(RuntimeEventKind::ModelStopped));
        self.shared.token.cancel();
    }

    /// Subscribes to the raw runtime event stream.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<RuntimeEvent> {
        self.shared.bus.subscribe()
    }

    /// Renders the graph as a mermaid flowchart.
    pub fn diagram(&self) -> String {
        diagram::render(&self.shared.graph)
    }

    fn spawn_subscriber_listener(&self) {
        let mut rx = self.shared.bus.subscribe();
        let token = self.shared.token.clone();
        let set = Arc::clone(&self.subscriber_set);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    event = rx.recv() => match event {
                        Ok(event) => set.emit(Arc::new(event)),
                        Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                    },
                }
            }
        });
    }
}
