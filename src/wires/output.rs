//! # Typed exit points and the soldering surface.
//!
//! An output wire holds an ordered list of soldered sinks. Emission delivers
//! to the sinks one at a time, in solder order, awaiting each delivery before
//! the next: that per-item sequential walk is the mechanism behind
//! [`ordered_solder_to`](OutputWire::ordered_solder_to).
//!
//! The `build_*` methods grow the graph from an output wire: transformers,
//! filters, splitters, and reservation-aware advanced transformers all
//! register DIRECT vertices in the model so that they show up in the diagram
//! and participate in cycle validation.

use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::RwLock;
use tracing::trace;

use crate::model::ModelShared;
use crate::model::VertexKind;
use crate::schedulers::{RawHandler, SchedulerBuilder, SchedulerKind};
use crate::transformers::AdvancedTransformation;
use crate::wires::{InputWire, SolderKind};

/// Something an output wire can deliver values to.
pub(crate) trait SolderTarget<T>: Send + Sync {
    /// Delivers one value using the given solder kind; returns whether the
    /// value was accepted (only OFFER can refuse).
    fn deliver(&self, value: T, kind: SolderKind) -> BoxFuture<'static, bool>;

    fn scheduler_name(&self) -> &str;
}

impl<T: Send + 'static> SolderTarget<T> for InputWire<T> {
    fn deliver(&self, value: T, kind: SolderKind) -> BoxFuture<'static, bool> {
        let wire = self.clone();
        async move {
            match kind {
                SolderKind::Default => {
                    wire.put(value).await;
                    true
                }
                SolderKind::Inject => {
                    wire.inject(value).await;
                    true
                }
                SolderKind::Offer => wire.offer(value).await,
            }
        }
        .boxed()
    }

    fn scheduler_name(&self) -> &str {
        InputWire::scheduler_name(self)
    }
}

struct Sink<T> {
    kind: SolderKind,
    target: Arc<dyn SolderTarget<T>>,
}

impl<T> Clone for Sink<T> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            target: Arc::clone(&self.target),
        }
    }
}

/// Typed exit point of a scheduler or operator.
pub struct OutputWire<T> {
    source: String,
    sinks: Arc<RwLock<Vec<Sink<T>>>>,
    shared: Arc<ModelShared>,
}

impl<T> Clone for OutputWire<T> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            sinks: Arc::clone(&self.sinks),
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Send + 'static> OutputWire<T> {
    pub(crate) fn new(source: String, shared: Arc<ModelShared>) -> Self {
        Self {
            source,
            sinks: Arc::new(RwLock::new(Vec::new())),
            shared,
        }
    }

    /// Returns the name of the vertex this wire exits from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub(crate) fn shared(&self) -> &Arc<ModelShared> {
        &self.shared
    }

    /// Solders this output to an input wire.
    pub fn solder_to(&self, target: &InputWire<T>, kind: SolderKind) {
        self.shared.graph.record_edge(
            &self.source,
            target.scheduler_name(),
            target.name(),
            kind,
        );
        self.sinks.write().push(Sink {
            kind,
            target: Arc::new(target.clone()),
        });
    }

    /// Solders this output to a list of sinks with a guaranteed per-item
    /// delivery order: each emitted value reaches `targets[0]` before
    /// `targets[1]` is offered it, and so on.
    pub fn ordered_solder_to(&self, targets: &[&InputWire<T>]) {
        for target in targets {
            self.solder_to(target, SolderKind::Default);
        }
    }

    fn snapshot(&self) -> Vec<Sink<T>> {
        self.sinks.read().clone()
    }

    /// Delivers per-sink transformed values: `transform` runs once per sink,
    /// then `finish` consumes the original. Used by advanced transformers.
    pub(crate) async fn forward_transformed<A: 'static>(
        &self,
        input: A,
        transformation: Arc<dyn AdvancedTransformation<A, T>>,
    ) {
        for sink in self.snapshot() {
            if let Some(value) = transformation.transform(&input) {
                if !sink.target.deliver(value, sink.kind).await {
                    trace!(
                        source = %self.source,
                        sink = sink.target.scheduler_name(),
                        "offer dropped at capacity"
                    );
                }
            }
        }
        transformation.finish(input);
    }
}

impl<T: Clone + Send + 'static> OutputWire<T> {
    /// Delivers one value to every soldered sink, in solder order.
    pub(crate) async fn forward(&self, value: T) {
        let sinks = self.snapshot();
        let Some((last, rest)) = sinks.split_last() else {
            return;
        };
        for sink in rest {
            if !sink.target.deliver(value.clone(), sink.kind).await {
                trace!(
                    source = %self.source,
                    sink = sink.target.scheduler_name(),
                    "offer dropped at capacity"
                );
            }
        }
        if !last.target.deliver(value, last.kind).await {
            trace!(
                source = %self.source,
                sink = last.target.scheduler_name(),
                "offer dropped at capacity"
            );
        }
    }

    /// Builds a named 1→1 map soldered after this wire. The function may
    /// return `None` to drop a value.
    pub fn build_transformer<B: Clone + Send + 'static>(
        &self,
        name: &str,
        map: impl Fn(T) -> Option<B> + Send + Sync + 'static,
    ) -> OutputWire<B> {
        let scheduler = SchedulerBuilder::internal(Arc::clone(&self.shared), name)
            .with_kind(SchedulerKind::Direct)
            .build::<B>();
        let input = scheduler.input_wire("in", map);
        self.solder_to(&input, SolderKind::Default);
        scheduler.output_wire()
    }

    /// Builds a named predicate filter soldered after this wire. Dropped
    /// values are released by being dropped.
    pub fn build_filter(
        &self,
        name: &str,
        predicate: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> OutputWire<T> {
        self.build_transformer(name, move |value| {
            if predicate(&value) {
                Some(value)
            } else {
                None
            }
        })
    }

    /// Builds a reservation-aware fan-out stage: `transform` runs once per
    /// downstream sink (taking one reservation each for reservable values)
    /// and `finish` consumes the original after the fan-out.
    pub fn build_advanced_transformer<B: Send + 'static>(
        &self,
        name: &str,
        transformation: impl AdvancedTransformation<T, B>,
    ) -> OutputWire<B> {
        let scheduler = SchedulerBuilder::internal(Arc::clone(&self.shared), name)
            .with_kind(SchedulerKind::Direct)
            .build::<B>();
        let output = scheduler.output_wire();
        let transformation: Arc<dyn AdvancedTransformation<T, B>> = Arc::new(transformation);
        let forward_output = output.clone();
        let raw: RawHandler<T> = Arc::new(move |value: T| {
            let output = forward_output.clone();
            let transformation = Arc::clone(&transformation);
            async move { output.forward_transformed(value, transformation).await }.boxed()
        });
        let input = scheduler.raw_input_wire("in", raw);
        self.solder_to(&input, SolderKind::Default);
        output
    }
}

impl<E: Clone + Send + 'static> OutputWire<Vec<E>> {
    /// Builds a splitter: each emitted collection becomes one emission per
    /// element, in element order.
    pub fn build_splitter(&self, name: &str) -> OutputWire<E> {
        let scheduler = SchedulerBuilder::internal(Arc::clone(&self.shared), name)
            .with_kind(SchedulerKind::Direct)
            .build::<E>();
        let output = scheduler.output_wire();
        let forward_output = output.clone();
        let raw: RawHandler<Vec<E>> = Arc::new(move |batch: Vec<E>| {
            let output = forward_output.clone();
            async move {
                for element in batch {
                    output.forward(element).await;
                }
            }
            .boxed()
        });
        let input = scheduler.raw_input_wire("in", raw);
        self.solder_to(&input, SolderKind::Default);
        output
    }
}

/// An output wire fed directly by the embedder instead of a scheduler.
///
/// This is how external inputs (gossip traffic, replayed streams) enter the
/// graph: the embedder calls [`forward`](StandardOutputWire::forward) and the
/// value flows through every soldered sink under normal backpressure rules.
pub struct StandardOutputWire<T> {
    wire: OutputWire<T>,
}

impl<T> Clone for StandardOutputWire<T> {
    fn clone(&self) -> Self {
        Self {
            wire: self.wire.clone(),
        }
    }
}

impl<T: Clone + Send + 'static> StandardOutputWire<T> {
    pub(crate) fn new(name: &str, shared: Arc<ModelShared>) -> Self {
        shared.graph.register_vertex(name, VertexKind::Source, None);
        Self {
            wire: OutputWire::new(name.to_string(), shared),
        }
    }

    /// Emits one value to every soldered sink.
    pub async fn forward(&self, value: T) {
        self.wire.forward(value).await;
    }

    /// Returns the underlying output wire for soldering.
    pub fn output(&self) -> OutputWire<T> {
        self.wire.clone()
    }
}
