//! # Typed wiring around one component.
//!
//! `ComponentWiring<C, Out>` owns the scheduler of component `C` and a
//! late-bound cell holding the instance. Input wires are created from plain
//! method references:
//!
//! ```text
//! let wiring: ComponentWiring<EventDeduplicator, Event> = ...;
//! let input = wiring.input_wire("handleEvent", EventDeduplicator::handle_event);
//! // solder things into `input`; later:
//! wiring.bind(EventDeduplicator::new(...));
//! ```
//!
//! Sequential and direct schedulers hand the handler `&mut C`; CONCURRENT
//! schedulers use [`shared_input_wire`](ComponentWiring::shared_input_wire)
//! with `&C`, so stateless components run genuinely in parallel.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::error;

use crate::config::SchedulerConfig;
use crate::error::WireError;
use crate::model::WiringModel;
use crate::schedulers::TaskScheduler;
use crate::wires::{InputWire, OutputWire};

/// A scheduler plus the late-bound component it executes.
pub struct ComponentWiring<C, Out> {
    scheduler: TaskScheduler<Out>,
    cell: Arc<RwLock<Option<C>>>,
}

impl<C, Out> Clone for ComponentWiring<C, Out> {
    fn clone(&self) -> Self {
        Self {
            scheduler: self.scheduler.clone(),
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<C: Send + Sync + 'static, Out: Clone + Send + 'static> ComponentWiring<C, Out> {
    /// Builds the component's scheduler from a [`SchedulerConfig`].
    pub fn new(model: &WiringModel, name: &str, config: &SchedulerConfig) -> Self {
        let scheduler = model
            .scheduler_builder(name)
            .with_config(config)
            .build::<Out>();
        Self::with_scheduler(scheduler)
    }

    /// Wraps an already-built scheduler (joint-flush pairs with shared
    /// counters build theirs by hand).
    pub fn with_scheduler(scheduler: TaskScheduler<Out>) -> Self {
        scheduler.mark_component();
        Self {
            scheduler,
            cell: Arc::new(RwLock::new(None)),
        }
    }

    /// Creates an input wire delivering to a `&mut self` component method.
    pub fn input_wire<In: Send + 'static>(
        &self,
        name: &str,
        handler: impl Fn(&mut C, In) -> Option<Out> + Send + Sync + 'static,
    ) -> InputWire<In> {
        let cell = Arc::clone(&self.cell);
        let scheduler_name = self.scheduler.name().to_string();
        self.scheduler.input_wire(name, move |input: In| {
            let mut guard = cell.write();
            match guard.as_mut() {
                Some(component) => handler(component, input),
                None => {
                    error!(scheduler = %scheduler_name, "input delivered to unbound component");
                    None
                }
            }
        })
    }

    /// Supplies the component instance. Call once, before the model starts;
    /// a second bind is a build defect and the second instance is rejected.
    pub fn bind(&self, component: C) {
        let mut guard = self.cell.write();
        if guard.is_some() {
            drop(guard);
            self.scheduler.record_double_bind();
            return;
        }
        *guard = Some(component);
        drop(guard);
        self.scheduler.mark_bound();
    }

    /// The component's output wire.
    pub fn output_wire(&self) -> OutputWire<Out> {
        self.scheduler.output_wire()
    }

    /// The underlying scheduler.
    pub fn scheduler(&self) -> &TaskScheduler<Out> {
        &self.scheduler
    }

    /// Blocks until every accepted task has retired.
    pub async fn flush(&self) -> Result<(), WireError> {
        self.scheduler.flush().await
    }

    /// Starts discarding inputs without invoking handlers.
    pub fn start_squelching(&self) -> Result<(), WireError> {
        self.scheduler.start_squelching()
    }

    /// Stops discarding inputs.
    pub fn stop_squelching(&self) -> Result<(), WireError> {
        self.scheduler.stop_squelching()
    }
}

impl<C: Send + Sync + 'static, Out: Clone + Send + 'static> ComponentWiring<C, Out> {
    /// Creates an input wire delivering to a `&self` component method.
    ///
    /// This is the shape for CONCURRENT schedulers: handlers run in parallel,
    /// so the component synchronizes internally or stays stateless.
    pub fn shared_input_wire<In: Send + 'static>(
        &self,
        name: &str,
        handler: impl Fn(&C, In) -> Option<Out> + Send + Sync + 'static,
    ) -> InputWire<In> {
        let cell = Arc::clone(&self.cell);
        let scheduler_name = self.scheduler.name().to_string();
        self.scheduler.input_wire(name, move |input: In| {
            let guard = cell.read();
            match guard.as_ref() {
                Some(component) => handler(component, input),
                None => {
                    error!(scheduler = %scheduler_name, "input delivered to unbound component");
                    None
                }
            }
        })
    }
}
