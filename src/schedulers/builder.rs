//! # Scheduler builder.
//!
//! Fluent construction of schedulers inside a model:
//!
//! ```no_run
//! # use wirevisor::{WiringModelBuilder, SchedulerKind};
//! # async fn demo() {
//! let model = WiringModelBuilder::new().build();
//! let scheduler = model
//!     .scheduler_builder("consensusEngine")
//!     .with_kind(SchedulerKind::Sequential)
//!     .with_unhandled_capacity(500)
//!     .with_flushing_enabled(true)
//!     .with_squelching_enabled(true)
//!     .build::<u64>();
//! # }
//! ```
//!
//! Counters default per kind: SEQUENTIAL/CONCURRENT get a backpressure
//! counter when a capacity is set (a plain counter otherwise); DIRECT-family
//! and NO_OP schedulers count nothing. The `with_on_ramp` / `with_off_ramp`
//! overrides exist for joint-flush pairs that span one counter across two
//! schedulers.

use std::sync::Arc;
use std::time::Duration;

use crate::config::SchedulerConfig;
use crate::counters::{BackpressureCounter, Counter, NoOpCounter, StandardCounter};
use crate::model::{ModelShared, VertexKind};
use crate::schedulers::{SchedulerCore, SchedulerKind, TaskScheduler};
use crate::wires::OutputWire;

const DEFAULT_PARK_INTERVAL: Duration = Duration::from_micros(100);

/// Fluent builder for a scheduler registered in a model.
pub struct SchedulerBuilder {
    shared: Arc<ModelShared>,
    name: String,
    kind: SchedulerKind,
    capacity: Option<usize>,
    park_interval: Duration,
    flushable: bool,
    squelchable: bool,
    hyperlink: Option<String>,
    on_ramp: Option<Arc<dyn Counter>>,
    off_ramp: Option<Arc<dyn Counter>>,
}

impl SchedulerBuilder {
    pub(crate) fn internal(shared: Arc<ModelShared>, name: &str) -> Self {
        Self {
            shared,
            name: name.to_string(),
            kind: SchedulerKind::Sequential,
            capacity: None,
            park_interval: DEFAULT_PARK_INTERVAL,
            flushable: false,
            squelchable: false,
            hyperlink: None,
            on_ramp: None,
            off_ramp: None,
        }
    }

    /// Sets the execution policy.
    pub fn with_kind(mut self, kind: SchedulerKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the capacity above which submitters park (None = unbounded).
    pub fn with_unhandled_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Sets the park interval used while waiting for capacity.
    pub fn with_park_interval(mut self, park: Duration) -> Self {
        self.park_interval = park;
        self
    }

    /// Enables `flush()` on the built scheduler.
    pub fn with_flushing_enabled(mut self, flushable: bool) -> Self {
        self.flushable = flushable;
        self
    }

    /// Enables squelching on the built scheduler.
    pub fn with_squelching_enabled(mut self, squelchable: bool) -> Self {
        self.squelchable = squelchable;
        self
    }

    /// Attaches a documentation hyperlink shown in the model diagram.
    pub fn with_hyperlink(mut self, hyperlink: impl Into<String>) -> Self {
        self.hyperlink = Some(hyperlink.into());
        self
    }

    /// Overrides the on-ramp counter (joint-flush pairs).
    pub fn with_on_ramp(mut self, counter: Arc<dyn Counter>) -> Self {
        self.on_ramp = Some(counter);
        self
    }

    /// Overrides the off-ramp counter (joint-flush pairs).
    pub fn with_off_ramp(mut self, counter: Arc<dyn Counter>) -> Self {
        self.off_ramp = Some(counter);
        self
    }

    /// Applies a [`SchedulerConfig`] in one step.
    pub fn with_config(mut self, config: &SchedulerConfig) -> Self {
        self.kind = config.kind;
        self.capacity = config.unhandled_capacity;
        self.flushable = config.flushable;
        self.squelchable = config.squelchable;
        self
    }

    fn default_counter(&self) -> Arc<dyn Counter> {
        if !self.kind.holds_queue() {
            return Arc::new(NoOpCounter);
        }
        match self.capacity {
            Some(capacity) => Arc::new(BackpressureCounter::new(
                self.name.clone(),
                capacity,
                self.park_interval,
            )),
            None => Arc::new(StandardCounter::new(self.name.clone())),
        }
    }

    /// Builds and registers the scheduler.
    ///
    /// Defects (duplicate names) are recorded in the model and surface from
    /// `start()`.
    pub fn build<Out: Send + 'static>(self) -> TaskScheduler<Out> {
        // Overriding one ramp pairs the other with a no-op counter: that is
        // what lets one shared counter span a scheduler pair, on-ramping at
        // the first and off-ramping at the second.
        let (on_ramp, off_ramp): (Arc<dyn Counter>, Arc<dyn Counter>) =
            match (self.on_ramp.clone(), self.off_ramp.clone()) {
                (None, None) => {
                    let counter = self.default_counter();
                    (Arc::clone(&counter), counter)
                }
                (Some(on), None) => (on, Arc::new(NoOpCounter) as Arc<dyn Counter>),
                (None, Some(off)) => (Arc::new(NoOpCounter) as Arc<dyn Counter>, off),
                (Some(on), Some(off)) => (on, off),
            };

        self.shared.graph.register_vertex(
            &self.name,
            VertexKind::Scheduler(self.kind),
            self.hyperlink,
        );

        let core = Arc::new(SchedulerCore::new(
            self.name.clone(),
            self.kind,
            on_ramp,
            off_ramp,
            self.flushable,
            self.squelchable,
            self.shared.bus.clone(),
            self.shared.token.clone(),
        ));
        if self.kind == SchedulerKind::Sequential {
            self.shared.workers.lock().push(Arc::clone(&core));
        }
        let output = OutputWire::new(self.name, Arc::clone(&self.shared));
        TaskScheduler::new(core, output)
    }
}
