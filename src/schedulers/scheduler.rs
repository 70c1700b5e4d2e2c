//! # Typed scheduler facade.
//!
//! [`TaskScheduler<Out>`] is what wiring code holds: it creates typed input
//! wires bound to handlers, exposes the scheduler's output wire, and carries
//! the lifecycle operations (flush, squelch) the coordinator drives.

use std::sync::Arc;

use futures::FutureExt;

use crate::error::WireError;
use crate::events::{RuntimeEvent, RuntimeEventKind};
use crate::schedulers::{RawHandler, SchedulerCore, SchedulerKind};
use crate::wires::{InputWire, OutputWire};

/// A scheduler with a typed output.
///
/// Cheap to clone; all clones share the same scheduler.
pub struct TaskScheduler<Out> {
    core: Arc<SchedulerCore>,
    output: OutputWire<Out>,
}

impl<Out> Clone for TaskScheduler<Out> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
            output: self.output.clone(),
        }
    }
}

impl<Out: Send + 'static> TaskScheduler<Out> {
    pub(crate) fn new(core: Arc<SchedulerCore>, output: OutputWire<Out>) -> Self {
        Self { core, output }
    }

    /// Returns the scheduler name.
    pub fn name(&self) -> &str {
        self.core.name()
    }

    /// Returns the execution policy.
    pub fn kind(&self) -> SchedulerKind {
        self.core.kind
    }

    /// Returns this scheduler's output wire.
    pub fn output_wire(&self) -> OutputWire<Out> {
        self.output.clone()
    }

    /// Number of tasks accepted but not yet retired.
    pub fn unprocessed_task_count(&self) -> u64 {
        self.core.on_ramp.count()
    }

    /// Marks this scheduler as a component vertex requiring a bind.
    pub(crate) fn mark_component(&self) {
        self.output.shared().graph.mark_component(self.core.name());
    }

    /// Marks this scheduler's component vertex as bound.
    pub(crate) fn mark_bound(&self) {
        self.output.shared().graph.mark_bound(self.core.name());
    }

    /// Records a double-bind defect against this scheduler's vertex.
    pub(crate) fn record_double_bind(&self) {
        self.output
            .shared()
            .graph
            .record_defect(crate::error::BuildError::DoubleBind {
                name: self.core.name().to_string(),
            });
    }

    /// Creates an input wire from an already-composed task body. Used by
    /// operators that emit more than one value per input.
    pub(crate) fn raw_input_wire<In: Send + 'static>(
        &self,
        name: &str,
        raw: RawHandler<In>,
    ) -> InputWire<In> {
        InputWire::new(name.to_string(), Arc::clone(&self.core), self.core.wrap(raw))
    }

    /// Blocks until every accepted task has retired.
    ///
    /// Requires the scheduler to have been built with flushing enabled.
    pub async fn flush(&self) -> Result<(), WireError> {
        if !self.core.flushable {
            return Err(WireError::NotFlushable {
                scheduler: self.core.name().to_string(),
            });
        }
        self.core.on_ramp.wait_until_empty().await;
        self.core.bus().publish(
            RuntimeEvent::now(RuntimeEventKind::FlushCompleted).with_scheduler(self.core.name()),
        );
        Ok(())
    }

    /// Starts discarding inputs without invoking the handler. Tasks already
    /// inside their handler complete; squelched tasks still off-ramp.
    pub fn start_squelching(&self) -> Result<(), WireError> {
        if !self.core.squelchable {
            return Err(WireError::NotSquelchable {
                scheduler: self.core.name().to_string(),
            });
        }
        self.core.set_squelched(true);
        Ok(())
    }

    /// Stops discarding inputs.
    pub fn stop_squelching(&self) -> Result<(), WireError> {
        if !self.core.squelchable {
            return Err(WireError::NotSquelchable {
                scheduler: self.core.name().to_string(),
            });
        }
        self.core.set_squelched(false);
        Ok(())
    }
}

impl<Out: Clone + Send + 'static> TaskScheduler<Out> {
    /// Creates an input wire whose handler may emit one value per input.
    ///
    /// The handler runs under the scheduler's execution policy; a `Some`
    /// return fans out to every sink soldered to the scheduler's output
    /// wire before the task retires.
    pub fn input_wire<In: Send + 'static>(
        &self,
        name: &str,
        handler: impl Fn(In) -> Option<Out> + Send + Sync + 'static,
    ) -> InputWire<In> {
        let output = self.output.clone();
        let handler = Arc::new(handler);
        let raw: RawHandler<In> = Arc::new(move |value: In| {
            let output = output.clone();
            let handler = Arc::clone(&handler);
            async move {
                if let Some(out) = handler(value) {
                    output.forward(out).await;
                }
            }
            .boxed()
        });
        self.raw_input_wire(name, raw)
    }
}
