use crate::wires::{InputWire, OutputWire};

use crate::schedulers::TaskScheduler;

/// A stage that forwards its input unchanged.
///
/// Exists for scheduling reasons, not data reasons: the post-hash collector
/// is a pass-through whose scheduler off-ramps the counter shared with the
/// concurrent event hasher, letting the pair flush as one unit.
pub struct PassThroughWiring<T> {
    scheduler: TaskScheduler<T>,
    input: InputWire<T>,
}

impl<T> Clone for PassThroughWiring<T> {
    fn clone(&self) -> Self {
        Self {
            scheduler: self.scheduler.clone(),
            input: self.input.clone(),
        }
    }
}

impl<T: Clone + Send + 'static> PassThroughWiring<T> {
    /// Wraps an already-built scheduler.
    pub fn new(scheduler: TaskScheduler<T>) -> Self {
        let input = scheduler.input_wire("in", Some);
        Self { scheduler, input }
    }

    pub fn input_wire(&self) -> InputWire<T> {
        self.input.clone()
    }

    pub fn output_wire(&self) -> OutputWire<T> {
        self.scheduler.output_wire()
    }

    pub fn scheduler(&self) -> &TaskScheduler<T> {
        &self.scheduler
    }
}
