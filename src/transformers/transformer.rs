use crate::model::WiringModel;
use crate::schedulers::SchedulerKind;
use crate::wires::{InputWire, OutputWire};

/// A named 1→1 map with a standalone input wire.
///
/// Unlike [`OutputWire::build_transformer`](crate::wires::OutputWire::build_transformer),
/// nothing is soldered at construction: the caller solders the input wire
/// itself, which is required when the transformer must participate in an
/// ordered solder.
pub struct WireTransformer<A, B> {
    input: InputWire<A>,
    output: OutputWire<B>,
}

impl<A: Send + 'static, B: Clone + Send + 'static> WireTransformer<A, B> {
    /// Creates the transformer as a DIRECT vertex in the model.
    pub fn new(
        model: &WiringModel,
        name: &str,
        map: impl Fn(A) -> Option<B> + Send + Sync + 'static,
    ) -> Self {
        let scheduler = model
            .scheduler_builder(name)
            .with_kind(SchedulerKind::Direct)
            .build::<B>();
        let input = scheduler.input_wire("in", map);
        Self {
            input,
            output: scheduler.output_wire(),
        }
    }

    /// The wire to solder the source output into.
    pub fn input_wire(&self) -> InputWire<A> {
        self.input.clone()
    }

    /// The transformed output.
    pub fn output_wire(&self) -> OutputWire<B> {
        self.output.clone()
    }
}
