use std::sync::Arc;

use futures::FutureExt;
use tracing::info;

use crate::config::SchedulerConfig;
use crate::model::WiringModel;
use crate::schedulers::RawHandler;
use crate::wires::{InputWire, OutputWire, StandardOutputWire};

use crate::platform::event::Event;

/// Replays a recorded preconsensus stream into the intake pipeline.
///
/// Replayed events leave through `event_output` (soldered to the head of the
/// intake pipeline, under normal backpressure), and when the batch is done a
/// unit signal leaves through `done_output`, soldered to the writer's
/// `begin_streaming_new_events` input so the writer knows replay is over.
pub struct PcesReplayerWiring {
    input: InputWire<Vec<Event>>,
    event_output: StandardOutputWire<Event>,
    done_output: OutputWire<()>,
}

impl PcesReplayerWiring {
    pub fn new(model: &WiringModel, config: &SchedulerConfig) -> Self {
        let scheduler = model
            .scheduler_builder("pcesReplayer")
            .with_config(config)
            .build::<()>();
        let event_output = model.standard_output_wire::<Event>("pcesReplayerEvents");
        let done_output = scheduler.output_wire();

        let events_out = event_output.clone();
        let done_out = done_output.clone();
        let raw: RawHandler<Vec<Event>> = Arc::new(move |batch: Vec<Event>| {
            let events_out = events_out.clone();
            let done_out = done_out.clone();
            async move {
                let count = batch.len();
                for event in batch {
                    events_out.forward(event).await;
                }
                info!(count, "pces replay complete");
                done_out.forward(()).await;
            }
            .boxed()
        });
        let input = scheduler.raw_input_wire("replay", raw);

        Self {
            input,
            event_output,
            done_output,
        }
    }

    /// The wire a recorded stream is submitted to.
    pub fn replay_input(&self) -> InputWire<Vec<Event>> {
        self.input.clone()
    }

    /// Replayed events, to be soldered to the head of the intake pipeline.
    pub fn event_output(&self) -> OutputWire<Event> {
        self.event_output.output()
    }

    /// Fires once per replayed batch, after the last event was emitted.
    pub fn done_output(&self) -> OutputWire<()> {
        self.done_output.clone()
    }
}
