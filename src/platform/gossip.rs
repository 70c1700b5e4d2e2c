//! # Gossip seam.
//!
//! The transport is a collaborator: the [`Gossip`] trait is what the wiring
//! consumes, [`InMemoryGossip`] is the test-grade default. Received events
//! enter the pipeline through the gossip wiring's standard output wire;
//! events leaving the orphan buffer come back on an INJECT edge for
//! redistribution (one of the graph's structural cycles).

use crate::components::ComponentWiring;
use crate::config::SchedulerConfig;
use crate::error::WireError;
use crate::model::WiringModel;
use crate::wires::{InputWire, OutputWire, StandardOutputWire};

use crate::platform::event::{Event, EventWindow};

/// Transport-side behavior the platform drives.
pub trait Gossip: Send + Sync + 'static {
    /// Redistributes an event that cleared the orphan buffer.
    fn handle_event(&mut self, event: Event);
    /// Adopts new ancient boundaries.
    fn set_event_window(&mut self, window: EventWindow);
    /// Resets transport state for reconnect.
    fn clear(&mut self);
    /// Starts gossiping.
    fn start(&mut self);
    /// Stops gossiping, permanently.
    fn stop(&mut self);
}

/// Records what the platform asked of it; pushes nothing on its own.
pub struct InMemoryGossip {
    pub distributed: Vec<Event>,
    pub window: Option<EventWindow>,
    pub running: bool,
}

impl InMemoryGossip {
    pub fn new() -> Self {
        Self {
            distributed: Vec::new(),
            window: None,
            running: false,
        }
    }
}

impl Default for InMemoryGossip {
    fn default() -> Self {
        Self::new()
    }
}

impl Gossip for InMemoryGossip {
    fn handle_event(&mut self, event: Event) {
        self.distributed.push(event);
    }

    fn set_event_window(&mut self, window: EventWindow) {
        self.window = Some(window);
    }

    fn clear(&mut self) {
        self.distributed.clear();
    }

    fn start(&mut self) {
        self.running = true;
    }

    fn stop(&mut self) {
        self.running = false;
    }
}

/// Wiring around the gossip collaborator.
pub struct GossipWiring {
    wiring: ComponentWiring<Box<dyn Gossip>, ()>,
    event_output: StandardOutputWire<Event>,
    event_input: InputWire<Event>,
    window_input: InputWire<EventWindow>,
    clear_input: InputWire<()>,
    start_input: InputWire<()>,
    stop_input: InputWire<()>,
}

impl Clone for GossipWiring {
    fn clone(&self) -> Self {
        Self {
            wiring: self.wiring.clone(),
            event_output: self.event_output.clone(),
            event_input: self.event_input.clone(),
            window_input: self.window_input.clone(),
            clear_input: self.clear_input.clone(),
            start_input: self.start_input.clone(),
            stop_input: self.stop_input.clone(),
        }
    }
}

impl GossipWiring {
    pub fn new(model: &WiringModel, config: &SchedulerConfig) -> Self {
        let wiring: ComponentWiring<Box<dyn Gossip>, ()> =
            ComponentWiring::new(model, "gossip", config);
        let event_output = model.standard_output_wire::<Event>("gossipEvents");
        let event_input = wiring.input_wire("handleEvent", |gossip, event| {
            gossip.handle_event(event);
            None
        });
        let window_input = wiring.input_wire("setEventWindow", |gossip, window| {
            gossip.set_event_window(window);
            None
        });
        let clear_input = wiring.input_wire("clear", |gossip, _: ()| {
            gossip.clear();
            None
        });
        let start_input = wiring.input_wire("start", |gossip, _: ()| {
            gossip.start();
            None
        });
        let stop_input = wiring.input_wire("stop", |gossip, _: ()| {
            gossip.stop();
            None
        });
        Self {
            wiring,
            event_output,
            event_input,
            window_input,
            clear_input,
            start_input,
            stop_input,
        }
    }

    pub fn bind(&self, gossip: Box<dyn Gossip>) {
        self.wiring.bind(gossip);
    }

    /// Events received from the network, entering the pipeline.
    pub fn event_output(&self) -> OutputWire<Event> {
        self.event_output.output()
    }

    /// Emission point for the transport (and tests) to push received events.
    pub fn emitter(&self) -> StandardOutputWire<Event> {
        self.event_output.clone()
    }

    /// Events to redistribute; INJECT target of the orphan buffer.
    pub fn event_input(&self) -> InputWire<Event> {
        self.event_input.clone()
    }

    pub fn window_input(&self) -> InputWire<EventWindow> {
        self.window_input.clone()
    }

    pub fn clear_input(&self) -> InputWire<()> {
        self.clear_input.clone()
    }

    pub fn start_input(&self) -> InputWire<()> {
        self.start_input.clone()
    }

    pub fn stop_input(&self) -> InputWire<()> {
        self.stop_input.clone()
    }

    pub async fn flush(&self) -> Result<(), WireError> {
        self.wiring.flush().await
    }
}
