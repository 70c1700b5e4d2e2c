//! # The wiring model: registry and lifecycle of the whole graph.
//!
//! The model owns every scheduler, heartbeat, and standalone output wire.
//! Its job splits into three phases:
//!
//! 1. **Build**: `scheduler_builder` / `heartbeat` / `standard_output_wire`
//!    register vertices; soldering records edges. Nothing validates yet so
//!    construction order is irrelevant.
//! 2. **Start**: `start()` validates the finished graph (duplicate names,
//!    unbound components, illegal backpressure cycles), then spawns the
//!    sequential workers, the heartbeat tickers, and the subscriber
//!    listener.
//! 3. **Stop**: `stop()` cancels the model token. In-flight tasks finish,
//!    queued tasks are discarded, parked on-ramps abort.
//!
//! ```text
//! WiringModelBuilder ──► WiringModel
//!    │ bus capacity          │ scheduler_builder(name) ──► SchedulerBuilder ──► TaskScheduler
//!    │ subscribers           │ heartbeat(period)       ──► OutputWire<Instant>
//!                            │ standard_output_wire    ──► StandardOutputWire<T>
//!                            │ start() / stop() / diagram()
//! ```

mod diagram;
mod graph;
mod heartbeat;
#[allow(clippy::module_inception)]
mod model;

pub use model::{WiringModel, WiringModelBuilder};

pub(crate) use graph::VertexKind;
pub(crate) use model::ModelShared;
