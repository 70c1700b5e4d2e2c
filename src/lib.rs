//! # wirevisor
//!
//! **Wirevisor** is a component wiring and scheduling framework for
//! event-processing pipelines, built for the needs of a consensus platform:
//! typed dataflow wires between schedulers, counter-based backpressure,
//! reconnect-safe flush/clear coordination, and cycle breaking by injection
//! and squelching.
//!
//! ## Features
//!
//! | Area              | Description                                                       | Key types / traits                         |
//! |-------------------|-------------------------------------------------------------------|--------------------------------------------|
//! | **Counters**      | In-flight task accounting, parking backpressure, joint flushes.   | [`Counter`], [`BackpressureCounter`]       |
//! | **Schedulers**    | Sequential/concurrent/direct/no-op execution policies.            | [`TaskScheduler`], [`SchedulerKind`]       |
//! | **Wires**         | Typed solder edges with default/inject/offer semantics.           | [`InputWire`], [`OutputWire`], [`SolderKind`] |
//! | **Operators**     | Transformers, filters, splitters, reservation-aware fan-out.      | [`WireTransformer`], [`AdvancedTransformation`] |
//! | **Model**         | Graph registry, validation, heartbeats, lifecycle, diagram.       | [`WiringModel`]                            |
//! | **Reservations**  | Refcounted shared values with release-on-drop.                    | [`Reserved`]                               |
//! | **Components**    | Late-bound typed binding surface.                                 | [`ComponentWiring`]                        |
//! | **Observability** | Structured runtime events with pluggable subscribers.             | [`RuntimeEvent`], [`Subscribe`]            |
//! | **Platform**      | The consensus pipeline wired with all of the above.               | [`platform::wiring::PlatformWiring`]       |
//!
//! ## A small graph
//!
//! ```no_run
//! use wirevisor::{SchedulerKind, SolderKind, WiringModelBuilder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let model = WiringModelBuilder::new().build();
//!
//!     let doubler = model
//!         .scheduler_builder("doubler")
//!         .with_kind(SchedulerKind::Sequential)
//!         .with_unhandled_capacity(64)
//!         .build::<u64>();
//!     let printer = model
//!         .scheduler_builder("printer")
//!         .with_kind(SchedulerKind::Sequential)
//!         .build::<()>();
//!
//!     let double_input = doubler.input_wire("in", |n: u64| Some(n * 2));
//!     let print_input = printer.input_wire("in", |n: u64| {
//!         println!("{n}");
//!         None
//!     });
//!     doubler.output_wire().solder_to(&print_input, SolderKind::Default);
//!
//!     model.start()?;
//!     double_input.put(21).await;
//!     Ok(())
//! }
//! ```

pub mod components;
pub mod config;
pub mod counters;
pub mod error;
pub mod events;
pub mod model;
pub mod platform;
pub mod reservation;
pub mod schedulers;
pub mod subscribers;
pub mod transformers;
pub mod wires;

// ---- Public re-exports ----

pub use components::{ComponentWiring, PassThroughWiring};
pub use config::{AncientMode, SchedulerConfig, SchedulersConfig};
pub use counters::{BackpressureCounter, Counter, NoOpCounter, StandardCounter};
pub use error::{BuildError, FatalError, WireError};
pub use events::{Bus, RuntimeEvent, RuntimeEventKind};
pub use model::{WiringModel, WiringModelBuilder};
pub use reservation::Reserved;
pub use schedulers::{SchedulerBuilder, SchedulerKind, TaskScheduler};
pub use subscribers::{Subscribe, SubscriberSet, TracingSubscriber};
pub use transformers::{AdvancedTransformation, WireTransformer};
pub use wires::{InputWire, OutputWire, SolderKind, StandardOutputWire};
