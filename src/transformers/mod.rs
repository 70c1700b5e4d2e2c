//! # Graph operators: transformers, filters, splitters, advanced transformers.
//!
//! Most operators are built straight off an output wire
//! ([`OutputWire::build_transformer`](crate::wires::OutputWire::build_transformer),
//! `build_filter`, `build_splitter`, `build_advanced_transformer`); they
//! register DIRECT vertices and solder themselves in one step.
//!
//! [`WireTransformer`] is the standalone form for the cases where the
//! transformer's input wire must be soldered with explicit ordering relative
//! to other sinks; the keystone flush-request extraction is the canonical
//! example.

mod advanced;
mod transformer;

pub use advanced::AdvancedTransformation;
pub use transformer::WireTransformer;
