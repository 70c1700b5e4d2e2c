//! # Consensus side of the pipeline.
//!
//! The [`ConsensusEngine`] turns the ordered event stream into consensus
//! rounds; the [`ConsensusRoundHandler`] applies durable rounds to produce
//! signed states. The consensus algorithm itself is a collaborator; the
//! default engine is a deterministic round batcher that honors the interface
//! contract (keystone designation, derived event windows, snapshot resets).

mod engine;
mod round_handler;

pub use engine::ConsensusEngine;
pub use round_handler::ConsensusRoundHandler;
