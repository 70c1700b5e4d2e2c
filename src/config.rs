//! # Platform scheduler configuration.
//!
//! [`SchedulersConfig`] centralizes the knobs of the wiring layer: the shared
//! pool sizing parameters, per-component scheduler configurations, heartbeat
//! periods, and a couple of test-only escape hatches.
//!
//! # Example
//! ```
//! use wirevisor::{SchedulersConfig, SchedulerKind};
//!
//! let mut cfg = SchedulersConfig::default();
//! cfg.default_pool_multiplier = 1.0;
//! cfg.default_pool_constant = 2;
//!
//! assert_eq!(cfg.pool_parallelism(8), 10);
//! assert_eq!(cfg.consensus_engine.kind, SchedulerKind::Sequential);
//! assert!(cfg.consensus_engine.squelchable);
//! ```

use std::time::Duration;

use crate::schedulers::SchedulerKind;

/// Classification of events as ancient: by generation or by birth round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AncientMode {
    /// Events are ancient when their generation falls below the threshold.
    GenerationThreshold,
    /// Events are ancient when their birth round falls below the threshold.
    BirthRoundThreshold,
}

/// Configuration for a single scheduler.
#[derive(Clone, Copy, Debug)]
pub struct SchedulerConfig {
    /// Execution policy for the scheduler.
    pub kind: SchedulerKind,
    /// Maximum number of unhandled tasks before backpressure (None = unbounded).
    pub unhandled_capacity: Option<usize>,
    /// Whether the scheduler supports `flush()`.
    pub flushable: bool,
    /// Whether the scheduler supports squelching.
    pub squelchable: bool,
}

impl SchedulerConfig {
    /// A sequential scheduler with the given capacity, flushable.
    pub fn sequential(capacity: usize) -> Self {
        Self {
            kind: SchedulerKind::Sequential,
            unhandled_capacity: Some(capacity),
            flushable: true,
            squelchable: false,
        }
    }

    /// A concurrent scheduler with the given capacity, flushable.
    pub fn concurrent(capacity: usize) -> Self {
        Self {
            kind: SchedulerKind::Concurrent,
            unhandled_capacity: Some(capacity),
            flushable: true,
            squelchable: false,
        }
    }

    /// A direct scheduler: caller-thread, no queue, never flushed.
    pub fn direct() -> Self {
        Self {
            kind: SchedulerKind::Direct,
            unhandled_capacity: None,
            flushable: false,
            squelchable: false,
        }
    }

    /// A direct scheduler safe under concurrent callers.
    pub fn direct_threadsafe() -> Self {
        Self {
            kind: SchedulerKind::DirectThreadsafe,
            unhandled_capacity: None,
            flushable: false,
            squelchable: false,
        }
    }

    /// A scheduler that silently drops every task.
    pub fn no_op() -> Self {
        Self {
            kind: SchedulerKind::NoOp,
            unhandled_capacity: None,
            flushable: false,
            squelchable: false,
        }
    }

    /// Enables squelching.
    pub fn squelchable(mut self) -> Self {
        self.squelchable = true;
        self
    }
}

/// Global configuration for the platform wiring.
///
/// Field defaults mirror a production-sized intake pipeline; tests shrink the
/// capacities and shorten the heartbeats.
#[derive(Clone, Debug)]
pub struct SchedulersConfig {
    /// Multiplier applied to the core count when sizing the shared pool.
    pub default_pool_multiplier: f64,
    /// Constant added to the scaled core count when sizing the shared pool.
    pub default_pool_constant: i64,

    /// Capacity of the counter shared by the event hasher and the post-hash
    /// collector (the joint-flush pair).
    pub event_hasher_unhandled_capacity: usize,

    /// Park interval for backpressured on-ramps.
    pub backpressure_park_interval: Duration,

    pub internal_event_validator: SchedulerConfig,
    pub event_deduplicator: SchedulerConfig,
    pub event_signature_validator: SchedulerConfig,
    pub orphan_buffer: SchedulerConfig,
    pub pces_sequencer: SchedulerConfig,
    pub pces_writer: SchedulerConfig,
    pub pces_replayer: SchedulerConfig,
    pub round_durability_buffer: SchedulerConfig,
    pub consensus_engine: SchedulerConfig,
    pub event_creation_manager: SchedulerConfig,
    pub self_event_signer: SchedulerConfig,
    pub transaction_prehandler: SchedulerConfig,
    pub state_signature_collector: SchedulerConfig,
    pub state_hasher: SchedulerConfig,
    pub state_saver: SchedulerConfig,
    pub consensus_round_handler: SchedulerConfig,
    pub gossip: SchedulerConfig,
    pub platform_publisher: SchedulerConfig,

    /// Period of the heartbeat that drives event creation attempts.
    pub event_creation_heartbeat_period: Duration,
    /// Period of the heartbeat that drives stale-round checks in the
    /// round-durability buffer.
    pub round_durability_heartbeat_period: Duration,
    /// A round waiting longer than this for its keystone to become durable is
    /// reported as stale.
    pub suspicious_round_durability_duration: Duration,

    /// How events are classified as ancient.
    pub ancient_mode: AncientMode,
    /// Number of signatures required before a state is considered complete.
    pub state_signature_threshold: usize,
    /// Events per consensus round produced by the default engine.
    pub consensus_round_batch: usize,
    /// How many rounds back the non-ancient window reaches.
    pub ancient_round_depth: u64,

    /// Skip signature verification of replayed/ingested events. Testing only.
    pub force_ignore_pces_signatures: bool,
    /// Validate the hash of a state loaded at startup before accepting it.
    pub validate_initial_state: bool,
}

impl Default for SchedulersConfig {
    fn default() -> Self {
        Self {
            default_pool_multiplier: 1.0,
            default_pool_constant: 0,
            event_hasher_unhandled_capacity: 500,
            backpressure_park_interval: Duration::from_micros(100),
            internal_event_validator: SchedulerConfig::sequential(500),
            event_deduplicator: SchedulerConfig::sequential(500),
            event_signature_validator: SchedulerConfig::sequential(500),
            orphan_buffer: SchedulerConfig::sequential(500),
            pces_sequencer: SchedulerConfig::sequential(500),
            pces_writer: SchedulerConfig::sequential(500),
            pces_replayer: SchedulerConfig::sequential(500),
            round_durability_buffer: SchedulerConfig::sequential(500),
            consensus_engine: SchedulerConfig::sequential(500).squelchable(),
            event_creation_manager: SchedulerConfig::sequential(500).squelchable(),
            self_event_signer: SchedulerConfig::sequential(500),
            transaction_prehandler: SchedulerConfig::concurrent(500),
            state_signature_collector: SchedulerConfig::sequential(500),
            state_hasher: SchedulerConfig::sequential(500),
            state_saver: SchedulerConfig::sequential(20),
            consensus_round_handler: SchedulerConfig::sequential(1000).squelchable(),
            gossip: SchedulerConfig::sequential(500),
            platform_publisher: SchedulerConfig::no_op(),
            event_creation_heartbeat_period: Duration::from_millis(10),
            round_durability_heartbeat_period: Duration::from_millis(100),
            suspicious_round_durability_duration: Duration::from_secs(10),
            ancient_mode: AncientMode::GenerationThreshold,
            state_signature_threshold: 2,
            consensus_round_batch: 4,
            ancient_round_depth: 26,
            force_ignore_pces_signatures: false,
            validate_initial_state: false,
        }
    }
}

impl SchedulersConfig {
    /// Parallelism of the shared pool: `max(1, multiplier * cores + constant)`.
    ///
    /// The embedder owns the runtime; this is the sizing hint for building it.
    pub fn pool_parallelism(&self, cores: usize) -> usize {
        let raw = self.default_pool_multiplier * cores as f64 + self.default_pool_constant as f64;
        (raw.floor() as i64).max(1) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_parallelism_is_never_zero() {
        let mut cfg = SchedulersConfig::default();
        cfg.default_pool_multiplier = 0.0;
        cfg.default_pool_constant = -4;
        assert_eq!(cfg.pool_parallelism(8), 1);
    }

    #[test]
    fn pool_parallelism_scales_with_cores() {
        let mut cfg = SchedulersConfig::default();
        cfg.default_pool_multiplier = 1.5;
        cfg.default_pool_constant = 1;
        assert_eq!(cfg.pool_parallelism(4), 7);
    }
}
