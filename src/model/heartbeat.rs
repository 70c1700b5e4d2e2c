use std::time::{Duration, Instant};

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::wires::OutputWire;

/// A periodic tick source registered in the model.
///
/// Each tick forwards the tick [`Instant`] to every soldered sink. Solder
/// heartbeats with OFFER wherever missing a tick under load is acceptable;
/// a default solder makes the ticker itself wait out the backpressure.
pub(crate) struct Heartbeat {
    pub(crate) period: Duration,
    pub(crate) output: OutputWire<Instant>,
}

impl Heartbeat {
    /// Spawns the ticker. Delayed ticks are not bursted afterwards.
    pub(crate) fn spawn(&self, token: CancellationToken) {
        let output = self.output.clone();
        let period = self.period;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => output.forward(Instant::now()).await,
                }
            }
        });
    }
}
