//! Drives the full platform pipeline in-process: submits a handful of
//! gossip events, watches rounds reach the handler, then runs the reconnect
//! clear cycle.
//!
//! ```sh
//! cargo run --example pipeline
//! ```

use std::time::Duration;

use bytes::Bytes;
use wirevisor::platform::event::{Event, NodeId};
use wirevisor::platform::intake::{DigestSigner, EventHasher, Signer};
use wirevisor::platform::wiring::{PlatformComponents, PlatformWiring};
use wirevisor::{SchedulersConfig, TracingSubscriber, WiringModelBuilder};

fn signed_event(creator: NodeId, generation: u64) -> Event {
    let event = Event::builder(creator)
        .with_generation(generation)
        .with_payload(Bytes::from(format!("tx-{creator}-{generation}")))
        .build();
    let hash = EventHasher::compute(&event);
    event.set_hash(hash);
    event.set_signature(DigestSigner.sign(&hash, creator));
    event
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut config = SchedulersConfig::default();
    config.consensus_round_batch = 2;

    let model = WiringModelBuilder::new()
        .with_subscriber(TracingSubscriber)
        .build();
    let wiring = PlatformWiring::new(model, &config);

    let components = PlatformComponents::defaults(1, &config);
    let handled = components.consensus_round_handler.handled_rounds();
    wiring.bind(components);
    wiring.start()?;
    wiring.start_gossip().await;

    for generation in 1..=6 {
        wiring.submit_event(signed_event(2, generation)).await;
        wiring.submit_event(signed_event(3, generation)).await;
    }

    tokio::time::sleep(Duration::from_millis(500)).await;
    println!("rounds handled: {:?}", handled.lock());

    wiring.clear().await?;
    println!("pipeline cleared for reconnect");

    wiring.stop();
    Ok(())
}
