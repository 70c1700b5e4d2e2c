//! End-to-end platform pipeline: intake flow, the keystone durability
//! protocol, signature collection, and the reconnect clear lifecycle.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use parking_lot::Mutex;
use wirevisor::platform::event::{Event, EventWindow, NodeId, StateSignature};
use wirevisor::platform::intake::{DigestSigner, EventHasher, Signer};
use wirevisor::platform::wiring::{PlatformComponents, PlatformWiring};
use wirevisor::{AncientMode, SchedulersConfig, WiringModelBuilder};

fn test_config() -> SchedulersConfig {
    let mut config = SchedulersConfig::default();
    config.consensus_round_batch = 2;
    config.event_creation_heartbeat_period = Duration::from_millis(10);
    config.round_durability_heartbeat_period = Duration::from_millis(50);
    config
}

/// A hashed, signed event ready for intake.
fn signed_event(creator: NodeId, generation: u64, signatures: Vec<StateSignature>) -> Event {
    let mut builder = Event::builder(creator)
        .with_generation(generation)
        .with_payload(Bytes::from(format!("payload-{creator}-{generation}")));
    for signature in signatures {
        builder = builder.with_state_signature(signature);
    }
    let event = builder.build();
    let hash = EventHasher::compute(&event);
    event.set_hash(hash);
    event.set_signature(DigestSigner.sign(&hash, creator));
    event
}

fn state_signature(round: u64, signer: NodeId) -> StateSignature {
    StateSignature {
        round,
        signer,
        signature: Bytes::from(format!("state-sig-{round}-{signer}")),
    }
}

async fn wait_until(what: &str, mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for {what}"));
}

struct TestPlatform {
    wiring: PlatformWiring,
    handled_rounds: Arc<Mutex<Vec<u64>>>,
    saved_rounds: Arc<Mutex<Vec<u64>>>,
    durable: Arc<wirevisor::platform::pces::DurableSequence>,
    prehandled: Arc<std::sync::atomic::AtomicU64>,
}

async fn start_platform() -> TestPlatform {
    let config = test_config();
    let model = WiringModelBuilder::new().build();
    let wiring = PlatformWiring::new(model, &config);

    let components = PlatformComponents::defaults(1, &config);
    let handled_rounds = components.consensus_round_handler.handled_rounds();
    let saved_rounds = components.state_saver.saved_rounds();
    let durable = Arc::clone(&components.durable_sequence);
    let prehandled = components.transaction_prehandler.prehandled_count();

    wiring.bind(components);
    wiring.start().expect("platform should start");
    wiring.start_gossip().await;

    TestPlatform {
        wiring,
        handled_rounds,
        saved_rounds,
        durable,
        prehandled,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn rounds_flow_end_to_end_and_respect_durability() {
    let platform = start_platform().await;

    for generation in 1..=4 {
        platform
            .wiring
            .submit_event(signed_event(2, generation, Vec::new()))
            .await;
        platform
            .wiring
            .submit_event(signed_event(3, generation, Vec::new()))
            .await;
    }

    // The durability invariant is enforced by a panic inside the round
    // handler, so rounds arriving at all proves the keystone flush requests
    // reached the writer first.
    let handled = Arc::clone(&platform.handled_rounds);
    wait_until("two rounds to be handled", move || handled.lock().len() >= 2).await;

    assert!(platform.durable.get().is_some(), "writer never flushed");
    let handled = platform.handled_rounds.lock().clone();
    let mut sorted = handled.clone();
    sorted.sort_unstable();
    assert_eq!(handled, sorted, "rounds were handled out of order");

    assert!(
        platform.prehandled.load(std::sync::atomic::Ordering::Relaxed) > 0,
        "transaction prehandler never ran"
    );

    platform.wiring.stop();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn complete_states_reach_the_saver() {
    let platform = start_platform().await;

    for generation in 1..=4 {
        platform
            .wiring
            .submit_event(signed_event(2, generation, Vec::new()))
            .await;
        platform
            .wiring
            .submit_event(signed_event(3, generation, Vec::new()))
            .await;
    }
    let handled = Arc::clone(&platform.handled_rounds);
    wait_until("rounds to be handled", move || handled.lock().len() >= 2).await;

    // Two signers per round crosses the completeness threshold; the states
    // then flow through the reservers to the saver.
    platform
        .wiring
        .submit_event(signed_event(
            2,
            10,
            vec![state_signature(1, 10), state_signature(2, 10)],
        ))
        .await;
    platform
        .wiring
        .submit_event(signed_event(
            3,
            10,
            vec![state_signature(1, 11), state_signature(2, 11)],
        ))
        .await;

    let saved = Arc::clone(&platform.saved_rounds);
    wait_until("a complete state to be saved", move || {
        saved.lock().contains(&1)
    })
    .await;

    platform.wiring.stop();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn clear_is_idempotent_and_resets_intake_state() {
    let platform = start_platform().await;

    let events: Vec<Event> = (1..=4)
        .flat_map(|generation| {
            vec![
                signed_event(2, generation, Vec::new()),
                signed_event(3, generation, Vec::new()),
            ]
        })
        .collect();
    for event in &events {
        platform.wiring.submit_event(event.clone()).await;
    }
    let handled = Arc::clone(&platform.handled_rounds);
    wait_until("initial rounds", move || !handled.lock().is_empty()).await;

    platform.wiring.clear().await.expect("first clear");
    platform.wiring.clear().await.expect("second clear");

    // The deduplicator was cleared, so resubmitting the same events makes
    // them flow through the pipeline a second time.
    let handled_before = platform.handled_rounds.lock().len();
    for event in &events {
        platform.wiring.submit_event(event.clone()).await;
    }
    let handled = Arc::clone(&platform.handled_rounds);
    wait_until("rounds after clear", move || {
        handled.lock().len() > handled_before
    })
    .await;

    platform.wiring.stop();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn flush_intake_pipeline_is_idempotent() {
    let platform = start_platform().await;

    platform
        .wiring
        .submit_event(signed_event(2, 1, Vec::new()))
        .await;
    platform
        .wiring
        .flush_intake_pipeline()
        .await
        .expect("first flush");
    platform
        .wiring
        .flush_intake_pipeline()
        .await
        .expect("second flush");

    platform.wiring.stop();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn replayed_stream_feeds_the_pipeline() {
    let platform = start_platform().await;

    let events: Vec<Event> = (1..=4)
        .flat_map(|generation| {
            vec![
                signed_event(2, generation, Vec::new()),
                signed_event(3, generation, Vec::new()),
            ]
        })
        .collect();
    platform.wiring.replay_pces(events).await;

    let handled = Arc::clone(&platform.handled_rounds);
    wait_until("replayed rounds", move || !handled.lock().is_empty()).await;
    assert!(platform.durable.get().is_some());

    platform.wiring.stop();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn event_window_updates_propagate_without_deadlock() {
    let platform = start_platform().await;

    platform
        .wiring
        .update_event_window(EventWindow {
            latest_consensus_round: 5,
            ancient_threshold: 2,
            expired_threshold: 0,
            mode: AncientMode::GenerationThreshold,
        })
        .await;

    // Ancient events are now dropped at intake; fresh ones still flow.
    platform.wiring.submit_event(signed_event(2, 1, Vec::new())).await;
    platform.wiring.submit_event(signed_event(2, 5, Vec::new())).await;
    platform.wiring.submit_event(signed_event(3, 5, Vec::new())).await;
    platform
        .wiring
        .flush_intake_pipeline()
        .await
        .expect("flush");

    platform.wiring.stop();
}
