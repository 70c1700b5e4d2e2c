//! Wire graph operators: transformers, filters, splitters, ordered solder,
//! reservation-aware fan-out, cycle validation, and heartbeat offers.

use std::sync::{mpsc, Arc};
use std::time::Duration;

use parking_lot::Mutex;
use wirevisor::{
    AdvancedTransformation, BuildError, Reserved, SchedulerKind, SolderKind, WiringModelBuilder,
    WiringModel,
};

/// A sequential scheduler that appends everything it receives to a log.
fn collector<T: Clone + Send + 'static>(
    model: &WiringModel,
    name: &str,
) -> (wirevisor::InputWire<T>, Arc<Mutex<Vec<T>>>) {
    let scheduler = model
        .scheduler_builder(name)
        .with_kind(SchedulerKind::Sequential)
        .with_flushing_enabled(true)
        .build::<()>();
    let log: Arc<Mutex<Vec<T>>> = Arc::new(Mutex::new(Vec::new()));
    let log_in_handler = Arc::clone(&log);
    let input = scheduler.input_wire("in", move |value: T| {
        log_in_handler.lock().push(value);
        None
    });
    (input, log)
}

async fn settle(model: &WiringModel) {
    // Give direct chains and queued tasks a moment to drain.
    tokio::time::sleep(Duration::from_millis(200)).await;
    let _ = model;
}

#[tokio::test]
async fn transformer_maps_and_filter_drops() {
    let model = WiringModelBuilder::new().build();
    let source = model
        .scheduler_builder("source")
        .with_kind(SchedulerKind::Sequential)
        .with_flushing_enabled(true)
        .build::<u64>();
    let source_input = source.input_wire("in", Some);

    let (sink, log) = collector::<u64>(&model, "sink");
    source
        .output_wire()
        .build_transformer("double", |n: u64| Some(n * 2))
        .build_filter("dropOdd", |n: &u64| n % 4 == 0)
        .solder_to(&sink, SolderKind::Default);

    model.start().expect("start");
    for n in 0..6 {
        source_input.put(n).await;
    }
    source.flush().await.expect("flush");
    settle(&model).await;

    assert_eq!(*log.lock(), vec![0, 4, 8]);
    model.stop();
}

#[tokio::test]
async fn splitter_preserves_element_order() {
    let model = WiringModelBuilder::new().build();
    let source = model
        .scheduler_builder("batches")
        .with_kind(SchedulerKind::Sequential)
        .with_flushing_enabled(true)
        .build::<Vec<u64>>();
    let source_input = source.input_wire("in", Some);

    let (sink, log) = collector::<u64>(&model, "sink");
    source
        .output_wire()
        .build_splitter("batchSplitter")
        .solder_to(&sink, SolderKind::Default);

    model.start().expect("start");
    source_input.put(vec![1, 2, 3]).await;
    source_input.put(vec![]).await;
    source_input.put(vec![4, 5]).await;
    source.flush().await.expect("flush");
    settle(&model).await;

    assert_eq!(*log.lock(), vec![1, 2, 3, 4, 5]);
    model.stop();
}

#[tokio::test]
async fn ordered_solder_delivers_to_sinks_in_listed_order() {
    let model = WiringModelBuilder::new().build();
    let source = model
        .scheduler_builder("source")
        .with_kind(SchedulerKind::Sequential)
        .with_flushing_enabled(true)
        .build::<u64>();
    let source_input = source.input_wire("in", Some);

    // Both sinks are direct and append to one shared log, so the arrival
    // interleaving is exactly the delivery order.
    let log: Arc<Mutex<Vec<(&'static str, u64)>>> = Arc::new(Mutex::new(Vec::new()));
    let first = model
        .scheduler_builder("first")
        .with_kind(SchedulerKind::Direct)
        .build::<()>();
    let log_first = Arc::clone(&log);
    let first_input = first.input_wire("in", move |n: u64| {
        log_first.lock().push(("first", n));
        None
    });
    let second = model
        .scheduler_builder("second")
        .with_kind(SchedulerKind::Direct)
        .build::<()>();
    let log_second = Arc::clone(&log);
    let second_input = second.input_wire("in", move |n: u64| {
        log_second.lock().push(("second", n));
        None
    });

    source
        .output_wire()
        .ordered_solder_to(&[&first_input, &second_input]);

    model.start().expect("start");
    for n in 0..10 {
        source_input.put(n).await;
    }
    source.flush().await.expect("flush");

    let log = log.lock();
    assert_eq!(log.len(), 20);
    for n in 0..10 {
        let first_at = log.iter().position(|e| *e == ("first", n)).expect("first");
        let second_at = log.iter().position(|e| *e == ("second", n)).expect("second");
        assert!(
            first_at < second_at,
            "value {n} reached the second sink before the first"
        );
    }
    model.stop();
}

struct Reserver;

impl AdvancedTransformation<Reserved<u64>, Reserved<u64>> for Reserver {
    fn transform(&self, input: &Reserved<u64>) -> Option<Reserved<u64>> {
        Some(input.reserve())
    }
}

#[tokio::test]
async fn advanced_transformer_balances_reservations_across_fan_out() {
    let model = WiringModelBuilder::new().build();
    let source = model
        .scheduler_builder("states")
        .with_kind(SchedulerKind::Sequential)
        .with_flushing_enabled(true)
        .build::<Reserved<u64>>();
    let source_input = source.input_wire("in", Some);

    let (keeper_a, held_a) = collector::<Reserved<u64>>(&model, "keeperA");
    let (keeper_b, held_b) = collector::<Reserved<u64>>(&model, "keeperB");
    let (keeper_c, held_c) = collector::<Reserved<u64>>(&model, "keeperC");

    // Fan-out of three: two sinks hold their handles, the third drops its
    // handle in a filter. The filter's drop is its release.
    let fanned = source
        .output_wire()
        .build_advanced_transformer("reserver", Reserver);
    fanned.solder_to(&keeper_a, SolderKind::Default);
    fanned.solder_to(&keeper_b, SolderKind::Default);
    fanned
        .build_filter("dropAll", |_: &Reserved<u64>| false)
        .solder_to(&keeper_c, SolderKind::Default);

    model.start().expect("start");
    let original = Reserved::new(99u64);
    assert_eq!(original.reservation_count(), 1);

    source_input.put(original.clone()).await;
    source.flush().await.expect("flush");
    settle(&model).await;

    // Original + the two held handles; the filtered handle was released.
    assert_eq!(original.reservation_count(), 3);
    assert_eq!(held_a.lock().len(), 1);
    assert_eq!(held_b.lock().len(), 1);
    assert!(held_c.lock().is_empty());

    held_a.lock().clear();
    held_b.lock().clear();
    assert_eq!(original.reservation_count(), 1);
    model.stop();
}

#[tokio::test]
async fn inject_back_edge_makes_a_legal_live_cycle() {
    let model = WiringModelBuilder::new().build();
    let forward_stage = model
        .scheduler_builder("forwardStage")
        .with_kind(SchedulerKind::Sequential)
        .with_unhandled_capacity(1)
        .with_flushing_enabled(true)
        .build::<u64>();
    let return_stage = model
        .scheduler_builder("returnStage")
        .with_kind(SchedulerKind::Sequential)
        .with_unhandled_capacity(1)
        .with_flushing_enabled(true)
        .build::<u64>();

    let seen: Arc<Mutex<Vec<u64>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_in_handler = Arc::clone(&seen);
    // Terminating predicate: stop once the counter runs out.
    let forward_input = forward_stage.input_wire("in", move |n: u64| {
        seen_in_handler.lock().push(n);
        if n == 0 {
            None
        } else {
            Some(n)
        }
    });
    let return_input = return_stage.input_wire("in", |n: u64| Some(n - 1));

    forward_stage
        .output_wire()
        .solder_to(&return_input, SolderKind::Default);
    return_stage
        .output_wire()
        .solder_to(&forward_input, SolderKind::Inject);

    model.start().expect("start despite cycle");
    forward_input.put(5).await;

    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if seen.lock().last() == Some(&0) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("cycle should terminate, not deadlock");

    assert_eq!(*seen.lock(), vec![5, 4, 3, 2, 1, 0]);
    model.stop();
}

#[tokio::test]
async fn default_edge_cycle_is_rejected_at_start() {
    let model = WiringModelBuilder::new().build();
    let a = model
        .scheduler_builder("a")
        .with_kind(SchedulerKind::Sequential)
        .build::<u64>();
    let b = model
        .scheduler_builder("b")
        .with_kind(SchedulerKind::Sequential)
        .build::<u64>();

    let a_input = a.input_wire("in", Some);
    let b_input = b.input_wire("in", Some);
    a.output_wire().solder_to(&b_input, SolderKind::Default);
    b.output_wire().solder_to(&a_input, SolderKind::Default);

    match model.start() {
        Err(BuildError::CyclicBackpressure { cycle }) => {
            assert!(cycle.len() >= 2, "cycle path should name the vertices");
        }
        other => panic!("expected CyclicBackpressure, got {other:?}"),
    }
}

#[tokio::test]
async fn diagram_describes_vertices_and_solder_kinds() {
    let model = WiringModelBuilder::new().build();
    let producer = model
        .scheduler_builder("producer")
        .with_kind(SchedulerKind::Sequential)
        .build::<u64>();
    let consumer = model
        .scheduler_builder("consumer")
        .with_kind(SchedulerKind::Sequential)
        .build::<()>();
    let consumer_input = consumer.input_wire("in", |_: u64| None);
    producer
        .output_wire()
        .solder_to(&consumer_input, SolderKind::Inject);

    let diagram = model.diagram();
    assert!(diagram.contains("producer (sequential)"));
    assert!(diagram.contains("consumer (sequential)"));
    assert!(diagram.contains("producer -.->|in| consumer"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn heartbeat_offer_drops_ticks_at_a_full_queue() {
    let model = WiringModelBuilder::new().build();
    let slow = model
        .scheduler_builder("slow")
        .with_kind(SchedulerKind::Sequential)
        .with_unhandled_capacity(1)
        .build::<()>();

    let (gate_tx, gate_rx) = mpsc::channel::<()>();
    let gate = Mutex::new(gate_rx);
    let ticks = Arc::new(Mutex::new(0u64));
    let ticks_in_handler = Arc::clone(&ticks);
    let slow_input = slow.input_wire("in", move |_: std::time::Instant| {
        let _ = gate.lock().recv();
        *ticks_in_handler.lock() += 1;
        None
    });

    model
        .heartbeat(Duration::from_millis(20))
        .solder_to(&slow_input, SolderKind::Offer);

    model.start().expect("start");
    // The queue is gated shut; the heartbeat must keep ticking and dropping
    // without ever blocking.
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(slow.unprocessed_task_count() <= 1);

    drop(gate_tx);
    tokio::time::sleep(Duration::from_millis(100)).await;
    let handled = *ticks.lock();
    assert!(handled >= 1, "at least the queued tick should be handled");
    assert!(
        handled < 10,
        "most of the ~20 ticks should have been dropped, saw {handled}"
    );
    model.stop();
}
