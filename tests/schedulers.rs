//! Scheduler behavior: ordering, backpressure, squelching, panic isolation,
//! and build-time validation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;

use parking_lot::Mutex;
use wirevisor::{
    BuildError, ComponentWiring, RuntimeEventKind, SchedulerConfig, SchedulerKind, SolderKind,
    WiringModelBuilder,
};

#[tokio::test]
async fn sequential_scheduler_preserves_fifo_order() {
    let model = WiringModelBuilder::new().build();
    let scheduler = model
        .scheduler_builder("collector")
        .with_kind(SchedulerKind::Sequential)
        .with_flushing_enabled(true)
        .build::<()>();

    let log: Arc<Mutex<Vec<u64>>> = Arc::new(Mutex::new(Vec::new()));
    let log_in_handler = Arc::clone(&log);
    let input = scheduler.input_wire("in", move |n: u64| {
        log_in_handler.lock().push(n);
        None
    });

    model.start().expect("start");
    for n in 0..50 {
        input.put(n).await;
    }
    scheduler.flush().await.expect("flush");

    assert_eq!(*log.lock(), (0..50).collect::<Vec<u64>>());
    assert_eq!(scheduler.unprocessed_task_count(), 0);
    model.stop();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sequential_backpressure_blocks_upstream() {
    let model = WiringModelBuilder::new().build();
    let upstream = model
        .scheduler_builder("upstream")
        .with_kind(SchedulerKind::Sequential)
        .with_flushing_enabled(true)
        .build::<u64>();
    let downstream = model
        .scheduler_builder("downstream")
        .with_kind(SchedulerKind::Sequential)
        .with_unhandled_capacity(2)
        .with_flushing_enabled(true)
        .build::<()>();

    let upstream_input = upstream.input_wire("in", Some);

    let (gate_tx, gate_rx) = mpsc::channel::<()>();
    let gate = Mutex::new(gate_rx);
    let log: Arc<Mutex<Vec<u64>>> = Arc::new(Mutex::new(Vec::new()));
    let log_in_handler = Arc::clone(&log);
    let downstream_input = downstream.input_wire("in", move |n: u64| {
        let _ = gate.lock().recv();
        log_in_handler.lock().push(n);
        None
    });
    upstream
        .output_wire()
        .solder_to(&downstream_input, SolderKind::Default);

    model.start().expect("start");
    for n in 0..5 {
        upstream_input.put(n).await;
    }

    // The downstream is gated shut with capacity 2: items 0 and 1 occupy it,
    // the forward of item 2 parks, items 3 and 4 wait in the upstream queue.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(log.lock().is_empty());
    assert_eq!(downstream.unprocessed_task_count(), 2);
    assert_eq!(upstream.unprocessed_task_count(), 3);

    // One off-ramp lets exactly one parked forward proceed.
    gate_tx.send(()).expect("gate");
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(downstream.unprocessed_task_count(), 2);

    drop(gate_tx);
    upstream.flush().await.expect("flush upstream");
    downstream.flush().await.expect("flush downstream");
    assert_eq!(*log.lock(), vec![0, 1, 2, 3, 4]);
    model.stop();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_scheduler_runs_in_parallel() {
    let model = WiringModelBuilder::new().build();
    let scheduler = model
        .scheduler_builder("hasher")
        .with_kind(SchedulerKind::Concurrent)
        .with_flushing_enabled(true)
        .build::<()>();

    let in_flight = Arc::new(AtomicU64::new(0));
    let peak = Arc::new(AtomicU64::new(0));
    let in_flight_handler = Arc::clone(&in_flight);
    let peak_handler = Arc::clone(&peak);
    let input = scheduler.input_wire("in", move |_: u64| {
        let now = in_flight_handler.fetch_add(1, Ordering::SeqCst) + 1;
        peak_handler.fetch_max(now, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(100));
        in_flight_handler.fetch_sub(1, Ordering::SeqCst);
        None
    });

    model.start().expect("start");
    for n in 0..4 {
        input.put(n).await;
    }
    scheduler.flush().await.expect("flush");

    assert!(peak.load(Ordering::SeqCst) > 1, "tasks never overlapped");
    model.stop();
}

#[tokio::test]
async fn squelched_scheduler_discards_but_still_retires_tasks() {
    let model = WiringModelBuilder::new().build();
    let scheduler = model
        .scheduler_builder("engine")
        .with_kind(SchedulerKind::Sequential)
        .with_flushing_enabled(true)
        .with_squelching_enabled(true)
        .build::<()>();

    let log: Arc<Mutex<Vec<u64>>> = Arc::new(Mutex::new(Vec::new()));
    let log_in_handler = Arc::clone(&log);
    let input = scheduler.input_wire("in", move |n: u64| {
        log_in_handler.lock().push(n);
        None
    });

    model.start().expect("start");
    scheduler.start_squelching().expect("squelchable");
    for n in 0..10 {
        input.put(n).await;
    }
    scheduler.flush().await.expect("flush");
    assert!(log.lock().is_empty());
    assert_eq!(scheduler.unprocessed_task_count(), 0);

    scheduler.stop_squelching().expect("squelchable");
    input.put(42).await;
    scheduler.flush().await.expect("flush");
    assert_eq!(*log.lock(), vec![42]);
    model.stop();
}

#[tokio::test]
async fn handler_panic_is_isolated_and_reported() {
    let model = WiringModelBuilder::new().build();
    let scheduler = model
        .scheduler_builder("flaky")
        .with_kind(SchedulerKind::Sequential)
        .with_flushing_enabled(true)
        .build::<()>();

    let log: Arc<Mutex<Vec<u64>>> = Arc::new(Mutex::new(Vec::new()));
    let log_in_handler = Arc::clone(&log);
    let input = scheduler.input_wire("in", move |n: u64| {
        if n == 1 {
            panic!("boom");
        }
        log_in_handler.lock().push(n);
        None
    });

    let mut events = model.subscribe();
    model.start().expect("start");
    input.put(1).await;
    input.put(2).await;
    scheduler.flush().await.expect("flush");

    assert_eq!(*log.lock(), vec![2]);
    let mut saw_panic = false;
    while let Ok(event) = events.try_recv() {
        if event.kind == RuntimeEventKind::HandlerPanicked {
            saw_panic = true;
            assert_eq!(event.scheduler.as_deref(), Some("flaky"));
        }
    }
    assert!(saw_panic, "HandlerPanicked was never published");
    model.stop();
}

#[tokio::test]
async fn direct_scheduler_runs_on_the_caller() {
    let model = WiringModelBuilder::new().build();
    let scheduler = model
        .scheduler_builder("adapter")
        .with_kind(SchedulerKind::Direct)
        .build::<()>();

    let log: Arc<Mutex<Vec<u64>>> = Arc::new(Mutex::new(Vec::new()));
    let log_in_handler = Arc::clone(&log);
    let input = scheduler.input_wire("in", move |n: u64| {
        log_in_handler.lock().push(n);
        None
    });

    // Direct schedulers have no queue: the value lands before put returns,
    // started model or not.
    input.put(7).await;
    assert_eq!(*log.lock(), vec![7]);
}

#[tokio::test]
async fn no_op_scheduler_drops_everything() {
    let model = WiringModelBuilder::new().build();
    let scheduler = model
        .scheduler_builder("disabledPublisher")
        .with_kind(SchedulerKind::NoOp)
        .build::<()>();

    let touched = Arc::new(AtomicU64::new(0));
    let touched_handler = Arc::clone(&touched);
    let input = scheduler.input_wire("in", move |_: u64| {
        touched_handler.fetch_add(1, Ordering::SeqCst);
        None
    });

    model.start().expect("start");
    input.put(1).await;
    input.inject(2).await;
    assert!(input.offer(3).await);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(touched.load(Ordering::SeqCst), 0);
    assert_eq!(scheduler.unprocessed_task_count(), 0);
    model.stop();
}

#[tokio::test]
async fn flush_on_non_flushable_scheduler_is_an_error() {
    let model = WiringModelBuilder::new().build();
    let scheduler = model
        .scheduler_builder("plain")
        .with_kind(SchedulerKind::Sequential)
        .build::<()>();
    let _input = scheduler.input_wire("in", |_: u64| None);

    model.start().expect("start");
    assert!(scheduler.flush().await.is_err());
    assert!(scheduler.start_squelching().is_err());
    model.stop();
}

#[tokio::test]
async fn duplicate_scheduler_name_fails_at_start() {
    let model = WiringModelBuilder::new().build();
    let _a = model
        .scheduler_builder("twin")
        .with_kind(SchedulerKind::Sequential)
        .build::<()>();
    let _b = model
        .scheduler_builder("twin")
        .with_kind(SchedulerKind::Sequential)
        .build::<()>();

    assert!(matches!(
        model.start(),
        Err(BuildError::DuplicateScheduler { .. })
    ));
}

#[tokio::test]
async fn double_bind_fails_at_start() {
    struct Noop;

    let model = WiringModelBuilder::new().build();
    let wiring: ComponentWiring<Noop, ()> =
        ComponentWiring::new(&model, "boundTwice", &SchedulerConfig::sequential(8));
    let _input = wiring.input_wire("in", |_c: &mut Noop, _n: u64| None);
    wiring.bind(Noop);
    wiring.bind(Noop);

    assert!(matches!(model.start(), Err(BuildError::DoubleBind { .. })));
}

#[tokio::test]
async fn unbound_component_fails_at_start() {
    struct Noop;

    let model = WiringModelBuilder::new().build();
    let wiring: ComponentWiring<Noop, ()> =
        ComponentWiring::new(&model, "neverBound", &SchedulerConfig::sequential(8));
    let _input = wiring.input_wire("in", |_c: &mut Noop, _n: u64| None);

    match model.start() {
        Err(BuildError::UnboundComponent { name }) => assert_eq!(name, "neverBound"),
        other => panic!("expected UnboundComponent, got {other:?}"),
    }
}
