//! # Type-erased scheduler internals.
//!
//! [`SchedulerCore`] carries everything the typed facade and the wires need:
//! the counters, the squelch flag, and the dispatch machinery. Typed input
//! wires hand it already-boxed task futures; the core neither knows nor cares
//! about the value types flowing through.
//!
//! ## Rules
//! - The worker of a SEQUENTIAL scheduler awaits one task at a time; a task
//!   already executing when the model stops runs to completion, queued tasks
//!   are discarded with the receiver.
//! - Squelch is checked when a task is about to invoke its handler, so it
//!   only affects future handler invocations. Squelched tasks still off-ramp.
//! - A panicking handler is caught, published as `HandlerPanicked`, logged,
//!   and the task still off-ramps. The one exception is a panic carrying a
//!   [`FatalError`](crate::error::FatalError) payload: an invariant breach
//!   like that is logged and then aborts the process rather than being
//!   isolated to the task.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::counters::Counter;
use crate::error::{describe_panic, FatalError};
use crate::events::{Bus, RuntimeEvent, RuntimeEventKind};
use crate::schedulers::SchedulerKind;

/// A task ready to execute: squelch check, handler, fan-out, off-ramp.
pub(crate) type Task = BoxFuture<'static, ()>;

/// A handler closure producing the work for one input value. The scheduler
/// wraps it with squelch/panic/off-ramp handling before it becomes a task.
pub(crate) type RawHandler<In> = Arc<dyn Fn(In) -> BoxFuture<'static, ()> + Send + Sync>;

/// The submission queue of a SEQUENTIAL scheduler. The receiver is parked
/// here until the model starts the worker.
struct TaskQueue {
    tx: mpsc::UnboundedSender<Task>,
    rx: Mutex<Option<mpsc::UnboundedReceiver<Task>>>,
}

pub(crate) struct SchedulerCore {
    name: String,
    pub(crate) kind: SchedulerKind,
    pub(crate) on_ramp: Arc<dyn Counter>,
    pub(crate) off_ramp: Arc<dyn Counter>,
    pub(crate) flushable: bool,
    pub(crate) squelchable: bool,
    squelched: AtomicBool,
    bus: Bus,
    pub(crate) token: CancellationToken,
    queue: Option<TaskQueue>,
}

impl SchedulerCore {
    pub(crate) fn new(
        name: String,
        kind: SchedulerKind,
        on_ramp: Arc<dyn Counter>,
        off_ramp: Arc<dyn Counter>,
        flushable: bool,
        squelchable: bool,
        bus: Bus,
        token: CancellationToken,
    ) -> Self {
        let queue = if kind == SchedulerKind::Sequential {
            let (tx, rx) = mpsc::unbounded_channel();
            Some(TaskQueue {
                tx,
                rx: Mutex::new(Some(rx)),
            })
        } else {
            None
        };
        Self {
            name,
            kind,
            on_ramp,
            off_ramp,
            flushable,
            squelchable,
            squelched: AtomicBool::new(false),
            bus,
            token,
            queue,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn bus(&self) -> &Bus {
        &self.bus
    }

    pub(crate) fn is_squelched(&self) -> bool {
        self.squelched.load(Ordering::Acquire)
    }

    pub(crate) fn set_squelched(&self, squelched: bool) {
        self.squelched.store(squelched, Ordering::Release);
        let kind = if squelched {
            RuntimeEventKind::SquelchStarted
        } else {
            RuntimeEventKind::SquelchStopped
        };
        self.bus
            .publish(RuntimeEvent::now(kind).with_scheduler(&self.name));
    }

    /// Hands a task to the scheduler after its on-ramp was taken.
    pub(crate) fn dispatch(&self, task: Task) {
        match self.kind {
            SchedulerKind::Sequential => {
                if let Some(queue) = &self.queue {
                    // A send error means the model stopped and the worker
                    // dropped the receiver; the task is discarded.
                    let _ = queue.tx.send(task);
                }
            }
            SchedulerKind::Concurrent => {
                tokio::spawn(task);
            }
            // Direct kinds run inline in the wire; NoOp never dispatches.
            SchedulerKind::Direct | SchedulerKind::DirectThreadsafe | SchedulerKind::NoOp => {
                debug_assert!(false, "dispatch on non-queued scheduler '{}'", self.name);
            }
        }
    }

    /// Spawns the worker loop of a SEQUENTIAL scheduler. Idempotent: the
    /// receiver can only be taken once.
    pub(crate) fn start_worker(&self) {
        let Some(queue) = &self.queue else {
            return;
        };
        let Some(mut rx) = queue.rx.lock().take() else {
            return;
        };
        let token = self.token.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    task = rx.recv() => match task {
                        Some(task) => task.await,
                        None => break,
                    },
                }
            }
        });
    }

    /// Wraps a raw handler into the full task body: squelch check, panic
    /// isolation, off-ramp.
    pub(crate) fn wrap<In: Send + 'static>(
        self: &Arc<Self>,
        raw: RawHandler<In>,
    ) -> RawHandler<In> {
        let core = Arc::clone(self);
        Arc::new(move |value: In| {
            let core = Arc::clone(&core);
            let raw = Arc::clone(&raw);
            async move {
                if !core.is_squelched() {
                    let work = raw(value);
                    match std::panic::AssertUnwindSafe(work).catch_unwind().await {
                        Ok(()) => {}
                        Err(payload) if payload.is::<FatalError>() => core.fatal_abort(&payload),
                        Err(payload) => core.report_panic(&payload),
                    }
                }
                core.off_ramp.off_ramp();
            }
            .boxed()
        })
    }

    fn report_panic(&self, payload: &(dyn std::any::Any + Send)) {
        let info = describe_panic(payload);
        error!(scheduler = %self.name, panic = %info, "handler panicked; task retired");
        self.bus.publish(
            RuntimeEvent::now(RuntimeEventKind::HandlerPanicked)
                .with_scheduler(&self.name)
                .with_detail(info),
        );
    }

    /// A handler signaled an invariant breach that must not be survived.
    fn fatal_abort(&self, payload: &(dyn std::any::Any + Send)) -> ! {
        let reason = describe_panic(payload);
        error!(scheduler = %self.name, %reason, "aborting on fatal invariant breach");
        std::process::abort();
    }
}
