/// Execution policy of a scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerKind {
    /// Single queue, one task at a time, FIFO. The default for stateful
    /// stages.
    Sequential,
    /// Tasks spawn onto the shared pool with no ordering. For stateless
    /// CPU-heavy stages such as the event hasher.
    Concurrent,
    /// Runs on the submitter's task with no queue. Near-free adapters.
    Direct,
    /// Like `Direct`, but safe under concurrent callers. Shared registries
    /// (nexuses, the event window manager).
    DirectThreadsafe,
    /// Discards every task. Disabled publishers.
    NoOp,
}

impl SchedulerKind {
    /// Whether submissions queue behind this scheduler.
    pub fn holds_queue(self) -> bool {
        matches!(self, SchedulerKind::Sequential | SchedulerKind::Concurrent)
    }

    /// Whether the scheduler runs handlers inline on the caller.
    pub fn is_direct(self) -> bool {
        matches!(self, SchedulerKind::Direct | SchedulerKind::DirectThreadsafe)
    }

    /// Short stable label for logs and the diagram.
    pub fn as_label(self) -> &'static str {
        match self {
            SchedulerKind::Sequential => "sequential",
            SchedulerKind::Concurrent => "concurrent",
            SchedulerKind::Direct => "direct",
            SchedulerKind::DirectThreadsafe => "direct_threadsafe",
            SchedulerKind::NoOp => "no_op",
        }
    }
}

impl std::fmt::Display for SchedulerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_label())
    }
}
