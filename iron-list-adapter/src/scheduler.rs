/// Pending deferred work, one named handle per operation.
///
/// Re-scheduling an operation replaces its previous handle, so at most one
/// instance of each is ever pending. The host drives execution through
/// `run_frame` / `run_idle` / `run_timers` on the scroller; `flush` runs
/// everything to quiescence.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Scheduler {
    /// Full render pass on the next frame.
    pub render: bool,
    /// Re-check placeholder-sized elements on the next frame.
    pub placeholder_clear: bool,
    /// Urgent pool growth, drained at the end of the current entry point.
    pub pool_grow: Option<usize>,
    /// Back-buffer pool growth, runs at idle time.
    pub idle_grow: Option<usize>,
    /// Deadline (ms) for the focus-preserving element reorder.
    pub reorder_at: Option<u64>,
    /// Deadline (ms) for the invalid-position check.
    pub reposition_at: Option<u64>,
}

impl Scheduler {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn cancel_growth(&mut self) {
        self.pool_grow = None;
        self.idle_grow = None;
    }
}
