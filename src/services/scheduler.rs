//! Cooperative frame and timer scheduler.
//!
//! Stands in for `requestAnimationFrame` and `setTimeout` on a single-threaded
//! event loop. Work items are plain values of type `T`; the owner drains due
//! timers and the current frame queue and decides what each item means.
//! Items requested while a frame is being processed run on the next frame.

/// Handle to a pending animation-frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

/// Handle to a pending timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug)]
struct PendingTimer<T> {
    id: u64,
    due_at: u64,
    task: T,
}

/// Frame and timer queues. Times are host milliseconds.
#[derive(Debug)]
pub struct Scheduler<T> {
    next_id: u64,
    frames: Vec<(u64, T)>,
    timers: Vec<PendingTimer<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            frames: Vec::new(),
            timers: Vec::new(),
        }
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Queues `task` for the next animation frame.
    pub fn request_frame(&mut self, task: T) -> FrameHandle {
        let id = self.allocate_id();
        self.frames.push((id, task));
        FrameHandle(id)
    }

    /// Drops a queued frame task. Returns `false` if it already ran or was cancelled.
    pub fn cancel_frame(&mut self, handle: FrameHandle) -> bool {
        let before = self.frames.len();
        self.frames.retain(|(id, _)| *id != handle.0);
        self.frames.len() != before
    }

    /// Queues `task` to fire once `now + delay_ms` has been reached.
    pub fn set_timeout(&mut self, now: u64, delay_ms: u64, task: T) -> TimerHandle {
        let id = self.allocate_id();
        self.timers.push(PendingTimer {
            id,
            due_at: now.saturating_add(delay_ms),
            task,
        });
        TimerHandle(id)
    }

    /// Drops a pending timer. Returns `false` if it already fired or was cleared.
    pub fn clear_timeout(&mut self, handle: TimerHandle) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != handle.0);
        self.timers.len() != before
    }

    /// Removes and returns every frame task queued so far, in request order.
    pub fn take_frame(&mut self) -> Vec<T> {
        std::mem::take(&mut self.frames)
            .into_iter()
            .map(|(_, task)| task)
            .collect()
    }

    /// Removes and returns the timers due at `now`, earliest first
    /// (ties broken by scheduling order).
    pub fn take_due_timers(&mut self, now: u64) -> Vec<T> {
        let (mut due, pending): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.timers)
                .into_iter()
                .partition(|t| t.due_at <= now);
        self.timers = pending;
        due.sort_by_key(|t| (t.due_at, t.id));
        due.into_iter().map(|t| t.task).collect()
    }

    /// Earliest pending timer deadline, if any.
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.iter().map(|t| t.due_at).min()
    }

    pub fn pending_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn is_idle(&self) -> bool {
        self.frames.is_empty() && self.timers.is_empty()
    }

    /// Cancels everything.
    pub fn clear(&mut self) {
        self.frames.clear();
        self.timers.clear();
    }
}
