//! Eased, cancelable scroll animation.
//!
//! One sample per animation frame. The start offset is read when the
//! animation is created, not when it was requested, so an offset that moved
//! between request and first frame is animated from where it actually is.

use crate::platform::viewport::Viewport;

/// Quintic ease-out: fast start, very soft landing. `t` is clamped to `[0, 1]`.
pub fn ease_out_quint(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0) - 1.0;
    1.0 + t.powi(5)
}

/// Outcome of one animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationStep {
    /// An intermediate offset was written; request another frame.
    Running,
    /// The target offset was written; the animation is over.
    Finished,
    /// The cancellation flag was set; nothing was written.
    Cancelled,
}

/// A single scroll-in animation toward `target_y`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollAnimator {
    x: f64,
    start_y: f64,
    target_y: f64,
    start_time: u64,
    duration_ms: u64,
}

impl ScrollAnimator {
    pub fn start<V: Viewport + ?Sized>(
        viewport: &V,
        x: f64,
        target_y: f64,
        duration_ms: u64,
        now: u64,
    ) -> Self {
        Self {
            x,
            start_y: viewport.scroll_y(),
            target_y,
            start_time: now,
            duration_ms,
        }
    }

    /// Linear progress in `[0, 1]` at `now`.
    pub fn progress(&self, now: u64) -> f64 {
        if self.duration_ms == 0 {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.start_time) as f64;
        (elapsed / self.duration_ms as f64).min(1.0)
    }

    /// Offset the animation prescribes at `now`.
    pub fn offset_at(&self, now: u64) -> f64 {
        let progress = self.progress(now);
        if progress >= 1.0 {
            return self.target_y;
        }
        self.start_y + (self.target_y - self.start_y) * ease_out_quint(progress)
    }

    /// Samples one frame. `cancelled` is checked before anything is written.
    pub fn step<V: Viewport + ?Sized>(
        &mut self,
        viewport: &mut V,
        now: u64,
        cancelled: bool,
    ) -> AnimationStep {
        if cancelled {
            return AnimationStep::Cancelled;
        }

        viewport.scroll_to(self.x, self.offset_at(now));
        if self.progress(now) >= 1.0 {
            AnimationStep::Finished
        } else {
            AnimationStep::Running
        }
    }

    pub fn start_y(&self) -> f64 {
        self.start_y
    }

    pub fn target_y(&self) -> f64 {
        self.target_y
    }
}
