//! Restoration Monitor for Scrollkeeper.
//!
//! Owns the restoration state machine `Idle -> Animating -> Correcting ->
//! Finalizing -> Idle`. The monitor never schedules anything itself: the
//! binder calls it once per animation frame and acts on what it returns.
//! Restoration is vertical only: every write scrolls to `(0, target.y)`.

use crate::platform::viewport::Viewport;
use crate::services::scroll_animator::{AnimationStep, ScrollAnimator};
use crate::types::events::RestorationPhase;
use crate::types::position::{LocationKey, ScrollPosition};
use crate::types::settings::RestorationSettings;

/// What the binder should do after a monitor frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorStep {
    /// Keep correcting; request another frame.
    Continue,
    /// Stop correcting and start the cool-down.
    Finalize,
    /// The loop no longer owns the viewport; drop it.
    Stopped,
}

/// Per-mount restoration state.
#[derive(Debug)]
pub struct RestorationMonitor {
    settings: RestorationSettings,
    phase: RestorationPhase,
    has_restored_key: Option<LocationKey>,
    is_actively_correcting: bool,
    user_interacted: bool,
    restoration_start: u64,
    last_observed_height: f64,
    active_key: Option<LocationKey>,
    target: Option<ScrollPosition>,
    animator: Option<ScrollAnimator>,
    frame: u64,
}

impl RestorationMonitor {
    pub fn new(settings: RestorationSettings) -> Self {
        Self {
            settings,
            phase: RestorationPhase::Idle,
            has_restored_key: None,
            is_actively_correcting: false,
            user_interacted: false,
            restoration_start: 0,
            last_observed_height: 0.0,
            active_key: None,
            target: None,
            animator: None,
            frame: 0,
        }
    }

    /// Whether a restoration for `key` may start now.
    pub fn can_begin(&self, key: &LocationKey) -> bool {
        !self.is_actively_correcting && self.has_restored_key.as_ref() != Some(key)
    }

    /// Idle -> Animating. Returns `false` when a guard refuses the restoration.
    pub fn begin<V: Viewport + ?Sized>(
        &mut self,
        key: &LocationKey,
        target: ScrollPosition,
        viewport: &V,
        now: u64,
    ) -> bool {
        if !self.can_begin(key) {
            return false;
        }

        self.phase = RestorationPhase::Animating;
        self.is_actively_correcting = true;
        self.user_interacted = false;
        self.restoration_start = now;
        self.last_observed_height = viewport.document_height();
        self.active_key = Some(key.clone());
        self.target = Some(target);
        self.animator = None;
        self.frame = 0;

        tracing::debug!(key = %key, target_y = target.y, "restoration started");
        true
    }

    /// Creates the animator on the first frame after `begin`. Returns whether
    /// an animation is now running.
    pub fn start_animation<V: Viewport + ?Sized>(&mut self, viewport: &V, now: u64) -> bool {
        let Some(target) = self.target else {
            return false;
        };
        if !self.is_actively_correcting || self.user_interacted {
            return false;
        }

        self.animator = Some(ScrollAnimator::start(
            viewport,
            0.0,
            target.y,
            self.settings.animation_duration_ms,
            now,
        ));
        true
    }

    /// Samples the scroll-in animation. Once it ends, the phase moves on to Correcting.
    pub fn animation_frame<V: Viewport + ?Sized>(
        &mut self,
        viewport: &mut V,
        now: u64,
    ) -> AnimationStep {
        let Some(animator) = self.animator.as_mut() else {
            return AnimationStep::Cancelled;
        };

        let step = animator.step(viewport, now, self.user_interacted);
        if step != AnimationStep::Running {
            self.animator = None;
            if self.phase == RestorationPhase::Animating {
                self.phase = RestorationPhase::Correcting;
            }
        }
        step
    }

    /// One iteration of the correction loop.
    pub fn monitor_frame<V: Viewport + ?Sized>(&mut self, viewport: &mut V, now: u64) -> MonitorStep {
        let Some(target) = self.target else {
            return MonitorStep::Stopped;
        };
        if !self.is_actively_correcting || self.phase == RestorationPhase::Finalizing {
            return MonitorStep::Stopped;
        }

        let elapsed = now.saturating_sub(self.restoration_start);

        // User intent overrides restoration.
        if self.user_interacted && elapsed >= self.settings.cancel_after_ms {
            tracing::debug!(elapsed, "restoration cancelled by user interaction");
            return MonitorStep::Finalize;
        }

        self.frame += 1;

        let height = viewport.document_height();
        if height != self.last_observed_height {
            if elapsed > self.settings.animation_duration_ms {
                tracing::trace!(
                    elapsed,
                    from = self.last_observed_height,
                    to = height,
                    "layout shift, re-snapping"
                );
                viewport.scroll_to(0.0, target.y);
            }
            self.last_observed_height = height;
        }

        if elapsed > self.settings.settle_buffer_ms {
            let off_target =
                (viewport.scroll_y() - target.y).abs() > self.settings.drift_tolerance_px;
            let periodic = self.frame % self.settings.reassert_every_frames.max(1) == 0;
            if off_target || periodic {
                viewport.scroll_to(0.0, target.y);
            }
        }

        if elapsed < self.settings.monitor_window_ms {
            MonitorStep::Continue
        } else {
            MonitorStep::Finalize
        }
    }

    /// Correcting -> Finalizing. The key now counts as restored.
    pub fn finalize(&mut self) {
        if self.phase == RestorationPhase::Finalizing || self.phase == RestorationPhase::Idle {
            return;
        }
        self.has_restored_key = self.active_key.clone();
        self.animator = None;
        self.phase = RestorationPhase::Finalizing;
        tracing::debug!(key = ?self.has_restored_key.as_ref().map(|k| k.as_str()), "restoration finalized");
    }

    /// Finalizing -> Idle, at the end of the cool-down.
    pub fn release(&mut self) {
        self.is_actively_correcting = false;
        self.phase = RestorationPhase::Idle;
        self.active_key = None;
        self.target = None;
        self.animator = None;
    }

    /// Records a manual interaction. Returns `true` if it cancels the restoration,
    /// i.e. correction is active and the grace period has passed.
    pub fn note_interaction(&mut self, now: u64) -> bool {
        if !self.is_actively_correcting {
            return false;
        }
        if now.saturating_sub(self.restoration_start) <= self.settings.interaction_grace_ms {
            return false;
        }

        self.user_interacted = true;
        self.animator = None;
        if self.phase == RestorationPhase::Animating {
            self.phase = RestorationPhase::Correcting;
        }
        true
    }

    /// Aborts any restoration in flight without marking the key as restored.
    pub fn abort(&mut self) {
        self.release();
        self.user_interacted = false;
    }

    /// Clears every guard; used when the location changes.
    pub fn reset(&mut self) {
        self.abort();
        self.has_restored_key = None;
    }

    pub fn phase(&self) -> RestorationPhase {
        self.phase
    }

    pub fn is_actively_correcting(&self) -> bool {
        self.is_actively_correcting
    }

    pub fn user_interacted(&self) -> bool {
        self.user_interacted
    }

    pub fn has_restored_key(&self) -> Option<&LocationKey> {
        self.has_restored_key.as_ref()
    }

    pub fn restoration_start(&self) -> u64 {
        self.restoration_start
    }

    pub fn last_observed_height(&self) -> f64 {
        self.last_observed_height
    }

    pub fn target(&self) -> Option<ScrollPosition> {
        self.target
    }

    pub fn settings(&self) -> &RestorationSettings {
        &self.settings
    }
}
