//! View Lifecycle Binder for Scrollkeeper.
//!
//! One `ScrollRestoration` lives as long as the view that uses it. The host
//! forwards the view's loading flags, the current location, window events and
//! the passage of time; the binder saves positions on quiet scrolls and
//! restores them once the view is ready.
//!
//! # Driving the binder
//!
//! ```
//! use scrollkeeper::managers::position_store::PositionStore;
//! use scrollkeeper::managers::scroll_restoration::{ScrollRestoration, ScrollRestorationTrait};
//! use scrollkeeper::platform::viewport::SimulatedViewport;
//! use scrollkeeper::services::session_storage::MemorySessionStorage;
//! use scrollkeeper::types::position::LocationKey;
//! use scrollkeeper::types::settings::RestorationSettings;
//!
//! let settings = RestorationSettings::default();
//! let store = PositionStore::new(MemorySessionStorage::new(), settings.storage_key_prefix.clone());
//! let key = LocationKey::new("/articles", "page=2");
//! let viewport = SimulatedViewport::new(4000.0, 800.0);
//! let mut binder = ScrollRestoration::new(store, viewport, key, settings, &[true, false], 0);
//!
//! binder.set_loading_flags(&[false, false], 120);
//! for now in (120..=400).step_by(16) {
//!     binder.advance(now);
//! }
//! assert!(!binder.is_restoring());
//! ```

use std::collections::HashSet;

use crate::managers::position_store::{PositionStore, PositionStoreTrait};
use crate::managers::restoration_monitor::{MonitorStep, RestorationMonitor};
use crate::platform::history;
use crate::platform::viewport::Viewport;
use crate::services::scheduler::{FrameHandle, Scheduler, TimerHandle};
use crate::services::scroll_animator::AnimationStep;
use crate::services::session_storage::SessionStorage;
use crate::types::events::{RestorationPhase, ViewportEvent};
use crate::types::position::{LocationKey, ScrollPosition};
use crate::types::settings::RestorationSettings;

/// Work items queued on the scheduler. Restoration tasks carry the generation
/// they were scheduled for; a task from an older generation is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
    ReadyRestore,
    StartAnimation { generation: u64 },
    AnimationStep { generation: u64 },
    MonitorStep { generation: u64 },
    ReleaseCooldown { generation: u64 },
    SavePosition,
}

/// Trait defining the operations a view uses.
pub trait ScrollRestorationTrait {
    /// Starts a restoration now if a record exists and no guard refuses it.
    fn restore(&mut self, now: u64) -> bool;
    /// Persists the current offsets for the current location.
    fn save(&mut self) -> ScrollPosition;
    /// `true` while the binder owns the viewport; views suppress their own auto-scrolls.
    fn is_restoring(&self) -> bool;
}

/// Scroll position persistence and restoration bound to one view.
pub struct ScrollRestoration<S: SessionStorage, V: Viewport> {
    settings: RestorationSettings,
    store: PositionStore<S>,
    viewport: V,
    monitor: RestorationMonitor,
    scheduler: Scheduler<Task>,
    key: LocationKey,
    enabled: bool,
    ready: bool,
    is_restoring: bool,
    generation: u64,
    subscriptions: HashSet<ViewportEvent>,
    ready_timer: Option<TimerHandle>,
    save_timer: Option<TimerHandle>,
    animation_frame: Option<FrameHandle>,
}

impl<S: SessionStorage, V: Viewport> ScrollRestoration<S, V> {
    /// Mounts an enabled binder for `key` at `now` and subscribes to window events.
    ///
    /// `loading` holds the view's loading flags at mount time. The view is
    /// ready when none is set, so a view without async data passes an empty
    /// slice and its restoration is scheduled right away.
    pub fn new(
        store: PositionStore<S>,
        viewport: V,
        key: LocationKey,
        settings: RestorationSettings,
        loading: &[bool],
        now: u64,
    ) -> Self {
        history::disable_native_scroll_restoration();

        let is_restoring = store.load(&key).is_some();
        let mut binder = Self {
            monitor: RestorationMonitor::new(settings.clone()),
            settings,
            store,
            viewport,
            scheduler: Scheduler::new(),
            key,
            enabled: true,
            ready: all_loaded(loading),
            is_restoring,
            generation: 0,
            subscriptions: HashSet::new(),
            ready_timer: None,
            save_timer: None,
            animation_frame: None,
        };
        binder.subscribe();
        binder.schedule_ready_restore(now);
        binder
    }

    // ── lifecycle inputs ─────────────────────────────────────────

    /// Updates readiness from the view's loading flags: ready iff none is set.
    pub fn set_loading_flags(&mut self, loading: &[bool], now: u64) {
        let ready = all_loaded(loading);
        if ready == self.ready {
            return;
        }
        self.ready = ready;
        tracing::trace!(key = %self.key, ready, "view readiness changed");
        self.schedule_ready_restore(now);
    }

    /// Switches to a new location. Everything in flight for the old one is
    /// cancelled and all guards are reset.
    pub fn set_location(&mut self, key: LocationKey, now: u64) {
        if key == self.key {
            return;
        }

        tracing::debug!(from = %self.key, to = %key, "location changed");
        self.cancel_pending();
        self.monitor.reset();
        self.key = key;
        self.is_restoring = self.enabled && self.store.load(&self.key).is_some();
        self.schedule_ready_restore(now);
    }

    /// Enables or disables the binder. Disabling unsubscribes from events and
    /// drops any restoration in flight.
    pub fn set_enabled(&mut self, enabled: bool, now: u64) {
        if enabled == self.enabled {
            return;
        }
        self.enabled = enabled;

        if enabled {
            self.subscribe();
            self.is_restoring = self.monitor.can_begin(&self.key)
                && self.store.load(&self.key).is_some();
            self.schedule_ready_restore(now);
        } else {
            self.cancel_pending();
            self.monitor.abort();
            self.is_restoring = false;
            self.unsubscribe();
        }
    }

    /// Forwards a window event. Events the binder is not subscribed to are ignored.
    pub fn handle_event(&mut self, event: ViewportEvent, now: u64) {
        if !self.subscriptions.contains(&event) {
            return;
        }

        if event.is_interaction() {
            if self.monitor.note_interaction(now) {
                tracing::debug!(key = %self.key, event = event.dom_name(), "user took over the viewport");
                if let Some(handle) = self.animation_frame.take() {
                    self.scheduler.cancel_frame(handle);
                }
            }
            return;
        }

        if self.monitor.is_actively_correcting() || self.is_restoring {
            return;
        }
        if let Some(handle) = self.save_timer.take() {
            self.scheduler.clear_timeout(handle);
        }
        self.save_timer = Some(self.scheduler.set_timeout(
            now,
            self.settings.save_debounce_ms,
            Task::SavePosition,
        ));
    }

    /// Runs everything due at `now`: expired timers first, then one animation frame.
    pub fn advance(&mut self, now: u64) {
        self.run_timers(now);
        self.run_frame(now);
    }

    /// Fires expired timers only.
    pub fn run_timers(&mut self, now: u64) {
        for task in self.scheduler.take_due_timers(now) {
            self.dispatch(task, now);
        }
    }

    /// Runs the tasks queued for the current animation frame. Tasks they
    /// queue in turn wait for the next frame.
    pub fn run_frame(&mut self, now: u64) {
        for task in self.scheduler.take_frame() {
            self.dispatch(task, now);
        }
    }

    /// Cancels every pending frame and timer and unsubscribes from all events.
    /// Safe to call more than once; also runs on drop.
    pub fn teardown(&mut self) {
        self.cancel_pending();
        self.unsubscribe();
    }

    // ── observation ──────────────────────────────────────────────

    pub fn key(&self) -> &LocationKey {
        &self.key
    }

    pub fn phase(&self) -> RestorationPhase {
        self.monitor.phase()
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn monitor(&self) -> &RestorationMonitor {
        &self.monitor
    }

    pub fn store(&self) -> &PositionStore<S> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut PositionStore<S> {
        &mut self.store
    }

    pub fn viewport(&self) -> &V {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut V {
        &mut self.viewport
    }

    /// Event kinds the host must currently forward, in a stable order.
    pub fn subscriptions(&self) -> Vec<ViewportEvent> {
        ViewportEvent::ALL
            .iter()
            .copied()
            .filter(|event| self.subscriptions.contains(event))
            .collect()
    }

    /// Earliest pending timer deadline, for hosts that sleep between events.
    pub fn next_deadline(&self) -> Option<u64> {
        self.scheduler.next_deadline()
    }

    /// Whether any frame or timer is still queued.
    pub fn has_pending_work(&self) -> bool {
        !self.scheduler.is_idle()
    }

    /// Whether a frame has been requested for the next repaint.
    pub fn wants_frame(&self) -> bool {
        self.scheduler.pending_frames() > 0
    }

    // ── internals ────────────────────────────────────────────────

    fn subscribe(&mut self) {
        self.subscriptions.extend(ViewportEvent::ALL.iter().copied());
    }

    fn unsubscribe(&mut self) {
        self.subscriptions.clear();
    }

    fn schedule_ready_restore(&mut self, now: u64) {
        if let Some(handle) = self.ready_timer.take() {
            self.scheduler.clear_timeout(handle);
        }
        if !self.enabled || !self.ready || !self.monitor.can_begin(&self.key) {
            return;
        }
        self.ready_timer = Some(self.scheduler.set_timeout(
            now,
            self.settings.ready_delay_ms,
            Task::ReadyRestore,
        ));
    }

    fn cancel_pending(&mut self) {
        self.generation += 1;
        self.scheduler.clear();
        self.ready_timer = None;
        self.save_timer = None;
        self.animation_frame = None;
    }

    fn dispatch(&mut self, task: Task, now: u64) {
        match task {
            Task::ReadyRestore => {
                self.ready_timer = None;
                if self.enabled && self.ready {
                    self.restore(now);
                }
            }
            Task::StartAnimation { generation } => {
                if generation != self.generation {
                    return;
                }
                self.animation_frame = None;
                if self.monitor.start_animation(&self.viewport, now) {
                    self.animation_frame = Some(
                        self.scheduler
                            .request_frame(Task::AnimationStep { generation }),
                    );
                }
            }
            Task::AnimationStep { generation } => {
                if generation != self.generation {
                    return;
                }
                self.animation_frame = None;
                if self.monitor.animation_frame(&mut self.viewport, now) == AnimationStep::Running {
                    self.animation_frame = Some(
                        self.scheduler
                            .request_frame(Task::AnimationStep { generation }),
                    );
                }
            }
            Task::MonitorStep { generation } => {
                if generation != self.generation {
                    return;
                }
                match self.monitor.monitor_frame(&mut self.viewport, now) {
                    MonitorStep::Continue => {
                        self.scheduler
                            .request_frame(Task::MonitorStep { generation });
                    }
                    MonitorStep::Finalize => {
                        self.monitor.finalize();
                        if let Some(handle) = self.animation_frame.take() {
                            self.scheduler.cancel_frame(handle);
                        }
                        self.scheduler.set_timeout(
                            now,
                            self.settings.cooldown_ms,
                            Task::ReleaseCooldown { generation },
                        );
                    }
                    MonitorStep::Stopped => {}
                }
            }
            Task::ReleaseCooldown { generation } => {
                if generation != self.generation {
                    return;
                }
                self.monitor.release();
                self.is_restoring = false;
                tracing::debug!(key = %self.key, "viewport released");
            }
            Task::SavePosition => {
                self.save_timer = None;
                if !self.monitor.is_actively_correcting() && !self.is_restoring {
                    self.store.save(&self.key, &self.viewport);
                }
            }
        }
    }
}

fn all_loaded(loading: &[bool]) -> bool {
    loading.iter().all(|flag| !flag)
}

impl<S: SessionStorage, V: Viewport> ScrollRestorationTrait for ScrollRestoration<S, V> {
    fn restore(&mut self, now: u64) -> bool {
        if !self.enabled || !self.monitor.can_begin(&self.key) {
            return false;
        }
        let Some(saved) = self.store.load(&self.key) else {
            return false;
        };
        if !self.monitor.begin(&self.key, saved, &self.viewport, now) {
            return false;
        }

        // The corrective scrolls ahead must not be recorded as the user's position.
        if let Some(handle) = self.save_timer.take() {
            self.scheduler.clear_timeout(handle);
        }

        self.generation += 1;
        let generation = self.generation;
        self.is_restoring = true;
        self.animation_frame = Some(
            self.scheduler
                .request_frame(Task::StartAnimation { generation }),
        );
        self.scheduler
            .request_frame(Task::MonitorStep { generation });
        true
    }

    fn save(&mut self) -> ScrollPosition {
        self.store.save(&self.key, &self.viewport)
    }

    fn is_restoring(&self) -> bool {
        self.is_restoring
    }
}

impl<S: SessionStorage, V: Viewport> Drop for ScrollRestoration<S, V> {
    fn drop(&mut self) {
        self.teardown();
    }
}
