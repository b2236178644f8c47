use serde::{Deserialize, Serialize};

/// Top-level settings container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ScrollkeeperSettings {
    pub restoration: RestorationSettings,
    pub view_tracking: ViewTrackingSettings,
}

/// Timings and thresholds for scroll restoration. All durations are milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RestorationSettings {
    /// Prefix prepended to the location key in session storage.
    pub storage_key_prefix: String,
    /// Length of the eased scroll-in animation.
    pub animation_duration_ms: u64,
    /// Total time the correction loop may own the viewport.
    pub monitor_window_ms: u64,
    /// Time after start before drift correction kicks in.
    pub settle_buffer_ms: u64,
    /// Allowed distance from the target before a forced re-snap.
    pub drift_tolerance_px: f64,
    /// Force a re-snap every N-th monitor frame regardless of drift. Must be at least 1.
    pub reassert_every_frames: u64,
    /// Interactions earlier than this after start are ignored.
    pub interaction_grace_ms: u64,
    /// An interaction only finalizes the loop once this much time has elapsed.
    pub cancel_after_ms: u64,
    /// Delay between finalizing and releasing ownership of the viewport.
    pub cooldown_ms: u64,
    /// Quiet period before a scroll is persisted.
    pub save_debounce_ms: u64,
    /// Delay between a view becoming ready and restoration starting.
    pub ready_delay_ms: u64,
}

impl Default for RestorationSettings {
    fn default() -> Self {
        Self {
            storage_key_prefix: "scroll_position_".to_string(),
            animation_duration_ms: 1600,
            monitor_window_ms: 10_000,
            settle_buffer_ms: 2000,
            drift_tolerance_px: 3.0,
            reassert_every_frames: 2,
            interaction_grace_ms: 300,
            cancel_after_ms: 400,
            cooldown_ms: 800,
            save_debounce_ms: 250,
            ready_delay_ms: 32,
        }
    }
}

/// Thresholds for article view-time tracking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewTrackingSettings {
    /// Active viewing time required before a view counts.
    pub min_view_secs: u64,
    /// Interval between re-checks when the threshold is not yet met.
    pub recheck_ms: u64,
    /// Lower bound for the check scheduled after the page becomes visible again.
    pub min_resume_ms: u64,
}

impl Default for ViewTrackingSettings {
    fn default() -> Self {
        Self {
            min_view_secs: 30,
            recheck_ms: 10_000,
            min_resume_ms: 1000,
        }
    }
}
