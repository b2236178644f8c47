//! View Tracker for Scrollkeeper.
//!
//! Counts an article view only after a minimum amount of *visible* time.
//! Time spent in a hidden tab is not counted. The tracker produces at most
//! one [`ViewReport`] per article; sending it is up to the host.

use crate::types::settings::ViewTrackingSettings;
use crate::types::view::{ReportDelivery, ViewReport};

/// Trait defining view-time tracking operations.
pub trait ViewTrackerTrait {
    /// Page visibility changed (tab switched away or back).
    fn on_visibility_change(&mut self, hidden: bool, now: u64);
    /// Runs a pending check if it is due.
    fn poll(&mut self, now: u64) -> Option<ViewReport>;
    /// The page is going away: report by beacon if the threshold was met.
    fn teardown(&mut self, now: u64) -> Option<ViewReport>;
    fn is_tracked(&self) -> bool;
}

/// Visible-time accumulator for one article.
#[derive(Debug, Clone)]
pub struct ViewTracker {
    settings: ViewTrackingSettings,
    article_slug: String,
    tracked: bool,
    visible: bool,
    accumulated_ms: u64,
    last_visible_at: u64,
    next_check_at: Option<u64>,
    finished: bool,
}

impl ViewTracker {
    /// Starts tracking `article_slug`. An empty slug yields an inert tracker.
    pub fn new(article_slug: &str, visible: bool, now: u64, settings: ViewTrackingSettings) -> Self {
        let threshold_ms = settings.min_view_secs * 1000;
        let inert = article_slug.is_empty();
        Self {
            article_slug: article_slug.to_string(),
            tracked: false,
            visible,
            accumulated_ms: 0,
            last_visible_at: now,
            next_check_at: if visible && !inert {
                Some(now + threshold_ms)
            } else {
                None
            },
            finished: inert,
            settings,
        }
    }

    /// Switches to another article: the current one is torn down first and
    /// its beacon report, if any, is returned.
    pub fn set_article(&mut self, article_slug: &str, visible: bool, now: u64) -> Option<ViewReport> {
        if article_slug == self.article_slug && !self.finished {
            return None;
        }
        let report = self.teardown(now);
        *self = Self::new(article_slug, visible, now, self.settings.clone());
        report
    }

    pub fn article_slug(&self) -> &str {
        &self.article_slug
    }

    /// Visible time so far, including the current visible stretch.
    pub fn active_ms(&self, now: u64) -> u64 {
        let current = if self.visible {
            now.saturating_sub(self.last_visible_at)
        } else {
            0
        };
        self.accumulated_ms + current
    }

    /// When the next check is due, if one is scheduled.
    pub fn next_check_at(&self) -> Option<u64> {
        self.next_check_at
    }

    fn report(&self, now: u64, delivery: ReportDelivery) -> Option<ViewReport> {
        let session_duration = self.active_ms(now) / 1000;
        if session_duration < self.settings.min_view_secs {
            return None;
        }
        Some(ViewReport {
            article_slug: self.article_slug.clone(),
            session_duration,
            delivery,
        })
    }
}

impl ViewTrackerTrait for ViewTracker {
    fn on_visibility_change(&mut self, hidden: bool, now: u64) {
        if self.finished || hidden != self.visible {
            // Already in that state.
            return;
        }

        if hidden {
            self.accumulated_ms += now.saturating_sub(self.last_visible_at);
            self.visible = false;
            self.next_check_at = None;
        } else {
            self.visible = true;
            self.last_visible_at = now;
            if !self.tracked {
                let threshold_ms = self.settings.min_view_secs * 1000;
                let remaining = threshold_ms
                    .saturating_sub(self.accumulated_ms)
                    .max(self.settings.min_resume_ms);
                self.next_check_at = Some(now + remaining);
            }
        }
    }

    fn poll(&mut self, now: u64) -> Option<ViewReport> {
        if self.tracked || self.finished {
            return None;
        }
        match self.next_check_at {
            Some(due) if due <= now => {}
            _ => return None,
        }

        match self.report(now, ReportDelivery::Request) {
            Some(report) => {
                self.tracked = true;
                self.next_check_at = None;
                tracing::info!(
                    article = %report.article_slug,
                    seconds = report.session_duration,
                    "article view qualified"
                );
                Some(report)
            }
            None => {
                self.next_check_at = Some(now + self.settings.recheck_ms);
                None
            }
        }
    }

    fn teardown(&mut self, now: u64) -> Option<ViewReport> {
        if self.finished {
            return None;
        }
        self.finished = true;
        self.next_check_at = None;
        if self.tracked {
            return None;
        }

        let report = self.report(now, ReportDelivery::Beacon)?;
        self.tracked = true;
        tracing::info!(
            article = %report.article_slug,
            seconds = report.session_duration,
            "article view qualified at teardown"
        );
        Some(report)
    }

    fn is_tracked(&self) -> bool {
        self.tracked
    }
}
