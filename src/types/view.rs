use serde::{Deserialize, Serialize};

/// How a qualified view should be delivered to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportDelivery {
    /// Regular request while the page is alive.
    Request,
    /// Fire-and-forget beacon while the page is being torn down.
    Beacon,
}

/// A qualified article view, ready to be posted to the track-view endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewReport {
    pub article_slug: String,
    /// Whole seconds of active (visible) viewing.
    pub session_duration: u64,
    pub delivery: ReportDelivery,
}

impl ViewReport {
    /// Endpoint path relative to the API base URL.
    pub fn endpoint_path(&self) -> String {
        format!("/articles/{}/track-view", self.article_slug)
    }

    /// JSON request body.
    pub fn body(&self) -> serde_json::Value {
        serde_json::json!({ "session_duration": self.session_duration })
    }
}
