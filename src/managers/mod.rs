// Scrollkeeper state managers
// Managers own per-view state: saved positions, the restoration state machine, its binder, view tracking.

pub mod position_store;
pub mod restoration_monitor;
pub mod scroll_restoration;
pub mod view_tracker;
