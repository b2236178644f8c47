//! Native history scroll-restoration switch.
//!
//! Browsers restore scroll offsets on back/forward navigation by themselves.
//! Scrollkeeper must be the only authority over the viewport, so the native
//! behavior is switched to manual once per process and never switched back.

use std::sync::OnceLock;

/// Value of the browser's `history.scrollRestoration` property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeScrollRestoration {
    Auto,
    Manual,
}

static MODE: OnceLock<NativeScrollRestoration> = OnceLock::new();

/// Switches native restoration to manual. Returns `true` only for the call that
/// actually performed the switch; later calls are no-ops.
pub fn disable_native_scroll_restoration() -> bool {
    let mut first = false;
    MODE.get_or_init(|| {
        first = true;
        tracing::debug!("native scroll restoration set to manual");
        NativeScrollRestoration::Manual
    });
    first
}

/// Current native mode as the host should apply it.
pub fn native_scroll_restoration() -> NativeScrollRestoration {
    MODE.get().copied().unwrap_or(NativeScrollRestoration::Auto)
}
