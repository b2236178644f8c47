use serde::{Deserialize, Serialize};

/// Window-level events the host forwards to a scroll restoration binder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewportEvent {
    Scroll,
    Wheel,
    TouchStart,
    MouseDown,
    KeyDown,
}

impl ViewportEvent {
    /// Every event kind a binder listens to.
    pub const ALL: &'static [ViewportEvent] = &[
        ViewportEvent::Scroll,
        ViewportEvent::Wheel,
        ViewportEvent::TouchStart,
        ViewportEvent::MouseDown,
        ViewportEvent::KeyDown,
    ];

    /// Whether this event signals the user taking manual control of the viewport.
    pub fn is_interaction(self) -> bool {
        !matches!(self, ViewportEvent::Scroll)
    }

    /// The DOM event name the host should subscribe to.
    pub fn dom_name(self) -> &'static str {
        match self {
            ViewportEvent::Scroll => "scroll",
            ViewportEvent::Wheel => "wheel",
            ViewportEvent::TouchStart => "touchstart",
            ViewportEvent::MouseDown => "mousedown",
            ViewportEvent::KeyDown => "keydown",
        }
    }
}

/// Visible phase of a restoration, as reported by the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RestorationPhase {
    Idle,
    Animating,
    Correcting,
    Finalizing,
}
