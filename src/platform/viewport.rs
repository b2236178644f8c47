//! Viewport seam between the restoration engine and the host window.

/// The scrollable window as seen by the restoration engine.
pub trait Viewport {
    fn scroll_x(&self) -> f64;
    fn scroll_y(&self) -> f64;
    /// Programmatic scroll. Implementations clamp to the scrollable range.
    fn scroll_to(&mut self, x: f64, y: f64);
    /// Total scrollable height of the document.
    fn document_height(&self) -> f64;
}

/// Deterministic in-process viewport used by tests and the demo binary.
///
/// Offsets are clamped to `[0, document_height - viewport_height]` like a real
/// window, so content that has not loaded yet limits how far a restore can go.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedViewport {
    scroll_x: f64,
    scroll_y: f64,
    document_height: f64,
    viewport_height: f64,
    programmatic_scrolls: u64,
}

impl SimulatedViewport {
    pub fn new(document_height: f64, viewport_height: f64) -> Self {
        Self {
            scroll_x: 0.0,
            scroll_y: 0.0,
            document_height,
            viewport_height,
            programmatic_scrolls: 0,
        }
    }

    pub fn max_scroll_y(&self) -> f64 {
        (self.document_height - self.viewport_height).max(0.0)
    }

    /// Moves the viewport the way a user would (not counted as programmatic).
    pub fn user_scroll_to(&mut self, y: f64) {
        self.scroll_y = y.clamp(0.0, self.max_scroll_y());
    }

    /// Changes the document height, re-clamping the current offset.
    pub fn set_document_height(&mut self, height: f64) {
        self.document_height = height.max(0.0);
        self.scroll_y = self.scroll_y.clamp(0.0, self.max_scroll_y());
    }

    /// Content above the fold changed size: new height and the offset the
    /// browser ends up at afterwards.
    pub fn shift_layout(&mut self, document_height: f64, resulting_y: f64) {
        self.set_document_height(document_height);
        self.user_scroll_to(resulting_y);
    }

    /// Number of `scroll_to` calls made through the [`Viewport`] trait.
    pub fn programmatic_scrolls(&self) -> u64 {
        self.programmatic_scrolls
    }
}

impl Viewport for SimulatedViewport {
    fn scroll_x(&self) -> f64 {
        self.scroll_x
    }

    fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    fn scroll_to(&mut self, x: f64, y: f64) {
        self.programmatic_scrolls += 1;
        self.scroll_x = x.max(0.0);
        self.scroll_y = y.clamp(0.0, self.max_scroll_y());
    }

    fn document_height(&self) -> f64 {
        self.document_height
    }
}
