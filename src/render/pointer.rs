//! Distinguishes plain clicks from press-drag-release gestures.
//!
//! Nothing pans or moves on drag; the gesture is only tracked so that the
//! click the host reports after releasing a drag does not change the selection.

/// Movement (in pixels) while pressed after which a press becomes a drag.
pub const DRAG_THRESHOLD: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragPhase {
    #[default]
    Idle,
    Pressed,
    Dragging,
}

#[derive(Debug, Clone)]
pub struct PointerTracker {
    threshold: f32,
    phase: DragPhase,
    press_origin: (f32, f32),
    suppress_click: bool,
}

impl Default for PointerTracker {
    fn default() -> Self {
        Self::new(DRAG_THRESHOLD)
    }
}

impl PointerTracker {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold: threshold.max(0.0),
            phase: DragPhase::Idle,
            press_origin: (0.0, 0.0),
            suppress_click: false,
        }
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    pub fn press(&mut self, x: f32, y: f32) {
        self.phase = DragPhase::Pressed;
        self.press_origin = (x, y);
        self.suppress_click = false;
    }

    /// Returns true when this move started a drag.
    pub fn move_to(&mut self, x: f32, y: f32) -> bool {
        if self.phase != DragPhase::Pressed {
            return false;
        }
        let (ox, oy) = self.press_origin;
        let (dx, dy) = (x - ox, y - oy);
        if (dx * dx + dy * dy).sqrt() > self.threshold {
            self.phase = DragPhase::Dragging;
            return true;
        }
        false
    }

    pub fn release(&mut self) {
        self.suppress_click = self.phase == DragPhase::Dragging;
        self.phase = DragPhase::Idle;
    }

    /// Whether a click reported now should select. Consumes the suppression
    /// left behind by a drag.
    pub fn take_click(&mut self) -> bool {
        !std::mem::take(&mut self.suppress_click)
    }
}
