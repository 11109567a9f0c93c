//! Surface-space rectangles and the per-frame layout map.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in surface pixels. `(x, y)` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Position {
    /// Negative extents are clamped to zero.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// Square of side `2 * radius` centred on `(cx, cy)`.
    pub fn centered(cx: f32, cy: f32, radius: f32) -> Self {
        Self::new(cx - radius, cy - radius, radius * 2.0, radius * 2.0)
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Edges are inclusive.
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }

    /// Radius of the largest circle inscribed in the rectangle.
    pub fn inner_radius(&self) -> f32 {
        self.width.min(self.height) * 0.5
    }
}

/// Entity id → rectangle. Insertion order is layout order, which is also the
/// order hit-testing scans in.
pub type LayoutMap = IndexMap<String, Position>;

/// Return the first entity whose rectangle contains the point.
pub fn pick(layout: &LayoutMap, x: f32, y: f32) -> Option<&str> {
    layout
        .iter()
        .find(|(_, pos)| pos.contains(x, y))
        .map(|(id, _)| id.as_str())
}
