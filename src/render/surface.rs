//! Drawing surface abstraction and a recording implementation.

use crate::color::Rgb;
use crate::geometry::Position;

/// Where a text position sits relative to the drawn text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Center,
    /// Horizontally centred, top edge at the position.
    CenterTop,
}

/// A 2D surface addressable in pixels, origin at the top-left corner.
pub trait Surface {
    fn size(&self) -> (f32, f32);
    fn resize(&mut self, width: f32, height: f32);
    /// Fill the whole surface, discarding what was drawn before.
    fn clear(&mut self, color: Rgb);
    fn fill_rect(&mut self, rect: Position, color: Rgb);
    fn stroke_rect(&mut self, rect: Position, width: f32, color: Rgb);
    fn fill_circle(&mut self, center: (f32, f32), radius: f32, color: Rgb);
    fn stroke_circle(&mut self, center: (f32, f32), radius: f32, width: f32, color: Rgb);
    fn text(&mut self, pos: (f32, f32), text: &str, size: f32, color: Rgb, anchor: TextAnchor);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Rgb),
    FillRect {
        rect: Position,
        color: Rgb,
    },
    StrokeRect {
        rect: Position,
        width: f32,
        color: Rgb,
    },
    FillCircle {
        center: (f32, f32),
        radius: f32,
        color: Rgb,
    },
    StrokeCircle {
        center: (f32, f32),
        radius: f32,
        width: f32,
        color: Rgb,
    },
    Text {
        pos: (f32, f32),
        text: String,
        size: f32,
        color: Rgb,
        anchor: TextAnchor,
    },
}

/// Surface that records draw commands for later replay (e.g. onto an egui
/// painter). [`Surface::clear`] drops the previous frame's commands.
#[derive(Debug, Clone, Default)]
pub struct DisplayList {
    width: f32,
    height: f32,
    commands: Vec<DrawCommand>,
}

impl DisplayList {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Texts drawn since the last clear, in order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl Surface for DisplayList {
    fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: f32, height: f32) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
    }

    fn clear(&mut self, color: Rgb) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear(color));
    }

    fn fill_rect(&mut self, rect: Position, color: Rgb) {
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    fn stroke_rect(&mut self, rect: Position, width: f32, color: Rgb) {
        self.commands
            .push(DrawCommand::StrokeRect { rect, width, color });
    }

    fn fill_circle(&mut self, center: (f32, f32), radius: f32, color: Rgb) {
        self.commands.push(DrawCommand::FillCircle {
            center,
            radius,
            color,
        });
    }

    fn stroke_circle(&mut self, center: (f32, f32), radius: f32, width: f32, color: Rgb) {
        self.commands.push(DrawCommand::StrokeCircle {
            center,
            radius,
            width,
            color,
        });
    }

    fn text(&mut self, pos: (f32, f32), text: &str, size: f32, color: Rgb, anchor: TextAnchor) {
        self.commands.push(DrawCommand::Text {
            pos,
            text: text.to_string(),
            size,
            color,
            anchor,
        });
    }
}
