#![cfg(feature = "egui")]

use eframe::egui::{self, Align2, Color32, Pos2, Rect, Stroke, Vec2};

use crate::color::Rgb;
use crate::render::{DisplayList, DrawCommand, Surface, TextAnchor};

pub fn rgb_to_color32(c: Rgb) -> Color32 {
    Color32::from_rgb(c.0, c.1, c.2)
}

fn to_screen(origin: Pos2, (x, y): (f32, f32)) -> Pos2 {
    origin + Vec2::new(x, y)
}

/// Replay the recorded frame onto `painter`, translating surface coordinates
/// by `origin` (the canvas' top-left corner on screen).
pub fn paint_display_list(painter: &egui::Painter, origin: Pos2, list: &DisplayList) {
    let (width, height) = list.size();
    for command in list.commands() {
        match command {
            DrawCommand::Clear(color) => {
                let rect = Rect::from_min_size(origin, Vec2::new(width, height));
                painter.rect_filled(rect, 0.0, rgb_to_color32(*color));
            }
            DrawCommand::FillRect { rect, color } => {
                let r = Rect::from_min_size(
                    to_screen(origin, (rect.x, rect.y)),
                    Vec2::new(rect.width, rect.height),
                );
                painter.rect_filled(r, 4.0, rgb_to_color32(*color));
            }
            DrawCommand::StrokeRect { rect, width, color } => {
                let r = Rect::from_min_size(
                    to_screen(origin, (rect.x, rect.y)),
                    Vec2::new(rect.width, rect.height),
                );
                painter.rect_stroke(
                    r,
                    4.0,
                    Stroke::new(*width, rgb_to_color32(*color)),
                    egui::StrokeKind::Inside,
                );
            }
            DrawCommand::FillCircle {
                center,
                radius,
                color,
            } => {
                painter.circle_filled(to_screen(origin, *center), *radius, rgb_to_color32(*color));
            }
            DrawCommand::StrokeCircle {
                center,
                radius,
                width,
                color,
            } => {
                painter.circle_stroke(
                    to_screen(origin, *center),
                    *radius,
                    Stroke::new(*width, rgb_to_color32(*color)),
                );
            }
            DrawCommand::Text {
                pos,
                text,
                size,
                color,
                anchor,
            } => {
                let align = match anchor {
                    TextAnchor::Center => Align2::CENTER_CENTER,
                    TextAnchor::CenterTop => Align2::CENTER_TOP,
                };
                painter.text(
                    to_screen(origin, *pos),
                    align,
                    text,
                    egui::FontId::proportional(*size),
                    rgb_to_color32(*color),
                );
            }
        }
    }
}
