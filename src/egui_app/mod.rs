//! Egui-based interactive living map viewer (feature = "egui").
//!
//! `host` adapts the render engine to egui's repaint-driven frame loop,
//! `render` replays the engine's display list onto an egui painter, `state`
//! holds the application and `ui` lays out the panels.

#![cfg(feature = "egui")]

mod host;
mod render;
mod state;
mod ui;

pub use host::EguiHost;
pub use render::{paint_display_list, rgb_to_color32};
pub use state::LivingMapApp;
