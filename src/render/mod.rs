//! Rendering and picking engine of the living map.
//!
//! The engine is host-agnostic: it draws through the [`Surface`] trait and is
//! driven by a [`RenderHost`] that schedules animation frames and reports
//! container resizes and pointer input. The egui viewer is one such host.

pub mod engine;
pub mod pointer;
pub mod style;
pub mod surface;

pub use engine::{
    Bounds, FrameRequest, FrameState, LOADING_TEXT, Lifecycle, RenderEngine, RenderHost,
    ResizeListener,
};
pub use pointer::{DRAG_THRESHOLD, DragPhase, PointerTracker};
pub use surface::{DisplayList, DrawCommand, Surface, TextAnchor};
