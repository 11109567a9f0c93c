//! Continuous redraw loop and click picking.
//!
//! Lifecycle: `Created → Running → TornDown`. While running, every animation
//! frame recomputes the layout of the active layer, paints it and keeps the
//! layout as the cache that click handling scans. "No snapshot yet" is drawn
//! as a loading placeholder; it is not a lifecycle state.

use std::collections::HashMap;

use crate::color::Rgb;
use crate::error::{Error, Result};
use crate::geometry::{LayoutMap, Position, pick};
use crate::layout::{LayoutConfig, compute_layout, orbital_max_radius};
use crate::model::{EntityStatus, LayerKind, LayerPayload, MapEntity};
use crate::stream::SharedSnapshot;

use super::pointer::PointerTracker;
use super::style::{self, EntityStyle};
use super::surface::{Surface, TextAnchor};

/// Token of a scheduled animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequest(pub u64);

/// Token of an attached container resize listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResizeListener(pub u64);

/// Container bounding box in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

/// What the engine needs from the environment it is embedded in.
pub trait RenderHost {
    type Surface: Surface;

    /// `None` when no drawing surface can be provided.
    fn create_surface(&mut self) -> Option<Self::Surface>;
    fn container_bounds(&self) -> Bounds;
    /// Schedule one call to [`RenderEngine::on_animation_frame`].
    fn request_frame(&mut self) -> FrameRequest;
    fn cancel_frame(&mut self, request: FrameRequest);
    /// Start reporting container resizes via [`RenderEngine::on_container_resize`].
    fn observe_resize(&mut self) -> ResizeListener;
    fn unobserve_resize(&mut self, listener: ResizeListener);
}

/// Inputs read at the start of each frame.
#[derive(Debug, Clone, Default)]
pub struct FrameState {
    pub snapshot: SharedSnapshot,
    pub layer: LayerKind,
    pub selected: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Created,
    Running,
    TornDown,
}

pub const LOADING_TEXT: &str = "Loading living map…";
const LABEL_SIZE: f32 = 12.0;

pub struct RenderEngine<H: RenderHost> {
    host: H,
    surface: H::Surface,
    state: Box<dyn Fn() -> FrameState>,
    on_select: Box<dyn FnMut(Option<String>)>,
    layout_config: LayoutConfig,
    lifecycle: Lifecycle,
    pending_frame: Option<FrameRequest>,
    resize_listener: Option<ResizeListener>,
    bounds: Bounds,
    last_layout: LayoutMap,
    pointer: PointerTracker,
    frames: u64,
}

impl<H: RenderHost> RenderEngine<H> {
    /// Fails with [`Error::SurfaceUnavailable`] if the host has no surface to offer.
    pub fn new<S, F>(mut host: H, state: S, on_select: F) -> Result<Self>
    where
        S: Fn() -> FrameState + 'static,
        F: FnMut(Option<String>) + 'static,
    {
        let surface = host.create_surface().ok_or(Error::SurfaceUnavailable)?;
        Ok(Self {
            host,
            surface,
            state: Box::new(state),
            on_select: Box::new(on_select),
            layout_config: LayoutConfig::default(),
            lifecycle: Lifecycle::Created,
            pending_frame: None,
            resize_listener: None,
            bounds: Bounds::default(),
            last_layout: LayoutMap::new(),
            pointer: PointerTracker::default(),
            frames: 0,
        })
    }

    pub fn with_layout_config(mut self, layout_config: LayoutConfig) -> Self {
        self.layout_config = layout_config;
        self
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn surface(&self) -> &H::Surface {
        &self.surface
    }

    /// Layout computed by the most recent frame.
    pub fn last_layout(&self) -> &LayoutMap {
        &self.last_layout
    }

    /// Number of frames painted so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Attach the resize listener and schedule the first frame. No-op unless
    /// the engine was just created.
    pub fn start(&mut self) {
        if self.lifecycle != Lifecycle::Created {
            return;
        }
        self.resize_listener = Some(self.host.observe_resize());
        self.fit_to_container();
        self.pending_frame = Some(self.host.request_frame());
        self.lifecycle = Lifecycle::Running;
        tracing::debug!("render engine started");
    }

    /// Cancel the pending frame and detach the resize listener. Safe to call
    /// any number of times; nothing is drawn afterwards.
    pub fn teardown(&mut self) {
        if self.lifecycle == Lifecycle::TornDown {
            return;
        }
        if let Some(request) = self.pending_frame.take() {
            self.host.cancel_frame(request);
        }
        if let Some(listener) = self.resize_listener.take() {
            self.host.unobserve_resize(listener);
        }
        self.lifecycle = Lifecycle::TornDown;
        tracing::debug!(frames = self.frames, "render engine torn down");
    }

    pub fn on_container_resize(&mut self) {
        if self.lifecycle == Lifecycle::Running {
            self.fit_to_container();
        }
    }

    /// Paint one frame and schedule the next. Requests other than the pending
    /// one, and any request after teardown, are ignored.
    pub fn on_animation_frame(&mut self, request: FrameRequest) {
        if self.lifecycle != Lifecycle::Running || self.pending_frame != Some(request) {
            return;
        }
        self.pending_frame = None;
        self.render_frame();
        self.pending_frame = Some(self.host.request_frame());
    }

    pub fn on_pointer_down(&mut self, client_x: f32, client_y: f32) {
        let (x, y) = self.to_surface(client_x, client_y);
        self.pointer.press(x, y);
    }

    pub fn on_pointer_move(&mut self, client_x: f32, client_y: f32) {
        let (x, y) = self.to_surface(client_x, client_y);
        self.pointer.move_to(x, y);
    }

    pub fn on_pointer_up(&mut self) {
        self.pointer.release();
    }

    /// Resolve a click against the previous frame's layout and report the hit
    /// (or `None`) to the selection callback. Clicks ending a drag are ignored.
    pub fn on_click(&mut self, client_x: f32, client_y: f32) {
        if self.lifecycle == Lifecycle::TornDown || !self.pointer.take_click() {
            return;
        }
        let (x, y) = self.to_surface(client_x, client_y);
        let hit = pick(&self.last_layout, x, y).map(str::to_string);
        tracing::trace!(x, y, ?hit, "click");
        (self.on_select)(hit);
    }

    fn to_surface(&self, client_x: f32, client_y: f32) -> (f32, f32) {
        (client_x - self.bounds.left, client_y - self.bounds.top)
    }

    /// Re-read the container box; called on start and on resize events.
    fn fit_to_container(&mut self) {
        self.bounds = self.host.container_bounds();
        self.sync_surface_size();
    }

    fn sync_surface_size(&mut self) {
        if self.surface.size() != (self.bounds.width, self.bounds.height) {
            self.surface.resize(self.bounds.width, self.bounds.height);
        }
    }

    fn render_frame(&mut self) {
        self.frames += 1;
        self.sync_surface_size();
        let (width, height) = self.surface.size();
        self.surface.clear(style::BACKGROUND);

        let FrameState {
            snapshot,
            layer,
            selected,
        } = (self.state)();
        let Some(snapshot) = snapshot else {
            self.last_layout.clear();
            self.surface.text(
                (width * 0.5, height * 0.5),
                LOADING_TEXT,
                16.0,
                style::MUTED,
                TextAnchor::Center,
            );
            return;
        };

        let payload = snapshot.layer(layer);
        self.last_layout = compute_layout(payload, width, height, &self.layout_config);
        let painter = LayerPainter {
            surface: &mut self.surface,
            layout: &self.last_layout,
            selected: selected.as_deref(),
            config: &self.layout_config,
            size: (width, height),
        };
        painter.paint(payload);
    }
}

impl<H: RenderHost> Drop for RenderEngine<H> {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Per-frame painting of one layer onto the surface.
struct LayerPainter<'a, S: Surface> {
    surface: &'a mut S,
    layout: &'a LayoutMap,
    selected: Option<&'a str>,
    config: &'a LayoutConfig,
    size: (f32, f32),
}

impl<S: Surface> LayerPainter<'_, S> {
    fn paint(mut self, payload: LayerPayload<'_>) {
        match payload {
            LayerPayload::City(city) => {
                for district in &city.items {
                    let fill = style::status_color(district.status);
                    self.grid_cell(district, fill);
                }
            }
            LayerPayload::Nodes(nodes) => {
                for node in &nodes.items {
                    let fill = style::load_color(node.load, node.status);
                    self.grid_cell(node, fill);
                }
            }
            LayerPayload::Space(space) => {
                self.orbit_guides(
                    space
                        .planets
                        .iter()
                        .map(|p| (p.id.as_str(), !p.satellites.is_empty())),
                );
                let planets: HashMap<&str, &dyn MapEntity> = space
                    .planets
                    .iter()
                    .map(|p| (p.id.as_str(), p as &dyn MapEntity))
                    .collect();
                let satellites: HashMap<&str, &dyn MapEntity> = space
                    .satellites
                    .iter()
                    .map(|s| (s.id.as_str(), s as &dyn MapEntity))
                    .collect();
                for (id, pos) in self.layout {
                    if let Some(planet) = planets.get(id.as_str()) {
                        let fill = style::kind_color(*planet);
                        self.body(id, *pos, fill, Some(planet.display_name()));
                    } else {
                        // Declared satellites may be missing from the satellite list.
                        let status = satellites
                            .get(id.as_str())
                            .map_or(EntityStatus::Unknown, |s| s.status());
                        self.body(id, *pos, style::status_color(status), None);
                    }
                }
            }
            LayerPayload::Agents(agents) => {
                for agent in &agents.items {
                    if let Some(pos) = self.layout.get(&agent.id) {
                        let fill = style::status_color(agent.status);
                        self.body(&agent.id, *pos, fill, None);
                    }
                }
            }
        }
    }

    fn is_selected(&self, id: &str) -> bool {
        self.selected == Some(id)
    }

    fn grid_cell(&mut self, entity: &dyn MapEntity, fill: Rgb) {
        let Some(pos) = self.layout.get(entity.id()).copied() else {
            return;
        };
        let s = EntityStyle::new(fill, self.is_selected(entity.id()));
        self.surface.fill_rect(pos, s.fill);
        self.surface.stroke_rect(pos, s.stroke_width, s.stroke);
        if pos.height >= LABEL_SIZE {
            let label_color = if s.fill == style::HIGHLIGHT {
                style::BACKGROUND
            } else {
                style::LABEL
            };
            self.surface.text(
                pos.center(),
                entity.display_name(),
                LABEL_SIZE,
                label_color,
                TextAnchor::Center,
            );
        }
    }

    fn body(&mut self, id: &str, pos: Position, fill: Rgb, label: Option<&str>) {
        let s = EntityStyle::new(fill, self.is_selected(id));
        let center = pos.center();
        let radius = pos.inner_radius();
        self.surface.fill_circle(center, radius, s.fill);
        self.surface.stroke_circle(center, radius, s.stroke_width, s.stroke);
        if let Some(label) = label {
            self.surface.text(
                (center.0, pos.bottom() + 4.0),
                label,
                LABEL_SIZE,
                style::LABEL,
                TextAnchor::CenterTop,
            );
        }
    }

    /// Central planet ring, the outer ring and each planet's satellite ring.
    fn orbit_guides<'p>(&mut self, planets: impl Iterator<Item = (&'p str, bool)>) {
        let (width, height) = self.size;
        let center = (width * 0.5, height * 0.5);
        let max_radius = orbital_max_radius(width, height, self.config);
        for factor in [self.config.planet_ring_factor, self.config.outer_ring_factor] {
            let r = factor * max_radius;
            if r > 0.0 {
                self.surface.stroke_circle(center, r, 1.0, style::ORBIT);
            }
        }
        for (id, has_satellites) in planets {
            if !has_satellites {
                continue;
            }
            if let Some(pos) = self.layout.get(id) {
                self.surface
                    .stroke_circle(pos.center(), self.config.satellite_orbit, 1.0, style::ORBIT);
            }
        }
    }
}
