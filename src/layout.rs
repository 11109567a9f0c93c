//! Deterministic per-layer placement of entities onto the drawing surface.
//!
//! Every function here is pure: the same entities and surface size always give
//! bit-identical rectangles, so the renderer can call them every frame without
//! carrying positional state between frames.
//!
//! Algorithms:
//! - Grid (city): `columns = ceil(sqrt(n))`, `rows = ceil(n / columns)`. Cells
//!   are assigned row-major in entity order and shrunk by `grid_padding` on all
//!   sides.
//! - Load-scaled grid (nodes): same cells, but the rectangle is a square of
//!   `node_base_size + load * node_load_size` centred in its cell, so heavily
//!   loaded nodes render larger.
//! - Orbital (space): planets sit on a ring of radius `planet_ring_factor *
//!   max_radius` around the surface centre at equal angular spacing. Each
//!   planet's declared satellites orbit it on a ring of `satellite_orbit` px.
//!   Satellites claimed by no planet go on an outer ring of radius
//!   `outer_ring_factor * max_radius`, with
//!   `max_radius = min(width, height) / 2 - ring_margin`.
//! - Spiral (agents): entity `i` sits at angle `i * spiral_step` and radius
//!   `sqrt(i) * spiral_spacing` from the surface centre.
//!
//! When an id occurs more than once, the first placement wins.

use std::collections::HashSet;
use std::f32::consts::TAU;

use crate::geometry::{LayoutMap, Position};
use crate::model::{ComputeNode, LayerPayload, MapEntity, SpaceLayer};

/// Smallest extent handed out, so rectangles stay visible on cramped surfaces.
const MIN_EXTENT: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    pub grid_padding: f32,
    pub node_base_size: f32,
    pub node_load_size: f32,
    pub planet_ring_factor: f32,
    pub outer_ring_factor: f32,
    pub ring_margin: f32,
    pub satellite_orbit: f32,
    pub planet_radius: f32,
    pub satellite_radius: f32,
    pub spiral_step: f32,
    pub spiral_spacing: f32,
    pub agent_radius: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            grid_padding: 20.0,
            node_base_size: 40.0,
            node_load_size: 40.0,
            planet_ring_factor: 0.6,
            outer_ring_factor: 0.9,
            ring_margin: 100.0,
            satellite_orbit: 100.0,
            planet_radius: 30.0,
            satellite_radius: 12.0,
            spiral_step: 0.5,
            spiral_spacing: 30.0,
            agent_radius: 8.0,
        }
    }
}

/// Column and row count for `n` cells. Never returns zero columns.
pub fn grid_dimensions(n: usize) -> (usize, usize) {
    let columns = ((n as f64).sqrt().ceil() as usize).max(1);
    let rows = n.div_ceil(columns);
    (columns, rows)
}

struct Grid {
    columns: usize,
    cell_w: f32,
    cell_h: f32,
}

impl Grid {
    fn new(n: usize, width: f32, height: f32) -> Self {
        let (columns, rows) = grid_dimensions(n);
        Self {
            columns,
            cell_w: width / columns as f32,
            cell_h: height / rows.max(1) as f32,
        }
    }

    /// Top-left corner of cell `index`.
    fn origin(&self, index: usize) -> (f32, f32) {
        let col = index % self.columns;
        let row = index / self.columns;
        (col as f32 * self.cell_w, row as f32 * self.cell_h)
    }
}

/// Row-major grid with one padded cell per entity.
pub fn grid_layout<E: MapEntity>(
    entities: &[E],
    width: f32,
    height: f32,
    cfg: &LayoutConfig,
) -> LayoutMap {
    let mut out = LayoutMap::with_capacity(entities.len());
    if entities.is_empty() {
        return out;
    }
    let grid = Grid::new(entities.len(), width, height);
    let pad = cfg.grid_padding;
    let w = (grid.cell_w - 2.0 * pad).max(MIN_EXTENT);
    let h = (grid.cell_h - 2.0 * pad).max(MIN_EXTENT);
    for (i, entity) in entities.iter().enumerate() {
        let (x, y) = grid.origin(i);
        out.entry(entity.id().to_string())
            .or_insert_with(|| Position::new(x + pad, y + pad, w, h));
    }
    out
}

/// Side length of a node's square for the given load. Load is clamped to `[0, 1]`.
pub fn node_size(load: f32, cfg: &LayoutConfig) -> f32 {
    cfg.node_base_size + load.clamp(0.0, 1.0) * cfg.node_load_size
}

/// Grid layout where each node is a square scaled by its load and centred in
/// its cell. The square never exceeds the padded cell.
pub fn node_grid_layout(
    nodes: &[ComputeNode],
    width: f32,
    height: f32,
    cfg: &LayoutConfig,
) -> LayoutMap {
    let mut out = LayoutMap::with_capacity(nodes.len());
    if nodes.is_empty() {
        return out;
    }
    let grid = Grid::new(nodes.len(), width, height);
    let pad = cfg.grid_padding;
    let max_w = (grid.cell_w - 2.0 * pad).max(MIN_EXTENT);
    let max_h = (grid.cell_h - 2.0 * pad).max(MIN_EXTENT);
    for (i, node) in nodes.iter().enumerate() {
        let (x, y) = grid.origin(i);
        let side = node_size(node.load, cfg);
        let w = side.min(max_w);
        let h = side.min(max_h);
        out.entry(node.id.clone()).or_insert_with(|| {
            Position::new(
                x + (grid.cell_w - w) * 0.5,
                y + (grid.cell_h - h) * 0.5,
                w,
                h,
            )
        });
    }
    out
}

/// Radius available to the orbital rings for a surface.
pub fn orbital_max_radius(width: f32, height: f32, cfg: &LayoutConfig) -> f32 {
    (width.min(height) * 0.5 - cfg.ring_margin).max(0.0)
}

fn ring_point(cx: f32, cy: f32, radius: f32, index: usize, count: usize) -> (f32, f32) {
    let angle = TAU * index as f32 / count.max(1) as f32;
    (cx + radius * angle.cos(), cy + radius * angle.sin())
}

/// Planets on a central ring, declared satellites around their planet,
/// unclaimed satellites on the outer ring.
///
/// Every satellite id a planet declares is placed, even when it is absent
/// from `space.satellites`, so the map holds up to `planets + declared ids +
/// unclaimed satellites` keys rather than the layer's entity count.
pub fn orbital_layout(
    space: &SpaceLayer,
    width: f32,
    height: f32,
    cfg: &LayoutConfig,
) -> LayoutMap {
    let mut out = LayoutMap::new();
    let (cx, cy) = (width * 0.5, height * 0.5);
    let max_radius = orbital_max_radius(width, height, cfg);
    let planet_ring = cfg.planet_ring_factor * max_radius;
    let planet_count = space.planets.len();

    let mut claimed: HashSet<&str> = HashSet::new();
    for (i, planet) in space.planets.iter().enumerate() {
        let (px, py) = ring_point(cx, cy, planet_ring, i, planet_count);
        out.entry(planet.id.clone())
            .or_insert_with(|| Position::centered(px, py, cfg.planet_radius));

        let moons = planet.satellites.len();
        for (j, satellite_id) in planet.satellites.iter().enumerate() {
            claimed.insert(satellite_id.as_str());
            let (sx, sy) = ring_point(px, py, cfg.satellite_orbit, j, moons);
            out.entry(satellite_id.clone())
                .or_insert_with(|| Position::centered(sx, sy, cfg.satellite_radius));
        }
    }

    let outer_ring = cfg.outer_ring_factor * max_radius;
    let unclaimed: Vec<_> = space
        .satellites
        .iter()
        .filter(|s| !claimed.contains(s.id.as_str()))
        .collect();
    for (j, satellite) in unclaimed.iter().enumerate() {
        let (sx, sy) = ring_point(cx, cy, outer_ring, j, unclaimed.len());
        out.entry(satellite.id.clone())
            .or_insert_with(|| Position::centered(sx, sy, cfg.satellite_radius));
    }
    out
}

/// Distance of spiral entity `index` from the surface centre.
pub fn spiral_radius(index: usize, cfg: &LayoutConfig) -> f32 {
    (index as f32).sqrt() * cfg.spiral_spacing
}

pub fn spiral_layout<E: MapEntity>(
    entities: &[E],
    width: f32,
    height: f32,
    cfg: &LayoutConfig,
) -> LayoutMap {
    let mut out = LayoutMap::with_capacity(entities.len());
    let (cx, cy) = (width * 0.5, height * 0.5);
    for (i, entity) in entities.iter().enumerate() {
        let angle = i as f32 * cfg.spiral_step;
        let radius = spiral_radius(i, cfg);
        let (x, y) = (cx + radius * angle.cos(), cy + radius * angle.sin());
        out.entry(entity.id().to_string())
            .or_insert_with(|| Position::centered(x, y, cfg.agent_radius));
    }
    out
}

/// Dispatch to the algorithm of the payload's layer.
pub fn compute_layout(
    payload: LayerPayload<'_>,
    width: f32,
    height: f32,
    cfg: &LayoutConfig,
) -> LayoutMap {
    match payload {
        LayerPayload::City(city) => grid_layout(&city.items, width, height, cfg),
        LayerPayload::Space(space) => orbital_layout(space, width, height, cfg),
        LayerPayload::Nodes(nodes) => node_grid_layout(&nodes.items, width, height, cfg),
        LayerPayload::Agents(agents) => spiral_layout(&agents.items, width, height, cfg),
    }
}
