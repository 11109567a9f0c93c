//! Colour rules of the living map.

use crate::color::{Rgb, hash_color, parse_color};
use crate::model::{EntityStatus, MapEntity};

pub const BACKGROUND: Rgb = Rgb(11, 16, 32);
pub const LABEL: Rgb = Rgb(235, 240, 250);
pub const MUTED: Rgb = Rgb(120, 130, 150);
pub const BORDER: Rgb = Rgb(30, 38, 60);
pub const ORBIT: Rgb = Rgb(45, 55, 85);
pub const HIGHLIGHT: Rgb = Rgb(255, 214, 0);

pub const BORDER_WIDTH: f32 = 1.0;
pub const SELECTED_BORDER_WIDTH: f32 = 3.0;

/// Load at or above which a node is drawn as critical.
pub const LOAD_CRITICAL: f32 = 0.8;
/// Load at or above which a node is drawn as elevated.
pub const LOAD_ELEVATED: f32 = 0.5;

pub fn status_color(status: EntityStatus) -> Rgb {
    match status {
        EntityStatus::Online => Rgb(76, 175, 80),
        EntityStatus::Degraded => Rgb(255, 193, 7),
        EntityStatus::Offline => Rgb(244, 67, 54),
        EntityStatus::Unknown => Rgb(158, 158, 158),
    }
}

/// Compute nodes: offline and unknown nodes keep their status colour, live
/// nodes are coloured by load thresholds.
pub fn load_color(load: f32, status: EntityStatus) -> Rgb {
    match status {
        EntityStatus::Offline | EntityStatus::Unknown => status_color(status),
        EntityStatus::Online | EntityStatus::Degraded => {
            if load >= LOAD_CRITICAL {
                Rgb(244, 67, 54)
            } else if load >= LOAD_ELEVATED {
                Rgb(255, 152, 0)
            } else {
                Rgb(76, 175, 80)
            }
        }
    }
}

/// Orbital bodies: an explicit `color` attribute wins, then the type palette,
/// then a hash of the type. Offline bodies are always drawn in the offline colour.
pub fn kind_color(entity: &dyn MapEntity) -> Rgb {
    if entity.status() == EntityStatus::Offline {
        return status_color(EntityStatus::Offline);
    }
    if let Some(c) = entity
        .attributes()
        .get("color")
        .and_then(|v| v.as_str())
        .and_then(parse_color)
    {
        return c;
    }
    match entity.kind().map(str::to_ascii_lowercase).as_deref() {
        Some("core") | Some("hub") => Rgb(100, 160, 230),
        Some("dao") | Some("governance") => Rgb(171, 71, 188),
        Some("district") | Some("city") => Rgb(38, 166, 154),
        Some("node") | Some("compute") => Rgb(255, 167, 38),
        Some("agent") => Rgb(236, 64, 122),
        Some(other) => hash_color(other, 0.45, 0.90),
        None => status_color(entity.status()),
    }
}

/// Fill and border of one painted entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityStyle {
    pub fill: Rgb,
    pub stroke: Rgb,
    pub stroke_width: f32,
}

impl EntityStyle {
    /// The selected entity overrides its base colour with the highlight.
    pub fn new(fill: Rgb, selected: bool) -> Self {
        if selected {
            Self {
                fill: HIGHLIGHT,
                stroke: LABEL,
                stroke_width: SELECTED_BORDER_WIDTH,
            }
        } else {
            Self {
                fill,
                stroke: BORDER,
                stroke_width: BORDER_WIDTH,
            }
        }
    }
}
