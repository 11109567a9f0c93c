//! Utility colours: an RGB triple, parsing of named / `#rrggbb` / `[r,g,b]`
//! colour strings as they appear in entity attributes, and stable hash colours.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

fn unit_to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Parse a colour given as a name, `#rrggbb`, or an `[r, g, b]` array with
/// components in `0..=1` (or `0..=255` when any component exceeds 1).
pub fn parse_color(val: &str) -> Option<Rgb> {
    let val = val.trim();
    if val.starts_with('[') && val.ends_with(']') {
        let inner = &val[1..val.len() - 1];
        let parts: Vec<f32> = inner
            .split(',')
            .filter_map(|s| s.trim().parse::<f32>().ok())
            .collect();
        if parts.len() != 3 {
            return None;
        }
        if parts.iter().any(|&c| c > 1.0) {
            let [r, g, b] = [parts[0], parts[1], parts[2]].map(|c| c.clamp(0.0, 255.0) as u8);
            return Some(Rgb(r, g, b));
        }
        return Some(Rgb(
            unit_to_u8(parts[0]),
            unit_to_u8(parts[1]),
            unit_to_u8(parts[2]),
        ));
    }
    if let Some(hex) = val.strip_prefix('#') {
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let rgb = u32::from_str_radix(hex, 16).ok()?;
        return Some(Rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8));
    }
    match val.to_ascii_lowercase().as_str() {
        "white" => Some(Rgb(0xff, 0xff, 0xff)),
        "black" => Some(Rgb(0x00, 0x00, 0x00)),
        "red" => Some(Rgb(0xff, 0x00, 0x00)),
        "green" => Some(Rgb(0x00, 0x80, 0x00)),
        "blue" => Some(Rgb(0x00, 0x00, 0xff)),
        "yellow" => Some(Rgb(0xff, 0xff, 0x00)),
        "orange" => Some(Rgb(0xff, 0xa5, 0x00)),
        "cyan" => Some(Rgb(0x00, 0xff, 0xff)),
        "magenta" => Some(Rgb(0xff, 0x00, 0xff)),
        "purple" => Some(Rgb(0x80, 0x00, 0x80)),
        "pink" => Some(Rgb(0xff, 0xc0, 0xcb)),
        "teal" => Some(Rgb(0x00, 0x80, 0x80)),
        "navy" => Some(Rgb(0x00, 0x00, 0x80)),
        "gray" | "grey" => Some(Rgb(0x80, 0x80, 0x80)),
        "silver" => Some(Rgb(0xc0, 0xc0, 0xc0)),
        _ => None,
    }
}

pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Rgb {
    let h6 = (h * 6.0) % 6.0;
    let c = v * s;
    let x = c * (1.0 - ((h6 % 2.0) - 1.0).abs());
    let (r1, g1, b1) = if h6 < 1.0 {
        (c, x, 0.0)
    } else if h6 < 2.0 {
        (x, c, 0.0)
    } else if h6 < 3.0 {
        (0.0, c, x)
    } else if h6 < 4.0 {
        (0.0, x, c)
    } else if h6 < 5.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };
    let m = v - c;
    Rgb(unit_to_u8(r1 + m), unit_to_u8(g1 + m), unit_to_u8(b1 + m))
}

/// A colour derived from the hash of `input`, stable for the lifetime of the process.
pub fn hash_color(input: &str, s: f32, v: f32) -> Rgb {
    let mut hasher = DefaultHasher::new();
    input.hash(&mut hasher);
    let h = (hasher.finish() as f64 / u64::MAX as f64) as f32 % 1.0;
    hsv_to_rgb(h, s, v)
}
