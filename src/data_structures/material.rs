//! The per-surface material pair.
//!
//! Every surface owns exactly two materials for its whole lifetime: a lit
//! `BaseMaterial` and an unlit wireframe `WireMaterial`. Which one is active
//! is tracked by the [`ActiveKind`] tag; the only transition point is the
//! visualization engine's edge pass.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shading {
    Smooth,
    Flat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    Uniform,
    Vertex,
    Face,
}

/// Which of the surface's two owned materials is currently rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActiveKind {
    Base,
    Wire,
}

/// Physically-inspired shaded material: default gray albedo, medium
/// roughness, zero metalness, double-sided.
#[derive(Clone, Debug)]
pub struct BaseMaterial {
    pub color: [f32; 3],
    pub roughness: f32,
    pub metalness: f32,
    pub opacity: f32,
    pub transparent: bool,
    pub flat_shading: bool,
    pub color_mode: ColorMode,
    pub double_sided: bool,
    pub visible: bool,
}

impl Default for BaseMaterial {
    fn default() -> Self {
        Self {
            color: [0.6, 0.6, 0.6],
            roughness: 0.5,
            metalness: 0.0,
            opacity: 1.0,
            transparent: false,
            flat_shading: false,
            color_mode: ColorMode::Uniform,
            double_sided: true,
            visible: true,
        }
    }
}

/// Unlit white wireframe material, double-sided.
#[derive(Clone, Debug)]
pub struct WireMaterial {
    pub color: [f32; 3],
    pub double_sided: bool,
    pub visible: bool,
}

impl Default for WireMaterial {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0],
            double_sided: true,
            visible: false,
        }
    }
}

/// Parses a CSS `#rgb` / `#rrggbb` hex color into linear-ish 0..1 floats.
/// Host-supplied color strings go through this; anything unparsable is the
/// caller's cue to keep the previous color.
pub fn parse_hex_color(s: &str) -> Option<[f32; 3]> {
    let hex = s.trim().strip_prefix('#')?;
    if !hex.is_ascii() {
        // Byte slicing below requires char boundaries.
        return None;
    }
    let (r, g, b) = match hex.len() {
        3 => {
            let mut it = hex.chars();
            let r = it.next()?.to_digit(16)?;
            let g = it.next()?.to_digit(16)?;
            let b = it.next()?.to_digit(16)?;
            (r * 17, g * 17, b * 17)
        }
        6 => (
            u32::from_str_radix(&hex[0..2], 16).ok()?,
            u32::from_str_radix(&hex[2..4], 16).ok()?,
            u32::from_str_radix(&hex[4..6], 16).ok()?,
        ),
        _ => return None,
    };
    Some([r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0])
}
