//! Deterministic unit colors drawn from listed colormaps.
//!
//! A palette of `N` base colors is resampled to the number of units the way a
//! listed colormap is sampled at evenly spaced positions: unit `i` of `n` takes
//! the base color at `floor(i / (n - 1) * N)`, clamped to the last entry.
//! Colors stay raw RGBA floats here; converting them to a toolkit type is the
//! view layer's job.

use serde::{Deserialize, Serialize};

use crate::ids::UnitId;

/// RGBA color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    /// Opaque color from 8-bit channels.
    pub const fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: 1.0,
        }
    }
}

/// Named base palette used to color units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ColorMap {
    /// Eight muted qualitative colors.
    #[default]
    #[serde(rename = "Dark2")]
    Dark2,
    /// Ten saturated qualitative colors.
    #[serde(rename = "tab10")]
    Tab10,
}

const DARK2: [Rgba; 8] = [
    Rgba::from_rgb8(0x1b, 0x9e, 0x77),
    Rgba::from_rgb8(0xd9, 0x5f, 0x02),
    Rgba::from_rgb8(0x75, 0x70, 0xb3),
    Rgba::from_rgb8(0xe7, 0x29, 0x8a),
    Rgba::from_rgb8(0x66, 0xa6, 0x1e),
    Rgba::from_rgb8(0xe6, 0xab, 0x02),
    Rgba::from_rgb8(0xa6, 0x76, 0x1d),
    Rgba::from_rgb8(0x66, 0x66, 0x66),
];

const TAB10: [Rgba; 10] = [
    Rgba::from_rgb8(0x1f, 0x77, 0xb4),
    Rgba::from_rgb8(0xff, 0x7f, 0x0e),
    Rgba::from_rgb8(0x2c, 0xa0, 0x2c),
    Rgba::from_rgb8(0xd6, 0x27, 0x28),
    Rgba::from_rgb8(0x94, 0x67, 0xbd),
    Rgba::from_rgb8(0x8c, 0x56, 0x4b),
    Rgba::from_rgb8(0xe3, 0x77, 0xc2),
    Rgba::from_rgb8(0x7f, 0x7f, 0x7f),
    Rgba::from_rgb8(0xbc, 0xbd, 0x22),
    Rgba::from_rgb8(0x17, 0xbe, 0xcf),
];

impl ColorMap {
    /// Base colors of the palette.
    pub fn base_colors(self) -> &'static [Rgba] {
        match self {
            ColorMap::Dark2 => &DARK2,
            ColorMap::Tab10 => &TAB10,
        }
    }

    /// Base color assigned to entry `index` of `count` evenly spaced entries.
    pub fn sample(self, index: usize, count: usize) -> Rgba {
        let base = self.base_colors();
        let position = if count <= 1 {
            0.0
        } else {
            index as f64 * (1.0 / (count - 1) as f64)
        };
        let slot = ((position * base.len() as f64) as usize).min(base.len() - 1);
        base[slot]
    }
}

/// One color per unit, in unit-index order.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitColors {
    colors: Vec<Rgba>,
}

impl UnitColors {
    /// Assign colors to `unit_ids` from `map`.
    pub fn assign(unit_ids: &[UnitId], map: ColorMap) -> Self {
        let count = unit_ids.len();
        Self {
            colors: (0..count).map(|index| map.sample(index, count)).collect(),
        }
    }

    /// Color of the unit at `unit_index`.
    pub fn get(&self, unit_index: usize) -> Option<Rgba> {
        self.colors.get(unit_index).copied()
    }

    /// All colors in unit-index order.
    pub fn as_slice(&self) -> &[Rgba] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}
