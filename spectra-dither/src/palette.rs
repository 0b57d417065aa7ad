//! Fixed Spectra E6 palette and nearest-color lookup.
//!
//! The panel shows exactly six colors. Declaration order is significant: it
//! defines the palette index written to the index map and breaks ties in
//! [`nearest`] (first entry wins).

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the six colors the panel can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaletteColor {
    Black,
    White,
    Red,
    Yellow,
    Green,
    Blue,
}

/// Palette in declaration order; position == palette index.
pub const PALETTE: [PaletteColor; 6] = [
    PaletteColor::Black,
    PaletteColor::White,
    PaletteColor::Red,
    PaletteColor::Yellow,
    PaletteColor::Green,
    PaletteColor::Blue,
];

impl PaletteColor {
    #[inline(always)]
    pub const fn rgb(self) -> [u8; 3] {
        match self {
            PaletteColor::Black => [0, 0, 0],
            PaletteColor::White => [255, 255, 255],
            PaletteColor::Red => [255, 0, 0],
            PaletteColor::Yellow => [255, 255, 0],
            PaletteColor::Green => [0, 255, 0],
            PaletteColor::Blue => [0, 0, 255],
        }
    }

    #[inline(always)]
    pub const fn index(self) -> u8 {
        self as u8
    }

    pub const fn name(self) -> &'static str {
        match self {
            PaletteColor::Black => "black",
            PaletteColor::White => "white",
            PaletteColor::Red => "red",
            PaletteColor::Yellow => "yellow",
            PaletteColor::Green => "green",
            PaletteColor::Blue => "blue",
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        PALETTE.get(index as usize).copied()
    }

    #[inline(always)]
    pub(crate) fn rgb_f32(self) -> [f32; 3] {
        let c = self.rgb();
        [c[0] as f32, c[1] as f32, c[2] as f32]
    }
}

impl fmt::Display for PaletteColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of a nearest-color search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearest {
    pub color: PaletteColor,
    pub distance: f32,
}

/// Euclidean RGB distance. Channels are compared as-is, out-of-range values included.
#[inline(always)]
pub fn distance(pixel: [f32; 3], color: PaletteColor) -> f32 {
    let c = color.rgb_f32();
    let dr = pixel[0] - c[0];
    let dg = pixel[1] - c[1];
    let db = pixel[2] - c[2];
    (dr * dr + dg * dg + db * db).sqrt()
}

/// Nearest palette entry by Euclidean distance; ties go to the earliest entry.
pub fn nearest(pixel: [f32; 3]) -> Nearest {
    let mut best = Nearest {
        color: PALETTE[0],
        distance: distance(pixel, PALETTE[0]),
    };
    for &color in &PALETTE[1..] {
        let d = distance(pixel, color);
        // strict: an equal distance never displaces an earlier entry
        if d < best.distance {
            best = Nearest { color, distance: d };
        }
    }
    best
}

/// First palette entry within `tolerance` (inclusive) of `pixel`.
pub fn match_within(pixel: [f32; 3], tolerance: f32) -> Option<PaletteColor> {
    PALETTE
        .iter()
        .copied()
        .find(|&c| distance(pixel, c) <= tolerance)
}

/// Palette entry whose every channel lies within `atol` of `rgb`.
pub fn index_of(rgb: [f32; 3], atol: f32) -> Option<PaletteColor> {
    PALETTE.iter().copied().find(|c| {
        let p = c.rgb_f32();
        (0..3).all(|i| (p[i] - rgb[i]).abs() <= atol)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declaration_order_defines_indices() {
        for (i, c) in PALETTE.iter().enumerate() {
            assert_eq!(c.index() as usize, i);
            assert_eq!(PaletteColor::from_index(i as u8), Some(*c));
        }
        assert_eq!(PaletteColor::from_index(6), None);
        assert_eq!(PaletteColor::Black.index(), 0);
        assert_eq!(PaletteColor::White.index(), 1);
        assert_eq!(PaletteColor::Blue.index(), 5);
    }

    #[test]
    fn exact_palette_pixel_has_zero_distance() {
        for c in PALETTE {
            let n = nearest(c.rgb_f32());
            assert_eq!(n.color, c);
            assert_eq!(n.distance, 0.0);
        }
    }

    #[test]
    fn equidistant_gray_resolves_to_first_entry() {
        // 127.5 is exactly halfway on every channel, so all six entries tie.
        let px = [127.5, 127.5, 127.5];
        let d_black = distance(px, PaletteColor::Black);
        for c in PALETTE {
            assert_eq!(distance(px, c), d_black);
        }
        assert_eq!(nearest(px).color, PaletteColor::Black);
    }

    #[test]
    fn mid_gray_128_is_nearest_white() {
        // black: sqrt(3*128^2) ~ 221.70, white: sqrt(3*127^2) ~ 219.97,
        // yellow ~ 220.39, red/green/blue ~ 220.82
        let n = nearest([128.0, 128.0, 128.0]);
        assert_eq!(n.color, PaletteColor::White);
        assert!((n.distance - 219.970_45).abs() < 1e-3);
    }

    #[test]
    fn out_of_range_channels_compare_arithmetically() {
        assert_eq!(nearest([-40.0, -3.0, -90.0]).color, PaletteColor::Black);
        assert_eq!(nearest([300.0, 310.0, -20.0]).color, PaletteColor::Yellow);
        assert_eq!(nearest([-10.0, 20.0, 400.0]).color, PaletteColor::Blue);
    }

    #[test]
    fn match_within_uses_inclusive_tolerance() {
        assert_eq!(match_within([250.0, 0.0, 0.0], 5.0), Some(PaletteColor::Red));
        assert_eq!(match_within([250.0, 0.0, 0.0], 4.9), None);
    }

    #[test]
    fn index_of_is_per_channel() {
        assert_eq!(index_of([254.5, 0.5, 0.0], 1.0), Some(PaletteColor::Red));
        assert_eq!(index_of([253.0, 0.0, 0.0], 1.0), None);
    }
}
