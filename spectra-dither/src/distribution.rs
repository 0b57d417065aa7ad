//! Per-color pixel statistics over a dithered raster.

use crate::palette::{PALETTE, PaletteColor};
use image::RgbImage;
use serde::Serialize;

/// A channel matches a palette channel when it differs by less than this.
pub const MATCH_TOLERANCE: i16 = 2;

/// Colors at or below this share are usually left out of previews.
pub const DEFAULT_REPORT_THRESHOLD: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorShare {
    pub color: PaletteColor,
    pub count: u64,
    pub percentage: f64,
}

/// Counts and percentages for all six palette colors, in palette order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorDistribution {
    pub total: u64,
    pub shares: Vec<ColorShare>,
}

impl ColorDistribution {
    pub fn get(&self, color: PaletteColor) -> &ColorShare {
        &self.shares[color.index() as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColorShare> {
        self.shares.iter()
    }

    /// Shares strictly above `min_percentage`. Presentation helper only; the
    /// table itself always holds every color.
    pub fn visible(&self, min_percentage: f64) -> impl Iterator<Item = &ColorShare> {
        self.shares
            .iter()
            .filter(move |s| s.percentage > min_percentage)
    }

    pub fn counted(&self) -> u64 {
        self.shares.iter().map(|s| s.count).sum()
    }
}

#[inline(always)]
fn matches(px: [u8; 3], color: [u8; 3]) -> bool {
    (0..3).all(|i| (px[i] as i16 - color[i] as i16).abs() < MATCH_TOLERANCE)
}

/// Count pixels of `image` matching each palette color. Pixels matching no
/// color (an image that was not quantized) are left out, so the shares then
/// sum to less than 100%.
pub fn analyze(image: &RgbImage) -> ColorDistribution {
    let total = image.width() as u64 * image.height() as u64;
    let mut counts = [0u64; PALETTE.len()];
    for px in image.pixels() {
        if let Some(i) = PALETTE.iter().position(|c| matches(px.0, c.rgb())) {
            counts[i] += 1;
        }
    }
    let shares = PALETTE
        .iter()
        .zip(counts)
        .map(|(&color, count)| ColorShare {
            color,
            count,
            percentage: if total == 0 {
                0.0
            } else {
                count as f64 / total as f64 * 100.0
            },
        })
        .collect();
    ColorDistribution { total, shares }
}
