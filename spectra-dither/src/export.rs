//! Index-map and statistics renderings for the display driver and previews.

use crate::dither::IndexMap;
use crate::distribution::ColorDistribution;
use crate::palette::PaletteColor;
use image::{GrayImage, Luma, Rgb, RgbImage, imageops};

/// Default multiplier that spreads indices 0..=5 over a visible gray range.
pub const DEFAULT_INDEX_SCALE: u8 = 42;

/// Height of the statistics strip appended below the preview image.
pub const PREVIEW_STRIP_HEIGHT: u32 = 100;

const SWATCH: u32 = 16;
const SWATCH_STEP_X: u32 = 150;
const SWATCH_STEP_Y: u32 = 25;
const BAR_MAX: u32 = 100;

/// Render the index map as grayscale (`index * scale`, saturating).
pub fn index_preview(indices: &IndexMap, scale: u8) -> GrayImage {
    GrayImage::from_fn(indices.width(), indices.height(), |x, y| {
        Luma([indices.get(x, y).saturating_mul(scale)])
    })
}

/// Native nibble codes of the 6-color panel controller.
pub fn device_nibble(color: PaletteColor) -> u8 {
    match color {
        PaletteColor::Black => 0x0,
        PaletteColor::White => 0x1,
        PaletteColor::Yellow => 0x2,
        PaletteColor::Red => 0x3,
        PaletteColor::Blue => 0x5,
        PaletteColor::Green => 0x6,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackOptions {
    /// Packed 4bpp devices vary in nibble order. When true, pack low-nibble first (left pixel).
    pub swap_nibbles: bool,
    /// Reverse row order (bottom-to-top).
    pub reverse_rows: bool,
    /// Reverse column order (right-to-left).
    pub reverse_cols: bool,
}

/// Raw packed 4 bits-per-pixel stream, two pixels per byte. Each row starts
/// on a byte boundary; an odd trailing pixel is padded with a zero nibble.
pub fn pack_4bpp(indices: &IndexMap, opts: PackOptions) -> Vec<u8> {
    let (w, h) = (indices.width(), indices.height());
    let mut out = Vec::with_capacity((w as usize).div_ceil(2) * h as usize);
    let rows: Box<dyn Iterator<Item = u32>> = if opts.reverse_rows {
        Box::new((0..h).rev())
    } else {
        Box::new(0..h)
    };
    for y in rows {
        let cols: Box<dyn Iterator<Item = u32>> = if opts.reverse_cols {
            Box::new((0..w).rev())
        } else {
            Box::new(0..w)
        };
        let mut nibble = None::<u8>;
        for x in cols {
            let val = device_nibble(indices.color(x, y)) & 0x0F;
            if let Some(first) = nibble.take() {
                if opts.swap_nibbles {
                    out.push((val << 4) | first);
                } else {
                    out.push((first << 4) | val);
                }
            } else {
                nibble = Some(val);
            }
        }
        if let Some(first) = nibble.take() {
            if opts.swap_nibbles {
                out.push(first & 0x0F);
            } else {
                out.push(first << 4);
            }
        }
    }
    out
}

fn fill_rect(img: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, color: Rgb<u8>) {
    for yy in y..(y + h).min(img.height()) {
        for xx in x..(x + w).min(img.width()) {
            img.put_pixel(xx, yy, color);
        }
    }
}

fn outline_rect(img: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, color: Rgb<u8>) {
    fill_rect(img, x, y, w, 1, color);
    fill_rect(img, x, y + h - 1, w, 1, color);
    fill_rect(img, x, y, 1, h, color);
    fill_rect(img, x + w - 1, y, 1, h, color);
}

/// Original image above a white strip with one swatch + proportional bar per
/// color whose share exceeds `min_percentage`.
pub fn compose_preview(
    original: &RgbImage,
    distribution: &ColorDistribution,
    min_percentage: f64,
) -> RgbImage {
    let (w, h) = original.dimensions();
    let mut canvas = RgbImage::from_pixel(w, h + PREVIEW_STRIP_HEIGHT, Rgb([255, 255, 255]));
    imageops::replace(&mut canvas, original, 0, 0);

    let mut x = 10u32;
    let mut y = h + 25;
    for share in distribution.visible(min_percentage) {
        fill_rect(&mut canvas, x, y, SWATCH, SWATCH, Rgb(share.color.rgb()));
        outline_rect(&mut canvas, x, y, SWATCH, SWATCH, Rgb([0, 0, 0]));
        let bar = ((share.percentage / 100.0) * BAR_MAX as f64).round() as u32;
        if bar > 0 {
            fill_rect(&mut canvas, x + SWATCH + 4, y + 4, bar, SWATCH - 8, Rgb([0, 0, 0]));
        }
        x += SWATCH_STEP_X;
        if x + SWATCH_STEP_X > w {
            x = 10;
            y += SWATCH_STEP_Y;
        }
    }
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::analyze;

    #[test]
    fn index_preview_scales_indices() {
        let map = IndexMap::from_raw(6, 1, vec![0, 1, 2, 3, 4, 5]).unwrap();
        let g = index_preview(&map, DEFAULT_INDEX_SCALE);
        let vals: Vec<u8> = g.pixels().map(|p| p[0]).collect();
        assert_eq!(vals, vec![0, 42, 84, 126, 168, 210]);
        let sat = index_preview(&map, 60);
        assert_eq!(sat.get_pixel(5, 0)[0], 255);
    }

    #[test]
    fn packs_high_nibble_first() {
        // black, white, red
        let map = IndexMap::from_raw(3, 1, vec![0, 1, 2]).unwrap();
        assert_eq!(pack_4bpp(&map, PackOptions::default()), vec![0x01, 0x30]);
        let swapped = PackOptions {
            swap_nibbles: true,
            ..Default::default()
        };
        assert_eq!(pack_4bpp(&map, swapped), vec![0x10, 0x03]);
    }

    #[test]
    fn packing_honours_reversal() {
        // row 0: yellow, green ; row 1: blue, black
        let map = IndexMap::from_raw(2, 2, vec![3, 4, 5, 0]).unwrap();
        assert_eq!(pack_4bpp(&map, PackOptions::default()), vec![0x26, 0x50]);
        let rev = PackOptions {
            reverse_rows: true,
            reverse_cols: true,
            ..Default::default()
        };
        assert_eq!(pack_4bpp(&map, rev), vec![0x05, 0x62]);
    }

    #[test]
    fn preview_keeps_original_on_top() {
        let original = RgbImage::from_fn(320, 40, |x, _| {
            if x < 160 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 0, 0])
            }
        });
        let dist = analyze(&original);
        let p = compose_preview(&original, &dist, 0.1);
        assert_eq!(p.dimensions(), (320, 140));
        assert_eq!(p.get_pixel(5, 5).0, [0, 0, 0]);
        assert_eq!(p.get_pixel(300, 39).0, [255, 0, 0]);
        // first swatch (black) outline and interior at (10, 65)
        assert_eq!(p.get_pixel(10, 65).0, [0, 0, 0]);
        // second visible swatch is red; interior pixel
        assert_eq!(p.get_pixel(160 + 5, 65 + 5).0, [255, 0, 0]);
    }
}
