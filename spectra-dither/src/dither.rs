//! Floyd–Steinberg error diffusion onto the fixed E6 palette.
//!
//! Pixels are visited row-major, top to bottom, left to right; each pixel reads
//! the error already deposited by earlier pixels, so the pass is inherently
//! sequential. Arithmetic stays in `f32` in a working buffer owned by the call
//! and values are only clamped when written to the 8-bit output.
//!
//! Preservation decisions are taken against the *original* pixel, never the
//! error-adjusted one, and a preserved pixel neither emits error nor is
//! disturbed by the error that reached it.

use crate::palette::{self, PaletteColor};
use crate::preserve::{PreservationPolicy, PreserveReason};
use image::{Rgb, RgbImage};

/// Per-channel absolute tolerance when mapping a preserved color back to its index.
const PRESERVED_INDEX_ATOL: f32 = 1.0;

#[derive(Clone, Copy, Debug)]
struct PropEntry {
    dx: i32,
    dy: u32,
    fraction: f32,
}

//        X   7
//    3   5   1
const FLOYD_STEINBERG: [PropEntry; 4] = [
    PropEntry {
        dx: 1,
        dy: 0,
        fraction: 7.0 / 16.0,
    },
    PropEntry {
        dx: -1,
        dy: 1,
        fraction: 3.0 / 16.0,
    },
    PropEntry {
        dx: 0,
        dy: 1,
        fraction: 5.0 / 16.0,
    },
    PropEntry {
        dx: 1,
        dy: 1,
        fraction: 1.0 / 16.0,
    },
];

/// Palette index per pixel, row-major, same dimensions as the dithered raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexMap {
    width: u32,
    height: u32,
    indices: Vec<u8>,
}

impl IndexMap {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            indices: vec![0; width as usize * height as usize],
        }
    }

    /// Wrap existing row-major indices. Returns `None` on a length mismatch.
    pub fn from_raw(width: u32, height: u32, indices: Vec<u8>) -> Option<Self> {
        (indices.len() == width as usize * height as usize).then_some(Self {
            width,
            height,
            indices,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.indices[y as usize * self.width as usize + x as usize]
    }

    #[inline]
    fn set(&mut self, x: u32, y: u32, index: u8) {
        self.indices[y as usize * self.width as usize + x as usize] = index;
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.indices
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.indices
    }

    /// Palette color at (x, y).
    pub fn color(&self, x: u32, y: u32) -> PaletteColor {
        // indices are only ever written from PaletteColor::index
        PaletteColor::from_index(self.get(x, y)).unwrap_or(PaletteColor::Black)
    }
}

/// Counters collected during a pass (debug aid).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DitherStats {
    pub preserved_black: usize,
    pub preserved_white: usize,
    pub preserved_exact: usize,
    pub quantized: usize,
    /// Preserved colors that matched no palette entry; expected to stay 0.
    pub index_fallbacks: usize,
}

impl DitherStats {
    pub fn preserved(&self) -> usize {
        self.preserved_black + self.preserved_white + self.preserved_exact
    }
}

/// Output of one dithering pass. Every pixel of `image` is a palette color and
/// `indices` names it.
#[derive(Debug, Clone)]
pub struct DitheredImage {
    pub image: RgbImage,
    pub indices: IndexMap,
    pub stats: DitherStats,
}

/// Error-accumulating working copy of the source raster.
#[derive(Debug, Clone)]
pub(crate) struct WorkBuffer {
    width: u32,
    height: u32,
    data: Vec<[f32; 3]>,
}

impl WorkBuffer {
    pub(crate) fn from_image(img: &RgbImage) -> Self {
        let data = img
            .pixels()
            .map(|p| [p[0] as f32, p[1] as f32, p[2] as f32])
            .collect();
        Self {
            width: img.width(),
            height: img.height(),
            data,
        }
    }

    #[cfg(test)]
    pub(crate) fn zeroed(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![[0.0; 3]; width as usize * height as usize],
        }
    }

    #[inline(always)]
    pub(crate) fn get(&self, x: u32, y: u32) -> [f32; 3] {
        self.data[y as usize * self.width as usize + x as usize]
    }

    /// Spread `error` onto the not-yet-visited neighbours of (x, y).
    /// Fractions that would land outside the grid are dropped.
    pub(crate) fn diffuse(&mut self, x: u32, y: u32, error: [f32; 3]) {
        if error == [0.0; 3] {
            return;
        }
        for entry in FLOYD_STEINBERG.iter() {
            let nx = x as i64 + entry.dx as i64;
            let ny = y as i64 + entry.dy as i64;
            if nx < 0 || nx >= self.width as i64 || ny >= self.height as i64 {
                continue;
            }
            let cell = &mut self.data[ny as usize * self.width as usize + nx as usize];
            cell[0] += error[0] * entry.fraction;
            cell[1] += error[1] * entry.fraction;
            cell[2] += error[2] * entry.fraction;
        }
    }
}

/// Decision for a single pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Quantized {
    pub color: PaletteColor,
    pub preserved: Option<PreserveReason>,
    pub fallback: bool,
    /// Signed working - output; zero for preserved pixels.
    pub error: [f32; 3],
}

/// Floyd–Steinberg ditherer with an optional preservation policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct DitherEngine {
    policy: PreservationPolicy,
}

impl DitherEngine {
    pub fn new(policy: PreservationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &PreservationPolicy {
        &self.policy
    }

    pub(crate) fn quantize_pixel(&self, working: [f32; 3], original: [f32; 3]) -> Quantized {
        if let Some(p) = self.policy.evaluate(original) {
            let target = [p.color[0] as f32, p.color[1] as f32, p.color[2] as f32];
            let (color, fallback) = match palette::index_of(target, PRESERVED_INDEX_ATOL) {
                Some(c) => (c, false),
                None => (PaletteColor::Black, true),
            };
            return Quantized {
                color,
                preserved: Some(p.reason),
                fallback,
                error: [0.0; 3],
            };
        }
        let nearest = palette::nearest(working);
        let c = nearest.color.rgb_f32();
        Quantized {
            color: nearest.color,
            preserved: None,
            fallback: false,
            error: [working[0] - c[0], working[1] - c[1], working[2] - c[2]],
        }
    }

    /// Dither `source` (assumed non-empty RGB) to the E6 palette.
    pub fn dither(&self, source: &RgbImage) -> DitheredImage {
        let (width, height) = source.dimensions();
        let mut work = WorkBuffer::from_image(source);
        let mut out = RgbImage::new(width, height);
        let mut indices = IndexMap::new(width, height);
        let mut stats = DitherStats::default();

        for y in 0..height {
            for x in 0..width {
                let o = source.get_pixel(x, y);
                let original = [o[0] as f32, o[1] as f32, o[2] as f32];
                let q = self.quantize_pixel(work.get(x, y), original);
                match q.preserved {
                    Some(PreserveReason::NearBlack) => stats.preserved_black += 1,
                    Some(PreserveReason::NearWhite) => stats.preserved_white += 1,
                    Some(PreserveReason::ExactMatch) => stats.preserved_exact += 1,
                    None => stats.quantized += 1,
                }
                if q.fallback {
                    stats.index_fallbacks += 1;
                    tracing::warn!(x, y, "preserved color matched no palette entry; using index 0");
                }
                out.put_pixel(x, y, Rgb(to_u8(q.color.rgb_f32())));
                indices.set(x, y, q.color.index());
                work.diffuse(x, y, q.error);
            }
        }

        tracing::debug!(
            width,
            height,
            preserved = stats.preserved(),
            quantized = stats.quantized,
            "dither pass complete"
        );
        DitheredImage {
            image: out,
            indices,
            stats,
        }
    }
}

#[inline(always)]
fn to_u8(c: [f32; 3]) -> [u8; 3] {
    [
        c[0].clamp(0.0, 255.0) as u8,
        c[1].clamp(0.0, 255.0) as u8,
        c[2].clamp(0.0, 255.0) as u8,
    ]
}
