//! Optional cleanup run before dithering when the source is mostly UI text.
//!
//! Near-black and near-white pixels are snapped outright and near-neutral
//! grays are pushed to whichever of black or white is closer, so anti-aliased
//! glyph edges do not turn into colored dither noise.

use crate::preserve::PreservationPolicy;
use image::{Rgb, RgbImage};

/// Max distance of every channel from the pixel mean for it to count as gray.
pub const GRAY_SPREAD: f32 = 20.0;

pub fn prepare_for_e6(image: &RgbImage, policy: &PreservationPolicy) -> RgbImage {
    let mut out = image.clone();
    let mut snapped = 0usize;
    let mut grays = 0usize;
    for px in out.pixels_mut() {
        let c = [px[0] as f32, px[1] as f32, px[2] as f32];
        if c.iter().all(|&v| v <= policy.black_threshold) {
            *px = Rgb([0, 0, 0]);
            snapped += 1;
            continue;
        }
        if c.iter().all(|&v| v >= policy.white_threshold) {
            *px = Rgb([255, 255, 255]);
            snapped += 1;
            continue;
        }
        let mean = (c[0] + c[1] + c[2]) / 3.0;
        if c.iter().all(|&v| (v - mean).abs() < GRAY_SPREAD) {
            *px = if mean < 128.0 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            };
            grays += 1;
        }
    }
    tracing::debug!(snapped, grays, "preprocessed for e6");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(px: [u8; 3], policy: &PreservationPolicy) -> [u8; 3] {
        let img = RgbImage::from_pixel(1, 1, Rgb(px));
        prepare_for_e6(&img, policy).get_pixel(0, 0).0
    }

    #[test]
    fn grays_are_pushed_to_black_or_white() {
        let p = PreservationPolicy::text_cleanup(40.0);
        assert_eq!(run([100, 100, 100], &p), [0, 0, 0]);
        assert_eq!(run([180, 180, 180], &p), [255, 255, 255]);
        assert_eq!(run([130, 125, 135], &p), [255, 255, 255]);
    }

    #[test]
    fn saturated_colors_are_untouched() {
        let p = PreservationPolicy::text_cleanup(40.0);
        assert_eq!(run([200, 40, 40], &p), [200, 40, 40]);
        assert_eq!(run([30, 90, 220], &p), [30, 90, 220]);
    }

    #[test]
    fn thresholds_snap_first() {
        let p = PreservationPolicy::text_cleanup(40.0);
        // not gray (spread > 20) but all channels under the black cutoff
        assert_eq!(run([40, 0, 10], &p), [0, 0, 0]);
        assert_eq!(run([255, 215, 240], &p), [255, 255, 255]);
    }
}
