//! Synthetic source images for demos and tests.

use image::{Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Gradients, saturated patches and a gray ramp, stacked in thirds.
pub fn test_pattern(width: u32, height: u32) -> RgbImage {
    let third_w = (width / 3).max(1);
    let band_h = height / 3;
    let patch_w = (width / 6).max(1);
    const PATCHES: [[u8; 3]; 6] = [
        [255, 0, 0],
        [255, 128, 0],
        [255, 255, 0],
        [0, 255, 0],
        [0, 0, 255],
        [128, 0, 255],
    ];
    RgbImage::from_fn(width, height, |x, y| {
        if y < band_h {
            // red / green / blue each fading to white across its third
            let seg = (x / third_w).min(2);
            let t = ((x - seg * third_w) as f32 / third_w as f32).min(1.0);
            let i = (255.0 * t) as u8;
            match seg {
                0 => Rgb([255, i, i]),
                1 => Rgb([i, 255, i]),
                _ => Rgb([i, i, 255]),
            }
        } else if y < band_h * 2 {
            Rgb(PATCHES[((x / patch_w) as usize).min(5)])
        } else {
            let g = (255.0 * (x as f32 / width as f32)) as u8;
            Rgb([g, g, g])
        }
    })
}

/// Radial "sunset" sky over darker ground, with three soft clouds placed by `seed`.
pub fn photo_like(width: u32, height: u32, seed: u64) -> RgbImage {
    let cx = (width / 2) as f32;
    let cy = (height / 3) as f32;
    let max_dist = (cx * cx + cy * cy).sqrt().max(1.0);
    let mut img = RgbImage::from_fn(width, height, |x, y| {
        let dx = x as f32 - cx;
        let dy = y as f32 - cy;
        let n = ((dx * dx + dy * dy).sqrt() / max_dist).min(1.0);
        let (r, g, b) = if y < height / 2 {
            (
                255.0 * (1.0 - n * 0.3),
                200.0 * (1.0 - n * 0.4),
                100.0 + 155.0 * n,
            )
        } else {
            (
                100.0 * (1.0 - n * 0.5),
                150.0 * (1.0 - n * 0.3),
                80.0 * (1.0 - n * 0.4),
            )
        };
        Rgb([r.min(255.0) as u8, g.min(255.0) as u8, b.min(255.0) as u8])
    });

    if width < 4 || height < 6 {
        return img;
    }
    let mut rng = StdRng::seed_from_u64(seed);
    for _ in 0..3 {
        let ccx = rng.random_range(width / 4..3 * width / 4) as i64;
        let ccy = rng.random_range(height / 6..(height / 3).max(height / 6 + 1)) as i64;
        let radius = rng.random_range(20..40) as i64;
        let y0 = (ccy - radius).max(0);
        let y1 = (ccy + radius).min(height as i64);
        let x0 = (ccx - radius).max(0);
        let x1 = (ccx + radius).min(width as i64);
        for y in y0..y1 {
            for x in x0..x1 {
                let d = (((x - ccx).pow(2) + (y - ccy).pow(2)) as f32).sqrt();
                if d < radius as f32 {
                    let alpha = (1.0 - d / radius as f32).powi(2);
                    let px = img.get_pixel_mut(x as u32, y as u32);
                    for c in 0..3 {
                        let cur = px[c] as f32;
                        px[c] = (cur * (1.0 - alpha) + 255.0 * alpha) as u8;
                    }
                }
            }
        }
    }
    img
}
