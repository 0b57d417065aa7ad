//! Pixel preservation policy.
//!
//! Text and flat backgrounds rendered in (near) pure black or white, or
//! already painted in a panel color, should come out of the dither pass
//! untouched instead of picking up speckle from neighbouring error.

use crate::palette::{self, PaletteColor};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BLACK_THRESHOLD: f32 = 30.0;
pub const DEFAULT_WHITE_THRESHOLD: f32 = 225.0;
pub const DEFAULT_TOLERANCE: f32 = 10.0;
pub const DEFAULT_TEXT_THRESHOLD: f32 = 40.0;
pub const TEXT_CLEANUP_TOLERANCE: f32 = 5.0;

/// Tunable preservation thresholds (0..=255 scale).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreservationPolicy {
    pub enabled: bool,
    /// All channels <= this snap to black.
    pub black_threshold: f32,
    /// All channels >= this snap to white.
    pub white_threshold: f32,
    /// Euclidean distance at which a pixel counts as an exact palette hit.
    pub tolerance: f32,
}

impl Default for PreservationPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            black_threshold: DEFAULT_BLACK_THRESHOLD,
            white_threshold: DEFAULT_WHITE_THRESHOLD,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

/// Why a pixel was preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreserveReason {
    NearBlack,
    NearWhite,
    ExactMatch,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preserve {
    pub reason: PreserveReason,
    pub color: [u8; 3],
}

impl PreservationPolicy {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// More aggressive cleanup for crisp UI renders: thresholds widened
    /// symmetrically (`t`, `255 - t`) and a tighter exact-match tolerance.
    pub fn text_cleanup(text_threshold: f32) -> Self {
        let t = text_threshold.clamp(0.0, 127.0);
        Self {
            enabled: true,
            black_threshold: t,
            white_threshold: 255.0 - t,
            tolerance: TEXT_CLEANUP_TOLERANCE,
        }
    }

    /// Decide whether `original` (the undiffused source pixel) bypasses quantization.
    /// First match wins: near-black, near-white, then exact palette hit.
    pub fn evaluate(&self, original: [f32; 3]) -> Option<Preserve> {
        if !self.enabled {
            return None;
        }
        if original.iter().all(|&c| c <= self.black_threshold) {
            return Some(Preserve {
                reason: PreserveReason::NearBlack,
                color: PaletteColor::Black.rgb(),
            });
        }
        if original.iter().all(|&c| c >= self.white_threshold) {
            return Some(Preserve {
                reason: PreserveReason::NearWhite,
                color: PaletteColor::White.rgb(),
            });
        }
        palette::match_within(original, self.tolerance).map(|c| Preserve {
            reason: PreserveReason::ExactMatch,
            color: c.rgb(),
        })
    }
}
