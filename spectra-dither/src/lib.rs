//! Six-color e-ink quantization for rendered dashboards.
//!
//! A rendered RGB raster is dithered onto the fixed Spectra E6 palette with
//! Floyd–Steinberg error diffusion, keeping text and flat backgrounds crisp via
//! a [`PreservationPolicy`]. The result is the quantized raster, a per-pixel
//! palette index map for the panel driver, and a [`ColorDistribution`] table.

pub mod config;
pub mod dither;
pub mod distribution;
pub mod error;
pub mod export;
pub mod output;
pub mod palette;
pub mod pattern;
pub mod pipeline;
pub mod preprocess;
pub mod preserve;

pub use dither::{DitherEngine, DitheredImage, IndexMap};
pub use distribution::{ColorDistribution, ColorShare};
pub use error::PipelineError;
pub use palette::{PALETTE, PaletteColor};
pub use pipeline::{DitherSettings, ProcessParams, Processed, process};
pub use preserve::PreservationPolicy;
