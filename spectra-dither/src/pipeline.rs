//! Source image -> (optional cleanup) -> dither -> distribution.

use crate::dither::{DitherEngine, DitheredImage};
use crate::distribution::{self, ColorDistribution};
use crate::error::PipelineError;
use crate::preprocess::prepare_for_e6;
use crate::preserve::PreservationPolicy;
use image::{DynamicImage, GenericImageView, RgbImage};

/// Everything that shapes a run besides the image itself.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DitherSettings {
    pub policy: PreservationPolicy,
    /// Run the text-cleanup preprocessor before dithering.
    pub preprocess: bool,
}

pub struct ProcessParams<'a> {
    pub settings: &'a DitherSettings,
    pub image: &'a DynamicImage,
}

#[derive(Debug, Clone)]
pub struct Processed {
    /// The raster that was dithered (after preprocessing, if enabled).
    pub source: RgbImage,
    pub dithered: DitheredImage,
    pub distribution: ColorDistribution,
}

/// Run the full pipeline. Any color type is accepted and normalised to RGB8;
/// zero-area images are rejected.
pub fn process(params: ProcessParams) -> Result<Processed, PipelineError> {
    let (width, height) = params.image.dimensions();
    if width == 0 || height == 0 {
        return Err(PipelineError::EmptyImage { width, height });
    }
    let settings = params.settings;
    let mut source = params.image.to_rgb8();
    if settings.preprocess {
        source = prepare_for_e6(&source, &settings.policy);
    }

    let dithered = DitherEngine::new(settings.policy).dither(&source);
    let distribution = distribution::analyze(&dithered.image);

    tracing::info!(
        width,
        height,
        preserve = settings.policy.enabled,
        preprocess = settings.preprocess,
        preserved = dithered.stats.preserved(),
        "dithered image for e6 panel"
    );
    for share in distribution.iter() {
        tracing::trace!(color = %share.color, count = share.count, percentage = share.percentage, "color share");
    }

    Ok(Processed {
        source,
        dithered,
        distribution,
    })
}
