use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::distribution::DEFAULT_REPORT_THRESHOLD;
use crate::export::{self, DEFAULT_INDEX_SCALE, PackOptions};
use crate::pipeline::Processed;

/// What to write besides the always-present images.
#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub index_scale: u8,
    pub min_report_percentage: f64,
    /// `Some` writes the packed 4bpp panel stream.
    pub packed: Option<PackOptions>,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            index_scale: DEFAULT_INDEX_SCALE,
            min_report_percentage: DEFAULT_REPORT_THRESHOLD,
            packed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OutputPaths {
    pub dithered: PathBuf,
    pub preview: PathBuf,
    pub palette: PathBuf,
    pub stats: PathBuf,
    pub packed: Option<PathBuf>,
}

/// Write all artefacts of a run into `dir`, file names suffixed with `stamp`.
pub fn save_outputs(
    dir: &Path,
    stamp: &str,
    processed: &Processed,
    opts: &OutputOptions,
) -> Result<OutputPaths> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating output directory {}", dir.display()))?;

    let dithered = dir.join(format!("dashboard_e6_dithered_{stamp}.png"));
    processed
        .dithered
        .image
        .save(&dithered)
        .with_context(|| format!("saving {}", dithered.display()))?;

    let preview = dir.join(format!("dashboard_e6_preview_{stamp}.png"));
    export::compose_preview(
        &processed.source,
        &processed.distribution,
        opts.min_report_percentage,
    )
    .save(&preview)
    .with_context(|| format!("saving {}", preview.display()))?;

    let palette = dir.join(format!("dashboard_e6_palette_{stamp}.png"));
    export::index_preview(&processed.dithered.indices, opts.index_scale)
        .save(&palette)
        .with_context(|| format!("saving {}", palette.display()))?;

    let stats = dir.join(format!("dashboard_e6_stats_{stamp}.json"));
    let json = serde_json::to_vec_pretty(&processed.distribution)?;
    std::fs::write(&stats, json).with_context(|| format!("writing {}", stats.display()))?;

    let packed = match opts.packed {
        Some(pack) => {
            let path = dir.join(format!("dashboard_e6_{stamp}.bin"));
            let bytes = export::pack_4bpp(&processed.dithered.indices, pack);
            std::fs::write(&path, &bytes)
                .with_context(|| format!("writing {}", path.display()))?;
            tracing::debug!(path = %path.display(), bytes = bytes.len(), "wrote packed panel stream");
            Some(path)
        }
        None => None,
    };

    tracing::info!(dithered = %dithered.display(), preview = %preview.display(), palette = %palette.display(), "saved e6 outputs");
    Ok(OutputPaths {
        dithered,
        preview,
        palette,
        stats,
        packed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{DitherSettings, ProcessParams, process};
    use image::{DynamicImage, RgbImage};

    #[test]
    fn writes_every_artefact() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("nested");
        let img = DynamicImage::ImageRgb8(crate::pattern::test_pattern(30, 12));
        let processed = process(ProcessParams {
            settings: &DitherSettings::default(),
            image: &img,
        })
        .unwrap();
        let opts = OutputOptions {
            packed: Some(PackOptions::default()),
            ..Default::default()
        };
        let paths = save_outputs(&out_dir, "20250101_060000", &processed, &opts).unwrap();

        let dithered = image::open(&paths.dithered).unwrap().to_rgb8();
        assert_eq!(dithered.as_raw(), processed.dithered.image.as_raw());
        let preview = image::open(&paths.preview).unwrap();
        assert_eq!(preview.height(), 12 + export::PREVIEW_STRIP_HEIGHT);
        let palette = image::open(&paths.palette).unwrap().to_luma8();
        assert_eq!(palette.dimensions(), (30, 12));
        assert!(palette.pixels().all(|p| p[0] % 42 == 0 && p[0] <= 210));
        let bin = std::fs::read(paths.packed.unwrap()).unwrap();
        assert_eq!(bin.len(), 15 * 12);
        let stats: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&paths.stats).unwrap()).unwrap();
        assert_eq!(stats["total"], 360);
        assert_eq!(stats["shares"].as_array().unwrap().len(), 6);
        assert!(
            paths
                .dithered
                .file_name()
                .unwrap()
                .to_string_lossy()
                .ends_with("20250101_060000.png")
        );
    }

    #[test]
    fn packed_stream_is_optional() {
        let dir = tempfile::tempdir().unwrap();
        let img = DynamicImage::ImageRgb8(RgbImage::new(2, 2));
        let processed = process(ProcessParams {
            settings: &DitherSettings::default(),
            image: &img,
        })
        .unwrap();
        let paths = save_outputs(dir.path(), "x", &processed, &OutputOptions::default()).unwrap();
        assert!(paths.packed.is_none());
    }
}
