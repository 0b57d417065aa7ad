use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use image::DynamicImage;
use spectra_dither::config::{self, PreservationMode};
use spectra_dither::distribution::DEFAULT_REPORT_THRESHOLD;
use spectra_dither::output::{OutputOptions, save_outputs};
use spectra_dither::{ProcessParams, pattern, process};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Pattern {
    Gradient,
    Photo,
}

#[derive(Parser, Debug)]
#[command(name = "spectra-dither")]
#[command(about = "Dither a rendered dashboard for a six-color Spectra E6 e-ink panel")]
struct Cli {
    /// Source image (any format the image crate decodes). Omit to use a generated pattern.
    input: Option<PathBuf>,

    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory (overrides config)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Generated source when no input is given
    #[arg(long, value_enum, default_value = "gradient")]
    pattern: Pattern,

    #[arg(long, default_value_t = 400)]
    width: u32,

    #[arg(long, default_value_t = 300)]
    height: u32,

    /// Seed for the photo pattern
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Dither every pixel, including pure black/white text
    #[arg(long)]
    no_preserve: bool,

    /// Use the widened text-cleanup thresholds
    #[arg(long)]
    text_cleanup: bool,

    /// Push near-neutral grays to black/white before dithering
    #[arg(long)]
    preprocess: bool,

    /// Also write the packed 4bpp panel stream
    #[arg(long)]
    packed: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config first so we can honor logging.filter directive.
    let manager = config::ConfigManager::load(cli.config.clone())?;
    let cfg = manager.to_struct()?;
    let filter_directive = cfg
        .logging
        .as_ref()
        .and_then(|l| l.filter.clone())
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info,spectra_dither=debug".to_string());
    fmt()
        .with_env_filter(EnvFilter::new(filter_directive))
        .init();

    let mut dithering = cfg.dithering.clone().unwrap_or_default();
    if cli.no_preserve {
        dithering.preserve = Some(false);
    }
    if cli.text_cleanup {
        dithering.mode = Some(PreservationMode::TextCleanup);
    }
    dithering.preprocess |= cli.preprocess;
    let settings = dithering.settings();

    let output_cfg = cfg.output.clone().unwrap_or_default();
    let out_dir = cli
        .output_dir
        .clone()
        .or_else(|| output_cfg.dir.clone())
        .unwrap_or_else(|| PathBuf::from("output"));
    let opts = OutputOptions {
        index_scale: output_cfg.index_scale(),
        min_report_percentage: output_cfg
            .min_report_percentage
            .unwrap_or(DEFAULT_REPORT_THRESHOLD),
        packed: (output_cfg.packed || cli.packed).then(|| output_cfg.pack_options()),
    };

    let source: DynamicImage = match &cli.input {
        Some(path) => {
            image::open(path).with_context(|| format!("opening image {}", path.display()))?
        }
        None => {
            tracing::info!(pattern = ?cli.pattern, width = cli.width, height = cli.height, "no input given; generating pattern");
            let img = match cli.pattern {
                Pattern::Gradient => pattern::test_pattern(cli.width, cli.height),
                Pattern::Photo => pattern::photo_like(cli.width, cli.height, cli.seed),
            };
            DynamicImage::ImageRgb8(img)
        }
    };

    tracing::debug!(config = %manager.path().display(), policy = ?settings.policy, preprocess = settings.preprocess, "starting dither run");
    let processed = process(ProcessParams {
        settings: &settings,
        image: &source,
    })?;

    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
    let paths = save_outputs(&out_dir, &stamp, &processed, &opts)?;

    println!("E6 dithered: {}", paths.dithered.display());
    println!("Preview:     {}", paths.preview.display());
    println!("Palette:     {}", paths.palette.display());
    println!("Stats:       {}", paths.stats.display());
    if let Some(p) = &paths.packed {
        println!("Packed 4bpp: {}", p.display());
    }
    println!("Color distribution:");
    for share in processed.distribution.visible(opts.min_report_percentage) {
        println!(
            "  {:<7} {:>5.1}% ({} px)",
            share.color.name(),
            share.percentage,
            share.count
        );
    }
    Ok(())
}
