use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use toml_edit::DocumentMut;

use crate::export::{DEFAULT_INDEX_SCALE, PackOptions};
use crate::pipeline::DitherSettings;
use crate::preserve::{DEFAULT_TEXT_THRESHOLD, PreservationPolicy};

#[cfg(feature = "embed_config")]
use rust_embed::RustEmbed;

#[cfg(feature = "embed_config")]
#[derive(RustEmbed)]
#[folder = "../"]
#[include = "spectra.example.toml"]
struct ConfigAssets;

/// Default on-disk config filename
pub const DEFAULT_CONFIG_PATH: &str = "spectra.toml";

/// Strongly typed representation of the configuration.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    pub logging: Option<Logging>,
    pub dithering: Option<Dithering>,
    pub output: Option<Output>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Logging {
    pub filter: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PreservationMode {
    /// Thresholds 30 / 225, exact-match tolerance 10.
    #[default]
    Standard,
    /// Thresholds widened to `text_threshold` / `255 - text_threshold`, tolerance 5.
    TextCleanup,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Dithering {
    pub preserve: Option<bool>,
    pub mode: Option<PreservationMode>,
    pub text_threshold: Option<f32>,
    /// Explicit overrides of the mode's values.
    pub black_threshold: Option<f32>,
    pub white_threshold: Option<f32>,
    pub tolerance: Option<f32>,
    #[serde(default)]
    pub preprocess: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Output {
    pub dir: Option<PathBuf>,
    pub index_scale: Option<u8>,
    pub min_report_percentage: Option<f64>,
    /// Also write the raw packed 4bpp stream for the panel.
    #[serde(default)]
    pub packed: bool,
    #[serde(default)]
    pub swap_nibbles: bool,
    #[serde(default)]
    pub reverse_rows: bool,
    #[serde(default)]
    pub reverse_cols: bool,
}

impl Dithering {
    pub fn policy(&self) -> PreservationPolicy {
        let mut policy = match self.mode.unwrap_or_default() {
            PreservationMode::Standard => PreservationPolicy::default(),
            PreservationMode::TextCleanup => PreservationPolicy::text_cleanup(
                self.text_threshold.unwrap_or(DEFAULT_TEXT_THRESHOLD),
            ),
        };
        if let Some(v) = self.black_threshold {
            policy.black_threshold = v;
        }
        if let Some(v) = self.white_threshold {
            policy.white_threshold = v;
        }
        if let Some(v) = self.tolerance {
            policy.tolerance = v;
        }
        policy.enabled = self.preserve.unwrap_or(true);
        policy
    }

    pub fn settings(&self) -> DitherSettings {
        DitherSettings {
            policy: self.policy(),
            preprocess: self.preprocess,
        }
    }
}

impl Output {
    pub fn pack_options(&self) -> PackOptions {
        PackOptions {
            swap_nibbles: self.swap_nibbles,
            reverse_rows: self.reverse_rows,
            reverse_cols: self.reverse_cols,
        }
    }

    pub fn index_scale(&self) -> u8 {
        self.index_scale.unwrap_or(DEFAULT_INDEX_SCALE)
    }
}

/// Parsed config document plus the path it came from.
#[derive(Debug)]
pub struct ConfigManager {
    path: PathBuf,
    doc: DocumentMut,
}

impl ConfigManager {
    /// Load existing config file. If the file does not exist, creates it from the embedded example.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

        if !path.exists() {
            #[cfg(feature = "embed_config")]
            {
                let Some(example_file) = ConfigAssets::get("spectra.example.toml") else {
                    bail!(
                        "config file {} not found and embedded example is not available",
                        path.display()
                    );
                };
                let example_content = std::str::from_utf8(&example_file.data)
                    .with_context(|| "embedded example config is not valid UTF-8")?;
                std::fs::write(&path, example_content)
                    .with_context(|| format!("writing example config to {}", path.display()))?;
                tracing::info!(path = %path.display(), "created default config file");
            }
            #[cfg(not(feature = "embed_config"))]
            {
                tracing::info!(path = %path.display(), "config file not found; using defaults");
                return Ok(Self {
                    path,
                    doc: DocumentMut::new(),
                });
            }
        }

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::parse(path, &text)
    }

    fn parse(path: PathBuf, text: &str) -> Result<Self> {
        let doc = text
            .parse::<DocumentMut>()
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(Self { path, doc })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Convert current document to strongly typed struct.
    pub fn to_struct(&self) -> Result<Config> {
        let typed: Config = toml_edit::de::from_document(self.doc.clone())
            .with_context(|| format!("invalid config in {}", self.path.display()))?;
        Ok(typed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
[logging]
filter = "debug"

[dithering]
preserve = true
mode = "text_cleanup"
text_threshold = 50
tolerance = 3.5
preprocess = true

[output]
dir = "out"
index_scale = 40
min_report_percentage = 0.5
packed = true
swap_nibbles = true
"#;

    #[test]
    fn parses_all_tables() {
        let mgr = ConfigManager::parse(PathBuf::from("mem.toml"), FULL).unwrap();
        let cfg = mgr.to_struct().unwrap();
        assert_eq!(cfg.logging.unwrap().filter.as_deref(), Some("debug"));
        let d = cfg.dithering.unwrap();
        let s = d.settings();
        assert!(s.preprocess);
        assert!(s.policy.enabled);
        assert_eq!(s.policy.black_threshold, 50.0);
        assert_eq!(s.policy.white_threshold, 205.0);
        assert_eq!(s.policy.tolerance, 3.5);
        let o = cfg.output.unwrap();
        assert_eq!(o.dir, Some(PathBuf::from("out")));
        assert_eq!(o.index_scale(), 40);
        assert_eq!(o.min_report_percentage, Some(0.5));
        assert!(o.packed);
        assert!(o.pack_options().swap_nibbles);
        assert!(!o.pack_options().reverse_rows);
    }

    #[test]
    fn empty_document_gives_defaults() {
        let mgr = ConfigManager::parse(PathBuf::from("mem.toml"), "").unwrap();
        let cfg = mgr.to_struct().unwrap();
        let policy = cfg.dithering.unwrap_or_default().policy();
        assert_eq!(policy, PreservationPolicy::default());
        assert_eq!(cfg.output.unwrap_or_default().index_scale(), 42);
    }

    #[test]
    fn preserve_false_disables_policy() {
        let mgr =
            ConfigManager::parse(PathBuf::from("mem.toml"), "[dithering]\npreserve = false\n")
                .unwrap();
        let d = mgr.to_struct().unwrap().dithering.unwrap();
        assert!(!d.policy().enabled);
    }

    #[test]
    fn rejects_unknown_mode() {
        let mgr =
            ConfigManager::parse(PathBuf::from("mem.toml"), "[dithering]\nmode = \"loud\"\n")
                .unwrap();
        assert!(mgr.to_struct().is_err());
    }

    #[cfg(feature = "embed_config")]
    #[test]
    fn missing_file_is_created_from_example() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spectra.toml");
        let mgr = ConfigManager::load(Some(path.clone())).unwrap();
        assert!(path.exists());
        assert_eq!(mgr.path(), path.as_path());
        let cfg = mgr.to_struct().unwrap();
        assert_eq!(
            cfg.dithering.unwrap().policy(),
            PreservationPolicy::default()
        );
    }
}
