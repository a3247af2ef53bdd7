//! Optional on-disk configuration provider (§10.3): a single TOML file of
//! overrides, loaded once at start-up. CLI flags always take precedence over
//! a loaded file, and the pipeline never re-reads configuration mid-run —
//! persistent, mutable, GUI-editable configuration storage remains out of
//! scope per §1.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use slidecap_core::{PipelineConfig, SsimPreset};

#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub ssim_threshold: Option<f64>,
    pub downsample_enabled: Option<bool>,
    pub downsample_width: Option<u32>,
    pub downsample_height: Option<u32>,
    pub chunk_size: Option<usize>,
    pub jpeg_quality: Option<u8>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Apply this file's overrides onto `base`, leaving fields the file
    /// didn't set untouched.
    pub fn apply(&self, mut base: PipelineConfig) -> PipelineConfig {
        if let Some(t) = self.ssim_threshold {
            base.ssim_preset = SsimPreset::Custom(t);
        }
        if let Some(v) = self.downsample_enabled {
            base.downsample_enabled = v;
        }
        if let Some(v) = self.downsample_width {
            base.downsample_width = v;
        }
        if let Some(v) = self.downsample_height {
            base.downsample_height = v;
        }
        if let Some(v) = self.chunk_size {
            base.chunk_size = v;
        }
        if let Some(v) = self.jpeg_quality {
            base.jpeg_quality = v;
        }
        base
    }
}
