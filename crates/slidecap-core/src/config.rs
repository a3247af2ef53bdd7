//! The single parameter bundle consumed by the SSIM engine and the detector.
//!
//! Supplied once by the configuration provider at pipeline start; the
//! pipeline never mutates it mid-run (§6 of the design).

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::limits::{validate_chunk_size, validate_downsample_dimensions};

/// Named SSIM-threshold presets, plus an escape hatch for a caller-chosen value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SsimPreset {
    /// 0.999 — only near-identical frames are treated as stable.
    Strict,
    /// 0.9985 — the default; matches the reference implementation's tuning.
    Normal,
    /// 0.998 — tolerates more compression noise before calling a transition.
    Loose,
    /// A caller-supplied threshold, still validated against the legal range.
    Custom(f64),
}

impl SsimPreset {
    pub fn threshold(self) -> f64 {
        match self {
            SsimPreset::Strict => 0.999,
            SsimPreset::Normal => 0.9985,
            SsimPreset::Loose => 0.998,
            SsimPreset::Custom(v) => v,
        }
    }
}

impl Default for SsimPreset {
    fn default() -> Self {
        SsimPreset::Normal
    }
}

/// Verification length required after an instability before a candidate
/// frame is accepted as a new slide. Fixed at 3 by the specification; kept
/// as a named constant (rather than scattered literals) for §4.X.3.
pub const VERIFICATION_COUNT: usize = 3;

/// Common downsample-target presets (area-average resampling before luminance
/// conversion); `downsample_width`/`downsample_height` in [`PipelineConfig`]
/// need not be one of these, they are just the documented common choices.
pub const DOWNSAMPLE_480P: (u32, u32) = (854, 480);
pub const DOWNSAMPLE_360P: (u32, u32) = (640, 360);
pub const DOWNSAMPLE_DEFAULT: (u32, u32) = (480, 270);

/// The parameter bundle shared by the SSIM engine (§4.S) and the detector
/// (§4.X). Constructed once by the configuration provider; everything here
/// is `Copy`-cheap except the preset enum's `Custom` payload.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub ssim_preset: SsimPreset,
    pub downsample_enabled: bool,
    pub downsample_width: u32,
    pub downsample_height: u32,
    pub chunk_size: usize,
    pub jpeg_quality: u8,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ssim_preset: SsimPreset::Normal,
            downsample_enabled: true,
            downsample_width: DOWNSAMPLE_DEFAULT.0,
            downsample_height: DOWNSAMPLE_DEFAULT.1,
            chunk_size: 500,
            jpeg_quality: 95,
        }
    }
}

impl PipelineConfig {
    pub fn ssim_threshold(&self) -> f64 {
        self.ssim_preset.threshold()
    }

    /// Validate the bundle against the legal ranges in §6. Called once at
    /// pipeline start; the bundle is immutable thereafter.
    pub fn validate(&self) -> Result<(), CoreError> {
        let t = self.ssim_threshold();
        if !(0.9..=0.9999).contains(&t) {
            return Err(CoreError::InvalidConfig(format!(
                "ssim_threshold {t} outside legal range [0.9, 0.9999]"
            )));
        }
        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err(CoreError::InvalidConfig(format!(
                "jpeg_quality {} outside legal range [1, 100]",
                self.jpeg_quality
            )));
        }
        validate_chunk_size(self.chunk_size)?;
        if self.downsample_enabled {
            validate_downsample_dimensions(self.downsample_width, self.downsample_height)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_documented_defaults() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.ssim_threshold(), 0.9985);
        assert_eq!(cfg.chunk_size, 500);
        assert_eq!(cfg.jpeg_quality, 95);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn custom_threshold_out_of_range_rejected() {
        let mut cfg = PipelineConfig::default();
        cfg.ssim_preset = SsimPreset::Custom(0.5);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_jpeg_quality_rejected() {
        let mut cfg = PipelineConfig::default();
        cfg.jpeg_quality = 0;
        assert!(cfg.validate().is_err());
    }
}
