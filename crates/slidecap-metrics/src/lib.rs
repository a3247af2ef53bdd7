//! slidecap-metrics: the structural-similarity (SSIM) engine (§4.S).
//!
//! `ssim` computes the single-block luminance-only SSIM score between two
//! equal-sized BGR frame views. The inner loop dispatches to a vectorised
//! implementation when the CPU supports it ([`simd`]) and always has a
//! scalar fallback ([`simd::luma_sums_scalar`]) that the vector path must
//! match bit-for-bit on integer sums, and therefore within `1e-9` on the
//! final score.

pub mod error;
pub mod luma;
pub mod simd;

use rayon::prelude::*;
use slidecap_core::FrameView;

pub use error::{MetricsError, Result};
pub use luma::LumaPlane;

/// `C1 = (0.01 * 255)^2`.
pub const C1: f64 = 6.5025;
/// `C2 = (0.03 * 255)^2`.
pub const C2: f64 = 58.5225;

fn ssim_from_sums(sums: (u64, u64, u64, u64, u64), n: f64) -> f64 {
    let (sum_a, sum_b, sum_a2, sum_b2, sum_ab) = sums;
    let mean_a = sum_a as f64 / n;
    let mean_b = sum_b as f64 / n;
    let var_a = sum_a2 as f64 / n - mean_a * mean_a;
    let var_b = sum_b2 as f64 / n - mean_b * mean_b;
    let cov_ab = sum_ab as f64 / n - mean_a * mean_b;

    let numerator = (2.0 * mean_a * mean_b + C1) * (2.0 * cov_ab + C2);
    let denominator = (mean_a * mean_a + mean_b * mean_b + C1) * (var_a + var_b + C2);
    numerator / denominator
}

/// SSIM between two already-equal-sized luminance planes.
pub fn ssim_luma(a: &LumaPlane, b: &LumaPlane) -> Result<f64> {
    if a.width != b.width || a.height != b.height {
        return Err(MetricsError::DimensionMismatch {
            a_width: a.width,
            a_height: a.height,
            b_width: b.width,
            b_height: b.height,
        });
    }
    if a.is_empty() || b.is_empty() {
        return Err(MetricsError::EmptyInput);
    }
    let sums = simd::luma_sums(&a.data, &b.data);
    Ok(ssim_from_sums(sums, a.len() as f64))
}

/// SSIM between two BGR frame views, with the caller's configured
/// downsample target applied (fused with the luminance conversion).
pub fn ssim(a: FrameView<'_>, b: FrameView<'_>, downsample: Option<(u32, u32)>) -> Result<f64> {
    if a.width != b.width || a.height != b.height {
        return Err(MetricsError::DimensionMismatch {
            a_width: a.width,
            a_height: a.height,
            b_width: b.width,
            b_height: b.height,
        });
    }
    let la = luma::luma_plane(a, downsample)?;
    let lb = luma::luma_plane(b, downsample)?;
    ssim_luma(&la, &lb)
}

/// Portable-scalar-only SSIM, used in tests to bound the vector path's
/// numerical drift.
pub fn ssim_scalar_reference(a: &LumaPlane, b: &LumaPlane) -> Result<f64> {
    if a.width != b.width || a.height != b.height {
        return Err(MetricsError::DimensionMismatch {
            a_width: a.width,
            a_height: a.height,
            b_width: b.width,
            b_height: b.height,
        });
    }
    if a.is_empty() || b.is_empty() {
        return Err(MetricsError::EmptyInput);
    }
    let sums = simd::luma_sums_scalar(&a.data, &b.data);
    Ok(ssim_from_sums(sums, a.len() as f64))
}

/// SSIM scores for every adjacent pair in `frames`, converting each frame to
/// luminance exactly once (independent conversions run in parallel via
/// rayon) and computing the `n - 1` pairwise scores in score-index order
/// (§4.X.2: "may be produced in parallel... order preserved by index").
pub fn batch_adjacent_ssim(
    frames: &[FrameView<'_>],
    downsample: Option<(u32, u32)>,
) -> Result<Vec<f64>> {
    if frames.len() < 2 {
        return Ok(Vec::new());
    }
    let planes: Result<Vec<LumaPlane>> = frames
        .par_iter()
        .map(|view| luma::luma_plane(*view, downsample))
        .collect();
    let planes = planes?;
    planes
        .par_windows(2)
        .map(|pair| ssim_luma(&pair[0], &pair[1]))
        .collect()
}
