//! Resource limits for security and DoS prevention
//!
//! These constants bound the configuration surface (chunk size, frame
//! dimensions, downsample targets) against pathological inputs without
//! changing any documented default.

use crate::error::CoreError;

/// Largest chunk size accepted from configuration.
///
/// A chunk this large (10x the documented default of 500) would hold
/// roughly 15 GB of 1080p frames in flight at once; beyond that the
/// producer/consumer split stops doing its job.
pub const MAX_CHUNK_SIZE: usize = 5_000;

/// Largest frame width or height accepted from a decoded stream.
pub const MAX_FRAME_DIMENSION: u32 = 7680;

/// Largest total frame count processed from a single video.
///
/// Bounds pathological containers (e.g. a corrupt duration claiming
/// billions of frames) from growing `saved_global_indices` without bound.
pub const MAX_FRAMES_PER_VIDEO: usize = 10_000_000;

/// Largest downsample target dimension accepted from configuration.
pub const MAX_DOWNSAMPLE_DIMENSION: u32 = 3840;

/// Validate a requested chunk size.
pub fn validate_chunk_size(chunk_size: usize) -> Result<(), CoreError> {
    if chunk_size == 0 {
        return Err(CoreError::InvalidConfig(
            "chunk_size must be at least 1".into(),
        ));
    }
    if chunk_size > MAX_CHUNK_SIZE {
        return Err(CoreError::LimitExceeded(format!(
            "chunk_size {chunk_size} exceeds maximum {MAX_CHUNK_SIZE}"
        )));
    }
    Ok(())
}

/// Validate decoded frame dimensions.
pub fn validate_frame_dimensions(width: u32, height: u32) -> Result<(), CoreError> {
    if width == 0 || height == 0 {
        return Err(CoreError::InvalidConfig(
            "frame dimensions must be non-zero".into(),
        ));
    }
    if width > MAX_FRAME_DIMENSION || height > MAX_FRAME_DIMENSION {
        return Err(CoreError::LimitExceeded(format!(
            "frame dimensions {width}x{height} exceed maximum {MAX_FRAME_DIMENSION}"
        )));
    }
    Ok(())
}

/// Validate a downsample target.
pub fn validate_downsample_dimensions(width: u32, height: u32) -> Result<(), CoreError> {
    if width == 0 || height == 0 {
        return Err(CoreError::InvalidConfig(
            "downsample dimensions must be non-zero".into(),
        ));
    }
    if width > MAX_DOWNSAMPLE_DIMENSION || height > MAX_DOWNSAMPLE_DIMENSION {
        return Err(CoreError::LimitExceeded(format!(
            "downsample dimensions {width}x{height} exceed maximum {MAX_DOWNSAMPLE_DIMENSION}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_size_valid_range() {
        assert!(validate_chunk_size(1).is_ok());
        assert!(validate_chunk_size(500).is_ok());
        assert!(validate_chunk_size(MAX_CHUNK_SIZE).is_ok());
    }

    #[test]
    fn chunk_size_invalid() {
        assert!(validate_chunk_size(0).is_err());
        assert!(validate_chunk_size(MAX_CHUNK_SIZE + 1).is_err());
    }

    #[test]
    fn frame_dimensions_valid() {
        assert!(validate_frame_dimensions(1920, 1080).is_ok());
        assert!(validate_frame_dimensions(MAX_FRAME_DIMENSION, MAX_FRAME_DIMENSION).is_ok());
    }

    #[test]
    fn frame_dimensions_invalid() {
        assert!(validate_frame_dimensions(0, 1080).is_err());
        assert!(validate_frame_dimensions(MAX_FRAME_DIMENSION + 1, 1080).is_err());
    }

    #[test]
    fn downsample_dimensions_valid() {
        assert!(validate_downsample_dimensions(480, 270).is_ok());
    }

    #[test]
    fn downsample_dimensions_invalid() {
        assert!(validate_downsample_dimensions(0, 270).is_err());
        assert!(validate_downsample_dimensions(480, MAX_DOWNSAMPLE_DIMENSION + 1).is_err());
    }
}
