//! Zero-copy frame-buffer substrate shared by the decoder, the SSIM engine
//! and the detector.
//!
//! A [`FrameBuffer`] is the exclusive owner of one decoded frame's pixel
//! bytes. It supports move transfer of ownership and forbids implicit
//! duplication (no `Clone`); the only way to inspect its contents without
//! taking ownership is [`FrameBuffer::view`], which borrows.

use crate::error::CoreError;

/// Fixed channel count: frames are always 8-bit BGR.
pub const CHANNELS: usize = 3;

/// Row-stride alignment, in bytes.
pub const STRIDE_ALIGN: usize = 32;

/// Round `n` up to the next multiple of `STRIDE_ALIGN`.
pub fn align_up(n: usize) -> usize {
    (n + STRIDE_ALIGN - 1) & !(STRIDE_ALIGN - 1)
}

/// Exclusive owner of one frame's pixel bytes.
///
/// `bytes.len() == stride * height` always holds; `stride` is a multiple of
/// `STRIDE_ALIGN` and at least `width * CHANNELS`.
#[derive(Debug)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    stride: usize,
    bytes: Vec<u8>,
}

/// Borrowed, immutable view into a [`FrameBuffer`].
///
/// Cannot outlive the buffer it borrows from.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pub width: u32,
    pub height: u32,
    pub stride: usize,
    pub data: &'a [u8],
}

impl FrameBuffer {
    /// Allocate an aligned, zero-initialised buffer for a frame of the given
    /// dimensions.
    pub fn create(width: u32, height: u32) -> Result<Self, CoreError> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidConfig(
                "frame dimensions must be non-zero".into(),
            ));
        }
        let row_bytes = (width as usize)
            .checked_mul(CHANNELS)
            .ok_or_else(|| CoreError::InvalidConfig("frame width overflow".into()))?;
        let stride = align_up(row_bytes);
        let total = stride
            .checked_mul(height as usize)
            .ok_or(CoreError::OutOfMemory(usize::MAX))?;

        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(total)
            .map_err(|_| CoreError::OutOfMemory(total))?;
        bytes.resize(total, 0);

        Ok(Self {
            width,
            height,
            stride,
            bytes,
        })
    }

    /// Build a buffer from already-converted, already-strided pixel bytes
    /// (used by the decoder once it has colour-converted a frame into
    /// aligned memory).
    pub fn from_bytes(width: u32, height: u32, stride: usize, bytes: Vec<u8>) -> Result<Self, CoreError> {
        if stride % STRIDE_ALIGN != 0 {
            return Err(CoreError::InvalidConfig(format!(
                "stride {stride} is not {STRIDE_ALIGN}-byte aligned"
            )));
        }
        if stride < (width as usize) * CHANNELS {
            return Err(CoreError::InvalidConfig(
                "stride is smaller than one packed row".into(),
            ));
        }
        let expected = stride
            .checked_mul(height as usize)
            .ok_or(CoreError::OutOfMemory(usize::MAX))?;
        if bytes.len() != expected {
            return Err(CoreError::InvalidConfig(format!(
                "buffer length {} does not match stride*height {}",
                bytes.len(),
                expected
            )));
        }
        Ok(Self {
            width,
            height,
            stride,
            bytes,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Mutable access to the raw row-major pixel bytes, for the decoder's
    /// single necessary copy (converted pixels land here).
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Borrow an immutable view. Multiple concurrent views may coexist.
    pub fn view(&self) -> FrameView<'_> {
        FrameView {
            width: self.width,
            height: self.height,
            stride: self.stride,
            data: &self.bytes,
        }
    }

    /// Explicit, deliberate byte copy. There is no `Clone` impl so that
    /// duplication never happens by accident; the detector uses this for
    /// the one frame per stable interval that must survive past the chunk
    /// that produced it, to hand its bytes to the sink.
    pub fn duplicate(&self) -> Result<Self, CoreError> {
        Self::from_bytes(self.width, self.height, self.stride, self.bytes.clone())
    }
}

impl<'a> FrameView<'a> {
    /// Row slice at `y`, without bounds-checking beyond a debug assertion.
    pub fn row(&self, y: u32) -> &'a [u8] {
        debug_assert!(y < self.height);
        let start = y as usize * self.stride;
        let end = start + self.width as usize * CHANNELS;
        &self.data[start..end]
    }
}
