use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Error taxonomy for the sink (§7). `CreateDir` is fatal for the whole
/// video (raised once, from [`crate::Sink::new`]); `Write` and `Encode` are
/// per-slide and the caller is expected to log them as warnings and keep
/// going rather than abort the pipeline.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("failed to create output directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("failed to write slide {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to encode slide {path}: {source}")]
    Encode {
        path: PathBuf,
        source: image::ImageError,
    },
}

impl SinkError {
    /// True for the per-slide failures §7 classifies as `WriteFailed`:
    /// logged, non-fatal, the pipeline continues to the next slide.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SinkError::Write { .. } | SinkError::Encode { .. })
    }
}

pub type Result<T> = std::result::Result<T, SinkError>;
