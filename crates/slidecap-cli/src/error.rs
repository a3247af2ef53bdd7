//! Aggregated pipeline error, matching each downstream crate's own taxonomy
//! (§7, §10.2). Command implementations convert this to `anyhow::Result` at
//! the dispatch boundary.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("cancelled")]
    Cancelled,

    #[error(transparent)]
    Core(#[from] slidecap_core::CoreError),

    #[error(transparent)]
    Decode(#[from] slidecap_decode::DecodeError),

    #[error(transparent)]
    Detect(#[from] slidecap_detect::DetectError),

    #[error(transparent)]
    Sink(#[from] slidecap_sink::SinkError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
