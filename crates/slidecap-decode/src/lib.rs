//! slidecap-decode: the I-frame-biased, hardware-accelerated decoder (§4.D).
//!
//! Opens a video, classifies its keyframe cadence into a sampling strategy,
//! selects a hardware decode backend with software fallback, and streams
//! chunks of BGR 8-bit frames into a [`slidecap_core::ChunkQueue`].

pub mod backend;
pub mod decoder;
pub mod error;
pub mod sampling;

pub use backend::{BackendKind, OpenedDecoder};
pub use decoder::{run_decode, DecoderConfig, VideoInfo};
pub use error::{DecodeError, Result};
pub use sampling::{
    classify_interval, estimate_avg_keyframe_interval, is_screen_recording, keep_keyframe,
    SamplingStrategy,
};
