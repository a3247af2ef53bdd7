//! slidecap-core: shared data model for the streaming slide-detection
//! pipeline.
//!
//! Dependency order, leaves first: [`framebuffer`] and [`chunk`]; then
//! [`queue`]; then [`state`], [`config`], [`progress`] and [`cancel`], which
//! the decoder, detector and sink crates all build on.

pub mod cancel;
pub mod chunk;
pub mod config;
pub mod error;
pub mod framebuffer;
pub mod limits;
pub mod progress;
pub mod queue;
pub mod state;

pub use cancel::CancellationToken;
pub use chunk::Chunk;
pub use config::{PipelineConfig, SsimPreset, VERIFICATION_COUNT};
pub use error::{CoreError, Result};
pub use framebuffer::{FrameBuffer, FrameView, CHANNELS, STRIDE_ALIGN};
pub use progress::{NullProgressSink, ProgressEvent, ProgressSink};
pub use queue::{ChunkQueue, Taken};
pub use state::{local_to_global, OverlapFrame, ProcessingState, Verification};
