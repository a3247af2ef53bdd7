use thiserror::Error;

/// Error taxonomy for the decoder (§7). `DecodeError::Packet` is recovered
/// locally (the offending packet is skipped, decoding continues); every
/// other variant is fatal for the current video.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("failed to open video: {0}")]
    OpenFailed(String),

    #[error("no video stream found in container")]
    NoVideoStream,

    #[error("unsupported codec: {0}")]
    UnsupportedCodec(String),

    #[error("decode error on packet: {0}")]
    Packet(String),

    #[error("hardware backend unavailable: {0}")]
    HardwareBackendUnavailable(String),

    #[error("decoding cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, DecodeError>;
