use thiserror::Error;

/// SSIM failures are fatal for the current chunk (§7): there is no
/// meaningful partial result once a pairwise score cannot be computed.
#[derive(Error, Debug)]
pub enum DetectError {
    #[error("ssim computation failed: {0}")]
    Metrics(#[from] slidecap_metrics::MetricsError),

    /// The cancellation token was observed mid-chunk (§5: "at each iteration
    /// of the detector's main loop"); orderly shutdown, not a failure (§7).
    #[error("detection cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, DetectError>;
