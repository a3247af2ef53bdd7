use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("frame dimensions do not match: {a_width}x{a_height} vs {b_width}x{b_height}")]
    DimensionMismatch {
        a_width: u32,
        a_height: u32,
        b_width: u32,
        b_height: u32,
    },

    #[error("empty input: frame has zero width or height")]
    EmptyInput,
}

pub type Result<T> = std::result::Result<T, MetricsError>;
