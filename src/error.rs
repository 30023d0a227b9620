use thiserror::Error;

/// Construction-time failures. Ticking a built flock never fails.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FlockError {
    #[error("boundary corners, size and center must be finite")]
    NonFiniteBoundary,

    #[error("boundary min.{axis} ({min}) is greater than max.{axis} ({max})")]
    InvertedBoundary { axis: &'static str, min: f64, max: f64 },

    #[error("invalid agent parameter {name} = {value}")]
    InvalidParam { name: &'static str, value: f64 },

    #[error("neighbor_sample_divisor must be at least 1")]
    ZeroSampleDivisor,

    #[error("unknown preset id '{0}'")]
    UnknownPreset(String),
}
